use crate::api::{AnalysisBackend, HistoryEntry, SiteSearch};
use crate::event::{Event, EventResult};
use crate::search::{SearchController, SearchOptions, SearchState, Subscription};
use crate::tui::form::{CampaignForm, FormAction, LeadEditor};
use crate::tui::InputWidget;
use crate::workflow::forecast::SIMULATED_BUDGET_STEP;
use crate::workflow::{Analysis, CampaignConfig, Selection, Workflow, WorkflowError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which step of the flow is on screen
pub enum Screen {
    Search,
    /// Waiting on the backend
    Loading(String),
    Configure(CampaignForm),
    Report(Box<ReportView>),
    /// Consultation request over the report it was opened from
    Lead {
        report: Box<ReportView>,
        editor: LeadEditor,
    },
    History {
        entries: Vec<HistoryEntry>,
        selected: usize,
    },
}

pub struct ReportView {
    pub config: CampaignConfig,
    pub analysis: Analysis,
    /// Budget shown in the ROI simulator, in 만원
    pub simulated_budget: u32,
    /// Index into the copy samples
    pub sample: usize,
    pub regenerating: bool,
}

/// Main application state
pub struct App {
    controller: SearchController,
    _subscription: Subscription,
    workflow: Workflow,
    user_email: Option<String>,
    tx: mpsc::UnboundedSender<Event>,
    pub(crate) screen: Screen,
    pub(crate) input: InputWidget,
    pub(crate) search_state: SearchState,
    /// Highlighted search result
    pub(crate) selected: usize,
    /// One-line notice under the current screen
    pub(crate) notice: Option<String>,
    pub(crate) tick: usize,
    should_quit: bool,
}

impl App {
    pub fn new(
        search: Arc<dyn SiteSearch>,
        backend: Arc<dyn AnalysisBackend>,
        options: SearchOptions,
        user_email: Option<String>,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let controller = SearchController::new(search, options);

        // Transitions arrive on arbitrary tasks; hop them onto the UI loop.
        let forward = tx.clone();
        let subscription = controller.subscribe(move |state| {
            let _ = forward.send(Event::Search(state.clone()));
        });

        Self {
            controller,
            _subscription: subscription,
            workflow: Workflow::new(backend),
            user_email,
            tx,
            screen: Screen::Search,
            input: InputWidget::new(),
            search_state: SearchState::Idle,
            selected: 0,
            notice: None,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(..) => {}
            Event::Tick => self.tick = self.tick.wrapping_add(1),
            Event::Search(state) => {
                if matches!(self.screen, Screen::Search) {
                    self.selected = 0;
                    self.search_state = state;
                }
            }
            Event::Prepared(config) => {
                self.notice = config
                    .is_manual()
                    .then(|| "등록되지 않은 현장입니다. 기본값으로 설정을 시작합니다.".to_string());
                self.screen = Screen::Configure(CampaignForm::new(config));
            }
            Event::Analyzed { config, analysis } => {
                self.notice = (analysis.source == crate::workflow::AnalysisSource::LocalFallback)
                    .then(|| "분석 서버 연결 실패: 로컬 분석 결과를 표시합니다.".to_string());
                self.show_report(config, analysis);
            }
            Event::CopyRegenerated(result) => self.finish_regeneration(result),
            Event::LeadSubmitted(result) => self.finish_lead(result),
            Event::HistoryLoaded(Ok(entries)) => {
                self.notice = entries
                    .is_empty()
                    .then(|| "저장된 분석 이력이 없습니다.".to_string());
                self.screen = Screen::History {
                    entries,
                    selected: 0,
                };
            }
            Event::HistoryLoaded(Err(message)) => {
                self.notice = Some(message);
                self.screen = Screen::Search;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.controller.dispose();
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Search => self.handle_search_key(key),
            Screen::Loading(_) => {}
            Screen::Configure(_) => self.handle_configure_key(key),
            Screen::Report(_) => self.handle_report_key(key),
            Screen::Lead { .. } => self.handle_lead_key(key),
            Screen::History { .. } => self.handle_history_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let count = self.search_state.results().len();
                if count > 0 {
                    self.selected = (self.selected + 1).min(count - 1);
                }
            }
            KeyCode::Enter => self.choose(),
            KeyCode::Esc => {
                self.input.clear();
                self.controller.set_query("");
            }
            KeyCode::F(2) => self.load_history(),
            _ => {
                if self.input.handle_key(key) {
                    self.notice = None;
                    self.controller.set_query(self.input.text());
                }
            }
        }
    }

    /// Enter on the search screen: pick the highlighted result or scan the text
    fn choose(&mut self) {
        let highlighted = self.search_state.results().get(self.selected).cloned();

        let selection = match highlighted {
            Some(site) => {
                let site = self.controller.select_result(site);
                self.input.set_text(&site.name);
                Selection::Site(site)
            }
            None => match self.controller.manual_scan() {
                Some(text) => Selection::Manual(text),
                None => return,
            },
        };

        self.search_state = SearchState::Idle;
        self.screen = Screen::Loading("현장 데이터 동기화 중...".to_string());

        let workflow = self.workflow.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let config = workflow.prepare(selection).await;
            let _ = tx.send(Event::Prepared(config));
        });
    }

    fn handle_configure_key(&mut self, key: KeyEvent) {
        let Screen::Configure(form) = &mut self.screen else {
            return;
        };

        match form.handle_key(key) {
            FormAction::Continue => {}
            FormAction::Cancel => self.back_to_search(),
            FormAction::Submit => {
                let config = form.config.clone();
                self.screen = Screen::Loading("AI 마케팅 분석 중...".to_string());
                self.notice = None;

                let workflow = self.workflow.clone();
                let email = self.user_email.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let analysis = workflow.analyze(&config, email.as_deref()).await;
                    let _ = tx.send(Event::Analyzed { config, analysis });
                });
            }
        }
    }

    fn handle_report_key(&mut self, key: KeyEvent) {
        let Screen::Report(report) = &mut self.screen else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.back_to_search(),
            KeyCode::Right => {
                report.simulated_budget = crate::workflow::forecast::clamp_budget(
                    report.simulated_budget + SIMULATED_BUDGET_STEP,
                );
            }
            KeyCode::Left => {
                report.simulated_budget = crate::workflow::forecast::clamp_budget(
                    report.simulated_budget.saturating_sub(SIMULATED_BUDGET_STEP),
                );
            }
            KeyCode::Tab => {
                let count = report.analysis.result.lms_copy_samples.len().max(1);
                report.sample = (report.sample + 1) % count;
            }
            KeyCode::Char('l') if !report.regenerating => self.open_lead(),
            KeyCode::Char('r') if !report.regenerating => {
                report.regenerating = true;
                self.notice = Some("카피를 다시 생성하는 중...".to_string());

                let workflow = self.workflow.clone();
                let config = report.config.clone();
                let mut analysis = report.analysis.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = workflow
                        .regenerate_copy(&config, &mut analysis)
                        .await
                        .map(|()| analysis)
                        .map_err(|e| format!("카피 생성 중 오류가 발생했습니다: {e}"));
                    let _ = tx.send(Event::CopyRegenerated(result));
                });
            }
            _ => {}
        }
    }

    /// Open the consultation form with the report's site filled in
    fn open_lead(&mut self) {
        self.screen = match std::mem::replace(&mut self.screen, Screen::Search) {
            Screen::Report(report) => {
                let editor = LeadEditor::new(&report.config.field_name);
                self.notice = None;
                Screen::Lead { report, editor }
            }
            other => other,
        };
    }

    fn handle_lead_key(&mut self, key: KeyEvent) {
        let Screen::Lead { editor, .. } = &mut self.screen else {
            return;
        };

        match editor.handle_key(key) {
            FormAction::Continue => {}
            FormAction::Cancel => self.close_lead(),
            FormAction::Submit => {
                editor.submitting = true;
                let lead = editor.lead.clone();
                let workflow = self.workflow.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = workflow.submit_lead(&lead).await.map_err(|e| match e {
                        WorkflowError::MissingFields(_) => "모든 정보를 입력해주세요.".to_string(),
                        e => format!("신청 중 오류가 발생했습니다: {e}"),
                    });
                    let _ = tx.send(Event::LeadSubmitted(result));
                });
            }
        }
    }

    fn finish_lead(&mut self, result: Result<(), String>) {
        let Screen::Lead { editor, .. } = &mut self.screen else {
            return;
        };
        editor.submitting = false;

        match result {
            Ok(()) => {
                tracing::info!(site = %editor.lead.site, "consultation request submitted");
                self.close_lead();
                self.notice = Some("신청이 완료되었습니다. 담당자가 곧 연락드리겠습니다.".to_string());
            }
            Err(message) => self.notice = Some(message),
        }
    }

    /// Back from the consultation form to its report
    fn close_lead(&mut self) {
        self.screen = match std::mem::replace(&mut self.screen, Screen::Search) {
            Screen::Lead { report, .. } => Screen::Report(report),
            other => other,
        };
        self.notice = None;
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let Screen::History { entries, selected } = &mut self.screen else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.back_to_search(),
            KeyCode::Up => *selected = selected.saturating_sub(1),
            KeyCode::Down => {
                if !entries.is_empty() {
                    *selected = (*selected + 1).min(entries.len() - 1);
                }
            }
            KeyCode::Enter => {
                let Some(entry) = entries.get(*selected).cloned() else {
                    return;
                };
                match self.workflow.load_history(&entry) {
                    Ok((config, analysis)) => {
                        self.notice = None;
                        self.show_report(config, analysis);
                    }
                    Err(e) => self.notice = Some(format!("이력을 열 수 없습니다: {e}")),
                }
            }
            _ => {}
        }
    }

    fn load_history(&mut self) {
        self.screen = Screen::Loading("분석 이력 불러오는 중...".to_string());

        let workflow = self.workflow.clone();
        let email = self.user_email.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = workflow
                .history(email.as_deref())
                .await
                .map_err(|e| format!("이력을 불러오지 못했습니다: {e}"));
            let _ = tx.send(Event::HistoryLoaded(result));
        });
    }

    fn show_report(&mut self, config: CampaignConfig, analysis: Analysis) {
        let simulated_budget = crate::workflow::forecast::clamp_budget(analysis.monthly_budget);
        self.screen = Screen::Report(Box::new(ReportView {
            config,
            analysis,
            simulated_budget,
            sample: 0,
            regenerating: false,
        }));
    }

    fn finish_regeneration(&mut self, result: Result<Analysis, String>) {
        let Screen::Report(report) = &mut self.screen else {
            return;
        };
        report.regenerating = false;

        match result {
            Ok(analysis) => {
                report.analysis = analysis;
                report.sample = 0;
                self.notice = Some("새로운 카피가 생성되었습니다.".to_string());
            }
            Err(message) => self.notice = Some(message),
        }
    }

    fn back_to_search(&mut self) {
        self.screen = Screen::Search;
        self.notice = None;
        self.input.clear();
        self.controller.set_query("");
        self.search_state = SearchState::Idle;
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        super::view::render(self, frame);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.controller.dispose();
    }
}
