use crate::api::HistoryEntry;
use crate::search::SearchView;
use crate::tui::app::{App, ReportView, Screen};
use crate::workflow::AnalysisSource;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub(crate) fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Current screen
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    match &app.screen {
        Screen::Search => {}
        Screen::Loading(message) => render_loading(message, app.tick, frame, chunks[0]),
        Screen::Configure(form) => form.render(frame, chunks[0]),
        Screen::Report(report) => render_report(report, frame, chunks[0]),
        Screen::Lead { report, editor } => {
            let area = chunks[0];
            render_report(report, frame, area);
            let popup = centered(area, 60, 9);
            frame.render_widget(Clear, popup);
            editor.render(frame, popup);
        }
        Screen::History { entries, selected } => {
            render_history(entries, *selected, frame, chunks[0])
        }
    }
    // The search box needs the app mutably
    if matches!(app.screen, Screen::Search) {
        render_search(app, frame, chunks[0]);
    }

    render_status(app, frame, chunks[1]);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Rect of at most `width` x `height` in the middle of `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_search(app: &mut App, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    app.input.render(frame, chunks[0]);

    let block = bordered(" 검색 결과 ");
    match app.search_state.view() {
        SearchView::Idle => {
            let hint = Paragraph::new("현장명 또는 주소를 입력하세요.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(hint, chunks[1]);
        }
        SearchView::Searching => {
            let spinner = SPINNER[app.tick % SPINNER.len()];
            let searching = Paragraph::new(format!("{spinner} 검색 중..."))
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(searching, chunks[1]);
        }
        SearchView::Results(results) => {
            let items: Vec<ListItem> = results
                .iter()
                .map(|site| {
                    let mut spans = vec![Span::styled(
                        site.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )];
                    if let Some(brand) = &site.brand {
                        spans.push(Span::styled(
                            format!(" [{brand}]"),
                            Style::default().fg(Color::Cyan),
                        ));
                    }
                    if let Some(status) = &site.status {
                        spans.push(Span::styled(
                            format!(" {status}"),
                            Style::default().fg(Color::Green),
                        ));
                    }
                    spans.push(Span::styled(
                        format!("  {}", site.address),
                        Style::default().fg(Color::DarkGray),
                    ));
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
                .highlight_symbol("▶ ");
            let mut state = ListState::default().with_selected(Some(app.selected));
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }
        SearchView::Empty => {
            let text = match app.search_state.query() {
                Some(query) => format!("'{query}' 검색 결과가 없습니다. Enter로 신규 현장 등록"),
                None => "검색 결과가 없습니다.".to_string(),
            };
            let empty = Paragraph::new(text).block(block);
            frame.render_widget(empty, chunks[1]);
        }
        SearchView::Error(message) => {
            let error = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(error, chunks[1]);
        }
    }
}

fn render_loading(message: &str, tick: usize, frame: &mut Frame, area: Rect) {
    let spinner = SPINNER[tick % SPINNER.len()];
    let loading = Paragraph::new(format!("{spinner} {message}"))
        .style(Style::default().fg(Color::Yellow))
        .block(bordered(" 처리 중 "));
    frame.render_widget(loading, area);
}

fn render_report(report: &ReportView, frame: &mut Frame, area: Rect) {
    let result = &report.analysis.result;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Score
            Constraint::Min(5),    // Diagnosis and media
            Constraint::Length(4), // ROI simulator
            Constraint::Length(6), // Copy sample
        ])
        .split(area);

    let source = match report.analysis.source {
        AnalysisSource::Remote => "",
        AnalysisSource::LocalFallback => " (로컬 분석)",
        AnalysisSource::History => " (이력)",
    };
    let title = format!(" {}{source} ", report.config.field_name);
    let breakdown = &result.score_breakdown;
    let score = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("종합 점수 ", Style::default().fg(Color::Cyan)),
            Span::styled(
                result.score.to_string(),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  시세 차이 {:.1}%", result.market_gap_percent)),
        ]),
        Line::from(format!(
            "가격 {} │ 입지 {} │ 혜택 {}",
            breakdown.price_score, breakdown.location_score, breakdown.benefit_score
        )),
    ])
    .block(bordered(&title));
    frame.render_widget(score, chunks[0]);

    let mut body = vec![Line::from(result.market_diagnosis.clone()), Line::from("")];
    for plan in &result.media_mix {
        body.push(Line::from(vec![
            Span::styled(
                format!("• {} ", plan.media),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(plan.reason.clone()),
        ]));
    }
    if !result.keyword_strategy.is_empty() {
        body.push(Line::from(""));
        body.push(Line::from(format!(
            "키워드: {}",
            result.keyword_strategy.join(", ")
        )));
    }
    let diagnosis = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(bordered(" 시장 진단 · 매체 믹스 "));
    frame.render_widget(diagnosis, chunks[1]);

    let projection = report.analysis.project(report.simulated_budget);
    let roi = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("월 예산 ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{}만원", projection.budget),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (←/→ 로 조정)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!(
            "예상 DB {:.0}건 │ 예상 계약 {:.1}건 │ CPL {:.0}원",
            projection.expected_leads, projection.expected_contracts, projection.expected_cpl
        )),
    ])
    .block(bordered(" ROI 시뮬레이터 "));
    frame.render_widget(roi, chunks[2]);

    let samples = &result.lms_copy_samples;
    let copy_title = if report.regenerating {
        " LMS 카피 (생성 중...) ".to_string()
    } else {
        format!(
            " LMS 카피 {}/{} (Tab=다음 │ r=재생성 │ l=상담 신청 │ Esc=새 검색) ",
            (report.sample + 1).min(samples.len()),
            samples.len()
        )
    };
    let sample = samples
        .get(report.sample)
        .cloned()
        .unwrap_or_else(|| result.copywriting.clone());
    let copy = Paragraph::new(sample)
        .wrap(Wrap { trim: false })
        .block(bordered(&copy_title));
    frame.render_widget(copy, chunks[3]);
}

fn render_history(entries: &[HistoryEntry], selected: usize, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let when = entry
                .created_at_local()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| entry.created_at.clone());
            ListItem::new(Line::from(vec![
                Span::styled(format!("{when}  "), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    entry.field_name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}점", entry.score)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(bordered(" 분석 이력 (Enter=열기 │ Esc=뒤로) "))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(Color::Yellow)),
        Span::raw(app.search_state.label()),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Cyan)));
    }
    spans.push(Span::styled(
        "  F2=이력 │ Ctrl+C=종료",
        Style::default().fg(Color::DarkGray),
    ));

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Status")
            .border_style(Style::default().fg(Color::White)),
    );
    frame.render_widget(status, area);
}
