//! Editable forms for the configure step and the consultation request

use crate::api::LeadForm;
use crate::workflow::campaign::{
    ADDITIONAL_BENEFITS, DOWN_PAYMENT_OPTIONS, MAIN_CONCERNS, PRODUCT_CATEGORIES,
};
use crate::workflow::forecast::SIMULATED_BUDGET_STEP;
use crate::workflow::{CampaignConfig, Keypoints};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Result of handling a key in a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CampaignField {
    FieldName,
    Address,
    Category,
    DownPayment,
    DownPaymentAmount,
    Supply,
    /// Index into `ADDITIONAL_BENEFITS`
    Benefit(usize),
    SalesPrice,
    TargetPrice,
    /// Index into the keypoint themes
    Keypoint(usize),
    MainConcern,
    MonthlyBudget,
}

const KEYPOINT_LABELS: [&str; 5] = ["입지 호재", "단지 특징", "파격 혜택", "방문 사은품", "기타 강조"];

impl CampaignField {
    fn all() -> Vec<CampaignField> {
        let mut fields = vec![
            CampaignField::FieldName,
            CampaignField::Address,
            CampaignField::Category,
            CampaignField::DownPayment,
            CampaignField::DownPaymentAmount,
            CampaignField::Supply,
        ];
        fields.extend((0..ADDITIONAL_BENEFITS.len()).map(CampaignField::Benefit));
        fields.extend([CampaignField::SalesPrice, CampaignField::TargetPrice]);
        fields.extend((0..KEYPOINT_LABELS.len()).map(CampaignField::Keypoint));
        fields.extend([CampaignField::MainConcern, CampaignField::MonthlyBudget]);
        fields
    }

    fn label(self) -> &'static str {
        match self {
            CampaignField::FieldName => "현장명",
            CampaignField::Address => "주소",
            CampaignField::Category => "상품",
            CampaignField::DownPayment => "계약금",
            CampaignField::DownPaymentAmount => "계약금(만원)",
            CampaignField::Supply => "공급 세대",
            CampaignField::Benefit(_) => "추가 혜택",
            CampaignField::SalesPrice => "분양가/평",
            CampaignField::TargetPrice => "주변 시세/평",
            CampaignField::Keypoint(i) => KEYPOINT_LABELS.get(i).copied().unwrap_or("포인트"),
            CampaignField::MainConcern => "고민",
            CampaignField::MonthlyBudget => "월 예산",
        }
    }

    /// Options cycled with Left/Right
    fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            CampaignField::Category => Some(PRODUCT_CATEGORIES),
            CampaignField::DownPayment => Some(DOWN_PAYMENT_OPTIONS),
            CampaignField::MainConcern => Some(MAIN_CONCERNS),
            _ => None,
        }
    }

    /// Left/Right step and lower bound for numeric fields
    fn step(self) -> Option<(u32, u32)> {
        match self {
            CampaignField::DownPaymentAmount => Some((100, 0)),
            CampaignField::Supply => Some((10, 0)),
            CampaignField::SalesPrice | CampaignField::TargetPrice => Some((10, 0)),
            CampaignField::MonthlyBudget => Some((SIMULATED_BUDGET_STEP, SIMULATED_BUDGET_STEP)),
            _ => None,
        }
    }
}

/// Campaign settings being edited before analysis
pub struct CampaignForm {
    pub config: CampaignConfig,
    fields: Vec<CampaignField>,
    focus: usize,
}

impl CampaignForm {
    pub fn new(config: CampaignConfig) -> Self {
        Self {
            config,
            fields: CampaignField::all(),
            focus: 0,
        }
    }

    fn focused(&self) -> CampaignField {
        self.fields[self.focus]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        let field = self.focused();
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Up | KeyCode::BackTab => self.focus = self.focus.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                self.focus = (self.focus + 1).min(self.fields.len() - 1);
            }
            KeyCode::Right => self.adjust(field, true),
            KeyCode::Left => self.adjust(field, false),
            KeyCode::Char(' ') if matches!(field, CampaignField::Benefit(_)) => {
                self.adjust(field, true)
            }
            KeyCode::Char('+') if field.step().is_some() => self.adjust(field, true),
            KeyCode::Char('-') if field.step().is_some() => self.adjust(field, false),
            KeyCode::Char(c) => {
                if let Some(text) = self.typed_mut(field) {
                    text.push(c);
                } else if let (Some(digit), Some(value)) = (c.to_digit(10), self.number_mut(field)) {
                    *value = value.saturating_mul(10).saturating_add(digit);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = self.typed_mut(field) {
                    text.pop();
                } else if let Some(value) = self.number_mut(field) {
                    *value /= 10;
                }
            }
            _ => {}
        }
        FormAction::Continue
    }

    /// Left/Right on the focused field: cycle, toggle or step
    fn adjust(&mut self, field: CampaignField, forward: bool) {
        if let CampaignField::Benefit(i) = field {
            if let Some(benefit) = ADDITIONAL_BENEFITS.get(i) {
                self.config.toggle_benefit(benefit);
            }
            return;
        }

        if let Some(choices) = field.choices() {
            if let Some(value) = self.text_mut(field) {
                *value = cycle(choices, value, forward).to_string();
            }
            return;
        }

        if let Some((step, min)) = field.step() {
            if let Some(value) = self.number_mut(field) {
                *value = if forward {
                    value.saturating_add(step)
                } else {
                    value.saturating_sub(step)
                }
                .max(min);
            }
        }
    }

    /// String behind each text or choice field
    fn text_mut(&mut self, field: CampaignField) -> Option<&mut String> {
        let config = &mut self.config;
        match field {
            CampaignField::FieldName => Some(&mut config.field_name),
            CampaignField::Address => Some(&mut config.address),
            CampaignField::Category => Some(&mut config.product_category),
            CampaignField::DownPayment => Some(&mut config.down_payment),
            CampaignField::MainConcern => Some(&mut config.main_concern),
            CampaignField::Keypoint(i) => keypoint_mut(&mut config.keypoints, i),
            _ => None,
        }
    }

    /// Strings edited by typing; choice fields only cycle
    fn typed_mut(&mut self, field: CampaignField) -> Option<&mut String> {
        if field.choices().is_some() {
            return None;
        }
        self.text_mut(field)
    }

    fn number_mut(&mut self, field: CampaignField) -> Option<&mut u32> {
        let config = &mut self.config;
        match field {
            CampaignField::DownPaymentAmount => Some(&mut config.down_payment_amount),
            CampaignField::Supply => Some(&mut config.supply),
            CampaignField::SalesPrice => Some(&mut config.sales_price),
            CampaignField::TargetPrice => Some(&mut config.target_price),
            CampaignField::MonthlyBudget => Some(&mut config.monthly_budget),
            _ => None,
        }
    }

    fn value(&self, field: CampaignField) -> String {
        let config = &self.config;
        match field {
            CampaignField::FieldName => config.field_name.clone(),
            CampaignField::Address => config.address.clone(),
            CampaignField::Category => format!("◀ {} ▶", config.product_category),
            CampaignField::DownPayment => format!("◀ {} ▶", config.down_payment),
            CampaignField::MainConcern => format!("◀ {} ▶", config.main_concern),
            CampaignField::DownPaymentAmount => format!("{}만원", config.down_payment_amount),
            CampaignField::Supply => format!("{}세대", config.supply),
            CampaignField::SalesPrice => format!("{}만원", config.sales_price),
            CampaignField::TargetPrice => format!(
                "{}만원 (차이 {:.1}%)",
                config.target_price,
                config.market_gap_percent()
            ),
            CampaignField::MonthlyBudget => format!("{}만원", config.monthly_budget),
            CampaignField::Benefit(i) => {
                let benefit = ADDITIONAL_BENEFITS.get(i).copied().unwrap_or_default();
                let mark = if config.additional_benefits.iter().any(|b| b == benefit) {
                    "[x]"
                } else {
                    "[ ]"
                };
                format!("{mark} {benefit}")
            }
            CampaignField::Keypoint(i) => {
                let keypoints = &config.keypoints;
                [
                    &keypoints.location,
                    &keypoints.product,
                    &keypoints.benefit,
                    &keypoints.gift,
                    &keypoints.extra,
                ]
                .get(i)
                .map(|s| s.to_string())
                .unwrap_or_default()
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.focus;
                let marker = if focused { "▶ " } else { "  " };
                let value_style = if focused {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{:<10}", field.label()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(self.value(*field), value_style),
                ])
            })
            .collect();

        let form = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(form_block(
                " 캠페인 설정 (↑↓=이동 │ ←→/Space=변경 │ Enter=분석 │ Esc=뒤로) ",
            ));
        frame.render_widget(form, area);
    }
}

fn keypoint_mut(keypoints: &mut Keypoints, index: usize) -> Option<&mut String> {
    match index {
        0 => Some(&mut keypoints.location),
        1 => Some(&mut keypoints.product),
        2 => Some(&mut keypoints.benefit),
        3 => Some(&mut keypoints.gift),
        4 => Some(&mut keypoints.extra),
        _ => None,
    }
}

/// Next (or previous) entry after `current`; unknown values restart the list
fn cycle<'a>(choices: &[&'a str], current: &str, forward: bool) -> &'a str {
    let len = choices.len();
    let next = match choices.iter().position(|c| *c == current) {
        Some(pos) if forward => (pos + 1) % len,
        Some(pos) => (pos + len - 1) % len,
        None => 0,
    };
    choices[next]
}

fn form_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(Color::DarkGray))
}

const LEAD_LABELS: [&str; 4] = ["이름", "연락처", "직급", "현장명"];

/// Consultation request opened from a report
pub struct LeadEditor {
    pub lead: LeadForm,
    focus: usize,
    pub submitting: bool,
}

impl LeadEditor {
    /// Empty request for `site`
    pub fn new(site: &str) -> Self {
        Self {
            lead: LeadForm {
                site: site.to_string(),
                ..LeadForm::default()
            },
            focus: 0,
            submitting: false,
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.lead.name,
            1 => &mut self.lead.phone,
            2 => &mut self.lead.rank,
            _ => &mut self.lead.site,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if self.submitting {
            return FormAction::Continue;
        }
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Up | KeyCode::BackTab => self.focus = self.focus.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                self.focus = (self.focus + 1).min(LEAD_LABELS.len() - 1);
            }
            KeyCode::Char(c) => self.field_mut(self.focus).push(c),
            KeyCode::Backspace => {
                self.field_mut(self.focus).pop();
            }
            _ => {}
        }
        FormAction::Continue
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let values = [
            &self.lead.name,
            &self.lead.phone,
            &self.lead.rank,
            &self.lead.site,
        ];
        let mut lines: Vec<Line> = LEAD_LABELS
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (label, value))| {
                let marker = if i == self.focus { "▶ " } else { "  " };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{label:<8}"), Style::default().fg(Color::Cyan)),
                    Span::raw(value.clone()),
                ])
            })
            .collect();
        if self.submitting {
            lines.push(Line::from(""));
            lines.push(Line::styled("신청 중...", Style::default().fg(Color::Yellow)));
        }

        let form = Paragraph::new(lines).block(form_block(
            " 전문가 상담 신청 (↑↓=이동 │ Enter=신청 │ Esc=취소) ",
        ));
        frame.render_widget(form, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn focus_on(form: &mut CampaignForm, field: CampaignField) {
        while form.focused() != field {
            form.handle_key(key(KeyCode::Down));
        }
    }

    #[test]
    fn test_cycle_wraps_and_restarts_unknown() {
        assert_eq!(cycle(MAIN_CONCERNS, "방문객 없음", true), "DB 수량 부족");
        assert_eq!(cycle(MAIN_CONCERNS, "DB 수량 부족", false), "방문객 없음");
        assert_eq!(cycle(PRODUCT_CATEGORIES, "도시형생활주택", true), "아파트");
    }

    #[test]
    fn test_choice_fields_cycle_but_ignore_typing() {
        let mut form = CampaignForm::new(CampaignConfig::default());
        focus_on(&mut form, CampaignField::Category);

        form.handle_key(key(KeyCode::Right));
        assert_eq!(form.config.product_category, "민간임대");
        form.handle_key(key(KeyCode::Char('x')));
        assert_eq!(form.config.product_category, "민간임대");

        focus_on(&mut form, CampaignField::DownPayment);
        form.handle_key(key(KeyCode::Left));
        assert_eq!(form.config.down_payment, "5%");
    }

    #[test]
    fn test_space_toggles_benefit() {
        let mut form = CampaignForm::new(CampaignConfig::default());
        focus_on(&mut form, CampaignField::Benefit(2));

        form.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(form.config.additional_benefits, vec!["발코니 확장".to_string()]);
        form.handle_key(key(KeyCode::Char(' ')));
        assert!(form.config.additional_benefits.is_empty());
    }

    #[test]
    fn test_numeric_fields_take_digits_and_steps() {
        let mut form = CampaignForm::new(CampaignConfig::default());
        focus_on(&mut form, CampaignField::SalesPrice);

        for _ in 0..4 {
            form.handle_key(key(KeyCode::Backspace));
        }
        assert_eq!(form.config.sales_price, 0);
        for c in "2650".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        form.handle_key(key(KeyCode::Char('a')));
        assert_eq!(form.config.sales_price, 2650);

        focus_on(&mut form, CampaignField::MonthlyBudget);
        for _ in 0..20 {
            form.handle_key(key(KeyCode::Char('-')));
        }
        assert_eq!(form.config.monthly_budget, SIMULATED_BUDGET_STEP);
    }

    #[test]
    fn test_keypoints_are_typed_per_theme() {
        let mut form = CampaignForm::new(CampaignConfig::default());
        focus_on(&mut form, CampaignField::Keypoint(3));
        for c in "상품권".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(form.config.keypoints.gift, "상품권");
        assert_eq!(form.config.keypoints.joined(), "상품권");
    }

    #[test]
    fn test_focus_stays_in_bounds() {
        let mut form = CampaignForm::new(CampaignConfig::default());
        form.handle_key(key(KeyCode::Up));
        assert_eq!(form.focused(), CampaignField::FieldName);
        for _ in 0..50 {
            form.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(form.focused(), CampaignField::MonthlyBudget);
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Submit);
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
    }

    #[test]
    fn test_lead_editor_fills_fields_in_order() {
        let mut editor = LeadEditor::new("의정부 자이");
        for c in "홍길동".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
        editor.handle_key(key(KeyCode::Tab));
        for c in "010".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
        editor.handle_key(key(KeyCode::Backspace));

        assert_eq!(editor.lead.name, "홍길동");
        assert_eq!(editor.lead.phone, "01");
        assert_eq!(editor.lead.site, "의정부 자이");
        assert_eq!(editor.lead.missing_fields(), vec!["rank"]);
    }

    #[test]
    fn test_lead_editor_ignores_keys_while_submitting() {
        let mut editor = LeadEditor::new("현장");
        editor.submitting = true;
        assert_eq!(editor.handle_key(key(KeyCode::Esc)), FormAction::Continue);
        editor.handle_key(key(KeyCode::Char('a')));
        assert!(editor.lead.name.is_empty());
    }
}
