use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

const TITLE: &str = " 🔍 현장명 또는 주소 (Enter=선택 │ Esc=지우기) ";

/// Single-line search box around tui-textarea
pub struct InputWidget {
    textarea: TextArea<'static>,
}

impl InputWidget {
    pub fn new() -> Self {
        Self {
            textarea: Self::fresh_textarea(),
        }
    }

    fn fresh_textarea() -> TextArea<'static> {
        let mut textarea = TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    TITLE,
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text("예: 힐스테이트, 의정부");
        textarea
    }

    /// Forward a key; returns true when the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.textarea.input(key)
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("")
    }

    /// Replace the content, cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.textarea = Self::fresh_textarea();
        self.textarea.insert_str(text);
    }

    pub fn clear(&mut self) {
        self.textarea = Self::fresh_textarea();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&self.textarea, area);
    }
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}
