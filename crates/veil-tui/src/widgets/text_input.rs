//! TextInput: single-line editor on top of tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED, C_SECONDARY};

pub enum InputAction {
    /// Enter pressed; carries the submitted text.
    Submitted(String),
    Cancelled,
    Edited,
}

pub struct TextInput {
    input: Input,
    active: bool,
    prompt: &'static str,
    placeholder: String,
}

impl TextInput {
    pub fn new(prompt: &'static str, placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            prompt,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    /// Esc leaves editing but keeps the text; Enter submits and leaves editing.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                self.active = false;
                InputAction::Cancelled
            }
            KeyCode::Enter => {
                self.active = false;
                InputAction::Submitted(self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                InputAction::Edited
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prefix = format!("{} ", self.prompt);
        let width = area.width.saturating_sub(prefix.chars().count() as u16 + 1) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();

        let body = if value.is_empty() && !self.active {
            Span::styled(self.placeholder.as_str(), Style::default().fg(C_MUTED))
        } else {
            Span::styled(
                value.chars().skip(scroll).collect::<String>(),
                Style::default().fg(C_INPUT_FG),
            )
        };
        let line = Line::from(vec![
            Span::styled(prefix.clone(), Style::default().fg(C_SECONDARY)),
            body,
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(C_INPUT_BG)),
            area,
        );

        if self.active {
            let offset = prefix.chars().count() + self.input.visual_cursor().saturating_sub(scroll);
            let cursor_x = area.x + offset as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
        }
    }
}
