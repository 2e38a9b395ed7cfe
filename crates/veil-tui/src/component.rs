//! Component trait: the interface every view panel implements.
//!
//! - Components own their local UI state (cursor, input text).
//! - Session data arrives read-only as a `SessionState` snapshot.
//! - Components return `Vec<Action>`; they never touch the session directly.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use veil_core::session::SessionState;

use crate::action::Action;

pub trait Component {
    /// Handle a key event while this view is active.
    fn handle_key(&mut self, key: KeyEvent, state: &SessionState) -> Vec<Action>;

    /// Render into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &SessionState);

    /// True while a text input owns the keyboard; global keys are suspended.
    fn is_editing(&self) -> bool {
        false
    }
}
