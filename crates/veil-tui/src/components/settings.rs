//! Settings view: backend selector and the two preference toggles.
//!
//! Rows: `Auto`, one per registry backend, then X-Frame and Optimized.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};
use veil_core::{discovery::StatusKind, protocol::Command, session::SessionState};

use crate::{
    action::Action,
    component::Component,
    theme::{style_default, style_muted, style_selected, C_CONNECTED, C_SECONDARY},
    widgets::pane::pane_chrome,
};

enum Row<'a> {
    Auto,
    Backend { url: &'a str, label: &'a str, selected: bool },
    XFrame(bool),
    Optimized(bool),
}

fn rows(state: &SessionState) -> Vec<Row<'_>> {
    let mut rows = vec![Row::Auto];
    rows.extend(state.backends.iter().map(|b| Row::Backend {
        url: b.endpoint.as_str(),
        label: &b.label,
        selected: b.selected,
    }));
    rows.push(Row::XFrame(state.xframe_enabled));
    rows.push(Row::Optimized(state.optimized_mode));
    rows
}

fn toggle_span(on: bool) -> Span<'static> {
    if on {
        Span::styled("[on] ", Style::default().fg(C_CONNECTED))
    } else {
        Span::styled("[off]", style_muted())
    }
}

pub struct Settings {
    list_state: ListState,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default().with_selected(Some(0)),
        }
    }
}

impl Component for Settings {
    fn handle_key(&mut self, key: KeyEvent, state: &SessionState) -> Vec<Action> {
        let rows = rows(state);
        let cur = self.list_state.selected().unwrap_or(0).min(rows.len() - 1);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.list_state.select(Some((cur + 1).min(rows.len() - 1)));
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_state.select(Some(cur.saturating_sub(1)));
                vec![]
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let cmd = match &rows[cur] {
                    Row::Auto => Command::SelectBackend {
                        choice: "auto".to_string(),
                    },
                    Row::Backend { url, .. } => Command::SelectBackend {
                        choice: url.to_string(),
                    },
                    Row::XFrame(_) => Command::ToggleXFrame,
                    Row::Optimized(_) => Command::ToggleOptimized,
                };
                vec![Action::Send(cmd)]
            }
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &SessionState) {
        let auto_active = matches!(
            state.status.kind,
            StatusKind::Connected | StatusKind::Fallback | StatusKind::Searching
        );
        let items: Vec<ListItem> = rows(state)
            .into_iter()
            .map(|row| {
                let line = match row {
                    Row::Auto => Line::from(vec![
                        Span::styled(if auto_active { "● " } else { "○ " }, Style::default().fg(C_CONNECTED)),
                        Span::styled("Auto (fastest)", style_default()),
                    ]),
                    Row::Backend { label, selected, .. } => Line::from(vec![
                        Span::styled(
                            if selected && !auto_active { "● " } else if selected { "◆ " } else { "○ " },
                            Style::default().fg(C_CONNECTED),
                        ),
                        Span::styled(label.to_string(), style_default()),
                    ]),
                    Row::XFrame(on) => Line::from(vec![
                        toggle_span(on),
                        Span::styled(" X-Frame proxy", Style::default().fg(C_SECONDARY)),
                    ]),
                    Row::Optimized(on) => Line::from(vec![
                        toggle_span(on),
                        Span::styled(" Optimized mode", Style::default().fg(C_SECONDARY)),
                    ]),
                };
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(pane_chrome("Settings", true, None))
            .highlight_style(style_selected())
            .highlight_symbol("▌ ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}
