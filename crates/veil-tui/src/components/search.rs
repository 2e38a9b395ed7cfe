//! Search view: query input and the current result set.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use veil_core::{protocol::Command, render::SearchResults, session::SessionState};

use crate::{
    action::Action,
    component::Component,
    theme::{style_muted, style_secondary, style_selected, C_PRIMARY, C_TOAST_ERROR},
    widgets::{
        pane::pane_chrome,
        text::truncate,
        text_input::{InputAction, TextInput},
    },
};

pub struct Search {
    input: TextInput,
    list_state: ListState,
}

impl Search {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("?", "search videos (i)"),
            list_state: ListState::default(),
        }
    }
}

impl Component for Search {
    fn handle_key(&mut self, key: KeyEvent, state: &SessionState) -> Vec<Action> {
        if self.input.is_active() {
            return match self.input.handle_key(key) {
                InputAction::Submitted(query) if !query.trim().is_empty() => {
                    self.list_state.select(Some(0));
                    vec![Action::Send(Command::Search { query })]
                }
                _ => vec![],
            };
        }

        let len = state.results.items().len();
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('/') => {
                self.input.activate();
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.list_state.select(Some(next));
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                let next = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.list_state.select(Some(next));
                vec![]
            }
            KeyCode::Enter => match self.list_state.selected() {
                Some(index) if index < len => vec![Action::Send(Command::OpenResult { index })],
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &SessionState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let input_block = pane_chrome("Search", self.input.is_active(), None);
        let input_area = input_block.inner(rows[0]);
        frame.render_widget(input_block, rows[0]);
        self.input.draw(frame, input_area);

        let block = pane_chrome("Results", !self.input.is_active(), None);
        let inner = block.inner(rows[1]);

        let message = match &state.results {
            SearchResults::Idle => Some(Span::styled("Type a query and press Enter.", style_muted())),
            SearchResults::Loading => Some(Span::styled("Loading...", style_secondary())),
            SearchResults::Failed => {
                Some(Span::styled("Search Failed.", Style::default().fg(C_TOAST_ERROR)))
            }
            SearchResults::Items(items) if items.is_empty() => {
                Some(Span::styled("No results.", style_muted()))
            }
            SearchResults::Items(_) => None,
        };
        if let Some(message) = message {
            frame.render_widget(block, rows[1]);
            frame.render_widget(Paragraph::new(message), inner);
            return;
        }

        let results = state.results.items();
        match self.list_state.selected() {
            Some(i) if i >= results.len() => self.list_state.select(Some(results.len() - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }

        let width = inner.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = results
            .iter()
            .map(|r| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        truncate(&r.title, width),
                        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(truncate(&r.author, width), style_secondary())),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(style_selected())
            .highlight_symbol("▌ ");
        frame.render_stateful_widget(list, rows[1], &mut self.list_state);
    }

    fn is_editing(&self) -> bool {
        self.input.is_active()
    }
}
