//! Home view: URL input on top, open players below (newest first).

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use veil_core::{
    protocol::Command,
    render::{FrameMode, Player, PlayerState},
    session::SessionState,
};

use crate::{
    action::Action,
    component::Component,
    theme::{style_muted, style_secondary, style_selected, C_BADGE_PENDING, C_PRIMARY, C_SECONDARY},
    widgets::{
        pane::{pane_chrome, Badge},
        text::truncate,
        text_input::{InputAction, TextInput},
    },
};

pub struct Home {
    input: TextInput,
    list_state: ListState,
}

impl Home {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("▶", "paste a YouTube link or video id (i)"),
            list_state: ListState::default(),
        }
    }

    fn selected_player<'a>(&self, state: &'a SessionState) -> Option<&'a Player> {
        self.list_state.selected().and_then(|i| state.players.get(i))
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as isize;
        let next = (cur + delta).clamp(0, len as isize - 1) as usize;
        self.list_state.select(Some(next));
    }

    fn render_item(player: &Player, width: usize) -> ListItem<'static> {
        let mut first = vec![Span::styled(
            truncate(&player.title, width.saturating_sub(20)),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )];
        if player.state == PlayerState::MetadataPending {
            first.push(Span::styled(" ⋯", Style::default().fg(C_BADGE_PENDING)));
        }
        if player.frame == FrameMode::XFrameProxy {
            first.push(Span::styled(" [xframe]", style_secondary()));
        }

        let stamp = player.created_at.format("%H:%M:%S").to_string();
        let second = vec![
            Span::styled(format!("{}  ", stamp), style_muted()),
            Span::styled(
                truncate(&player.embed_url, width.saturating_sub(stamp.len() + 2)),
                Style::default().fg(C_SECONDARY),
            ),
        ];
        ListItem::new(vec![Line::from(first), Line::from(second)])
    }
}

impl Component for Home {
    fn handle_key(&mut self, key: KeyEvent, state: &SessionState) -> Vec<Action> {
        if self.input.is_active() {
            return match self.input.handle_key(key) {
                InputAction::Submitted(text) => {
                    self.input.clear();
                    self.list_state.select(Some(0));
                    vec![Action::Send(Command::Launch { input: text })]
                }
                InputAction::Cancelled | InputAction::Edited => vec![],
            };
        }

        let len = state.players.len();
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('/') => {
                self.input.activate();
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, len);
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, len);
                vec![]
            }
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_player(state) {
                Some(player) => vec![Action::Send(Command::RemovePlayer { id: player.id.0 })],
                None => vec![],
            },
            KeyCode::Char('y') | KeyCode::Enter => match self.selected_player(state) {
                Some(player) => vec![Action::CopyToClipboard(player.embed_url.clone())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &SessionState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let input_block = pane_chrome("Open", self.input.is_active(), None);
        let input_area = input_block.inner(rows[0]);
        frame.render_widget(input_block, rows[0]);
        self.input.draw(frame, input_area);

        let count = state.players.len().to_string();
        let list_block = pane_chrome(
            "Players",
            !self.input.is_active(),
            Some(Badge {
                text: &count,
                color: C_SECONDARY,
            }),
        );

        if state.players.is_empty() {
            self.list_state.select(None);
            let inner = list_block.inner(rows[1]);
            frame.render_widget(list_block, rows[1]);
            frame.render_widget(
                Paragraph::new(Span::styled("No players open.", style_muted())),
                inner,
            );
            return;
        }

        match self.list_state.selected() {
            Some(i) if i >= state.players.len() => {
                self.list_state.select(Some(state.players.len() - 1))
            }
            None => self.list_state.select(Some(0)),
            _ => {}
        }

        let width = rows[1].width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = state
            .players
            .iter()
            .map(|p| Self::render_item(p, width))
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_style(style_selected())
            .highlight_symbol("▌ ");
        frame.render_stateful_widget(list, rows[1], &mut self.list_state);
    }

    fn is_editing(&self) -> bool {
        self.input.is_active()
    }
}
