//! Status bar along the bottom: mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use veil_core::view::ViewId;

use crate::theme::{C_MODE_INPUT, C_MODE_NORMAL, C_MUTED};

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, view: ViewId, editing: bool) {
    let (label, color) = if editing {
        ("INPUT", C_MODE_INPUT)
    } else {
        (view.title(), C_MODE_NORMAL)
    };

    let keys = if editing {
        " type  Enter submit  Esc leave input"
    } else {
        match view {
            ViewId::Home => {
                " i url  ↑↓/jk select  d remove  y copy embed  1-3/Tab views  r rediscover  q quit"
            }
            ViewId::Search => " i query  ↑↓/jk select  Enter play  1-3/Tab views  r rediscover  q quit",
            ViewId::Settings => " ↑↓/jk select  Enter apply  1-3/Tab views  r rediscover  q quit",
        }
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label.to_uppercase()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
