//! Toast rendering: the session's notification queue in the top-right corner.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use veil_core::notify::{NotificationQueue, Severity};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

const MAX_VISIBLE: usize = 4;

/// Oldest on top. When more than `MAX_VISIBLE` are queued, the newest win.
pub fn draw(frame: &mut Frame, area: Rect, queue: &NotificationQueue) {
    if queue.is_empty() {
        return;
    }
    let max_width = (area.width / 2).clamp(30, 60);
    let skip = queue.len().saturating_sub(MAX_VISIBLE);
    let mut y = area.y + 1;

    for toast in queue.iter().skip(skip) {
        if y >= area.y + area.height {
            break;
        }

        let (color, icon) = match toast.severity {
            Severity::Info => (C_TOAST_INFO, "·"),
            Severity::Success => (C_TOAST_SUCCESS, "✓"),
            Severity::Warning => (C_TOAST_WARNING, "!"),
            Severity::Error => (C_TOAST_ERROR, "✗"),
        };

        let msg_len = toast.message.chars().count() as u16;
        let w = (msg_len + 4).min(max_width).min(area.width);
        let x = area.x + area.width.saturating_sub(w + 1);
        let toast_area = Rect {
            x,
            y,
            width: w,
            height: 1,
        };

        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(Line::from(vec![Span::styled(
            format!(" {} {} ", icon, &toast.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )]));
        frame.render_widget(paragraph, toast_area);
        y += 1;
    }
}
