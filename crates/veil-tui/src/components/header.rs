//! Header component: 2-row top bar.
//!
//! Row 1: brand, view tabs, backend status.
//! Row 2: drifting particle strip. Left blank in optimized mode.
//!
//! Not focusable.

use rand::Rng;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use veil_core::{discovery::StatusKind, session::SessionState, view::ViewId};

use crate::theme::{
    C_ACCENT, C_CONNECTED, C_FALLBACK, C_MUTED, C_PARTICLE, C_PRIMARY, C_SECONDARY,
};

const PARTICLE_GLYPHS: [char; 4] = ['·', '∙', '•', '°'];
/// One particle per this many columns.
const PARTICLE_DENSITY: u16 = 6;

struct Particle {
    x: f32,
    speed: f32,
    glyph: char,
}

pub struct Header {
    particles: Vec<Particle>,
    width: u16,
}

impl Header {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            width: 0,
        }
    }

    /// Advance the particle strip by one frame.
    pub fn tick(&mut self) {
        if self.width == 0 {
            return;
        }
        let width = self.width as f32;
        let mut rng = rand::thread_rng();
        for p in &mut self.particles {
            p.x += p.speed;
            if p.x >= width {
                p.x = 0.0;
                p.speed = rng.gen_range(0.15..0.9);
                p.glyph = PARTICLE_GLYPHS[rng.gen_range(0..PARTICLE_GLYPHS.len())];
            }
        }
    }

    fn reseed(&mut self, width: u16) {
        let mut rng = rand::thread_rng();
        let count = (width / PARTICLE_DENSITY).max(1) as usize;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..width.max(1) as f32),
                speed: rng.gen_range(0.15..0.9),
                glyph: PARTICLE_GLYPHS[rng.gen_range(0..PARTICLE_GLYPHS.len())],
            })
            .collect();
        self.width = width;
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &SessionState) {
        frame.render_widget(Clear, area);
        let row1 = Rect { height: 1, ..area };
        frame.render_widget(Paragraph::new(build_row1(state, area.width)), row1);

        if area.height < 2 || state.optimized_mode {
            return;
        }
        let row2 = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        if self.width != row2.width {
            self.reseed(row2.width);
        }
        let mut cells = vec![' '; row2.width as usize];
        for p in &self.particles {
            if let Some(cell) = cells.get_mut(p.x as usize) {
                *cell = p.glyph;
            }
        }
        let strip: String = cells.into_iter().collect();
        frame.render_widget(
            Paragraph::new(Span::styled(strip, Style::default().fg(C_PARTICLE))),
            row2,
        );
    }
}

fn build_row1(state: &SessionState, width: u16) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " veil ",
        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
    )];

    for (i, view) in ViewId::ALL.into_iter().enumerate() {
        let style = if state.view.is_active(view) {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, view.title()), style));
    }

    let status_color = match state.status.kind {
        StatusKind::Connected => C_CONNECTED,
        StatusKind::Fallback => C_FALLBACK,
        StatusKind::Manual => C_PRIMARY,
        StatusKind::Searching => C_SECONDARY,
        StatusKind::Idle => C_MUTED,
    };
    let status = format!("● {} ", state.status.text);

    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let pad = (width as usize).saturating_sub(used + status.width());
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(status, Style::default().fg(status_color)));
    Line::from(spans)
}
