//! App: component-based event loop.
//!
//! - `App` owns the components and the latest `SessionState` snapshot.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message or tick.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands flow out to `SessionCore` through `event_tx`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use veil_core::{
    notify::Severity,
    protocol::{Command, SessionEvent},
    session::{Session, SessionState},
    view::ViewId,
};

use crate::{
    action::Action,
    component::Component,
    components::{header::Header, home::Home, search::Search, settings::Settings},
    core::CoreEvent,
    theme::C_BG,
    widgets::{status_bar::draw_keys_bar, toast},
};

const TICK_MS: u64 = 100;
const TICK_MS_OPTIMIZED: u64 = 500;

enum AppMessage {
    Event(Event),
    StateUpdated(SessionState),
}

pub struct App {
    session: Arc<Session>,
    event_tx: mpsc::Sender<CoreEvent>,
    state: SessionState,
    header: Header,
    home: Home,
    search: Search,
    settings: Settings,
    should_quit: bool,
}

impl App {
    pub fn new(session: Arc<Session>, event_tx: mpsc::Sender<CoreEvent>, state: SessionState) -> Self {
        Self {
            session,
            event_tx,
            state,
            header: Header::new(),
            home: Home::new(),
            search: Search::new(),
            settings: Settings::new(),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard events ──────────────────────────────────
        let key_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if key_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: session updates → fresh snapshot ─────────────────
        let mut updates = self.session.subscribe();
        let bc_session = self.session.clone();
        let bc_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(SessionEvent::StateUpdated { .. }) => {
                        let state = bc_session.snapshot().await;
                        if bc_tx.send(AppMessage::StateUpdated(state)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("session updates lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // Animation tick; slower in optimized mode.
        let mut tick_ms = self.tick_ms();
        let mut tick = tokio::time::interval(Duration::from_millis(tick_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg).await;
                    // Coalesce bursts of snapshots into one redraw.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next).await;
                    }
                }
                _ = tick.tick() => {
                    self.header.tick();
                }
            }

            if self.tick_ms() != tick_ms {
                tick_ms = self.tick_ms();
                tick = tokio::time::interval(Duration::from_millis(tick_ms));
                tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        let _ = self.event_tx.send(CoreEvent::Shutdown).await;
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn tick_ms(&self) -> u64 {
        if self.state.optimized_mode {
            TICK_MS_OPTIMIZED
        } else {
            TICK_MS
        }
    }

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::StateUpdated(state) => {
                // Snapshots can arrive out of order; keep the newest.
                if state.rev >= self.state.rev {
                    self.state = state;
                }
            }
        }
    }

    fn active(&mut self) -> &mut dyn Component {
        match self.state.view.current() {
            ViewId::Home => &mut self.home,
            ViewId::Search => &mut self.search,
            ViewId::Settings => &mut self.settings,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        let state = self.state.clone();
        if self.active().is_editing() {
            return self.active().handle_key(key, &state);
        }

        let switch = |view: ViewId| {
            vec![Action::Send(Command::SwitchView {
                view: view.as_str().to_string(),
            })]
        };
        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char('1') => switch(ViewId::Home),
            KeyCode::Char('2') => switch(ViewId::Search),
            KeyCode::Char('3') => switch(ViewId::Settings),
            KeyCode::Tab => switch(state.view.current().next()),
            KeyCode::Char('r') => vec![Action::Send(Command::Discover)],
            _ => self.active().handle_key(key, &state),
        }
    }

    async fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Send(cmd) => {
                if self.event_tx.send(CoreEvent::Command(cmd)).await.is_err() {
                    warn!("session loop is gone; command dropped");
                }
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        self.session.notify("Embed URL copied", Severity::Success).await;
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.session
                            .notify(format!("clipboard error: {}", e), Severity::Error)
                            .await;
                    }
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let state = &self.state;
        self.header.draw(frame, rows[0], state);
        let view = state.view.current();
        let editing = match view {
            ViewId::Home => {
                self.home.draw(frame, rows[1], state);
                self.home.is_editing()
            }
            ViewId::Search => {
                self.search.draw(frame, rows[1], state);
                self.search.is_editing()
            }
            ViewId::Settings => {
                self.settings.draw(frame, rows[1], state);
                self.settings.is_editing()
            }
        };
        draw_keys_bar(frame, rows[2], view, editing);
        toast::draw(frame, area, &state.notifications);
    }
}
