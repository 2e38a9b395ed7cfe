//! Notification queue: transient status messages.
//!
//! Arrival order is display order. Nothing is deduplicated or prioritised;
//! each entry simply expires `ttl` after it was pushed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    #[serde(skip)]
    pub expires: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    #[serde(skip)]
    ttl: Duration,
    #[serde(skip)]
    next_id: u64,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
            next_id: 1,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.push_at(message, severity, Instant::now())
    }

    pub fn push_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notification {
            id,
            message: message.into(),
            severity,
            expires: now + self.ttl,
        });
        id
    }

    /// Drop expired entries. Returns true if anything was removed.
    pub fn prune(&mut self) -> bool {
        self.prune_at(Instant::now())
    }

    pub fn prune_at(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.expires > now);
        self.items.len() != before
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}
