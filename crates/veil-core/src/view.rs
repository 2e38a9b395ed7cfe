//! Which UI section is visible.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ViewError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// URL input and the player list.
    #[default]
    Home,
    Search,
    Settings,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [ViewId::Home, ViewId::Search, ViewId::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Search => "search",
            Self::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Search => "Search",
            Self::Settings => "Settings",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ViewError::UnknownView(s.to_string()))
    }
}

/// The current-view pointer. Exactly one view is active at a time.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(transparent)]
pub struct ViewController {
    current: ViewId,
}

impl ViewController {
    pub fn current(&self) -> ViewId {
        self.current
    }

    pub fn is_active(&self, view: ViewId) -> bool {
        self.current == view
    }

    /// Returns true if the view changed.
    pub fn switch(&mut self, view: ViewId) -> bool {
        let changed = self.current != view;
        self.current = view;
        changed
    }

    /// String form used by the HTTP surface. Unknown ids leave the view as is.
    pub fn switch_named(&mut self, name: &str) -> Result<bool, ViewError> {
        let view: ViewId = name.parse()?;
        Ok(self.switch(view))
    }
}
