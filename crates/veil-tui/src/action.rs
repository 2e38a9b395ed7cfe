//! Action enum: what components ask the App to do.

use veil_core::protocol::Command;

#[derive(Debug, Clone)]
pub enum Action {
    /// Forward to the session loop.
    Send(Command),
    CopyToClipboard(String),
    Quit,
}
