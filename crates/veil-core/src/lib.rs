//! veil core: mirror discovery and content rendering for a privacy-oriented
//! video front end.
//!
//! A [`session::Session`] owns all mutable state. Front ends drive it with
//! async calls (or [`protocol::Command`]s) and redraw from
//! [`session::Session::snapshot`] whenever a [`protocol::SessionEvent`]
//! arrives.

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod notify;
pub mod platform;
pub mod prefs;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod session;
pub mod view;
