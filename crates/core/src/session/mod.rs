//! Per-backend session ownership.
//!
//! A [`SessionManager`] keys everything by normalized backend address. Each
//! backend gets a [`BackendContext`] holding its session slot, the
//! capabilities the session was created with, and its sticky mode.

mod manager;

pub use manager::{BackendContext, SessionManager};
