//! State management module
//!
//! This module contains the application state shared by the HTTP handlers and
//! background tasks.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, SlotOutcome};
pub use timer_state::SlotStatus;
