//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod slot_ticker;
pub mod store_flush;

// Re-export main functions
pub use slot_ticker::slot_tick_task;
pub use store_flush::store_flush_task;
