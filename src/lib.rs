//! Nursery Timers - persistent session timers for infant care tracking
//!
//! This library tracks a fixed set of named stopwatches (breastfeeding, left
//! and right pump, a generic activity and sleep) that survive process
//! restarts by mirroring their state into a durable key-value store.

pub mod api;
pub mod clock;
pub mod config;
pub mod records;
pub mod state;
pub mod store;
pub mod tasks;
pub mod timers;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timers::{SessionTimerManager, SlotName};
pub use utils::signals::shutdown_signal;
