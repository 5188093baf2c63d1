//! Session timers
//!
//! A fixed set of named stopwatches that can be started, paused, resumed and
//! reset independently, and that survive restarts by mirroring their state
//! into the durable key-value store.

pub mod cadence;
pub mod live_status;
pub mod manager;
pub mod recovery;
pub mod slot;

pub use cadence::{IntervalCadence, ManualCadence, TickCadence, TickHandle};
pub use live_status::{LiveStatusSink, NoopLiveStatus, WatchLiveStatus};
pub use manager::SessionTimerManager;
pub use recovery::{recover, RecoveryReport};
pub use slot::{DisplayUnit, ManualEntry, SlotName, TimerSlot};
