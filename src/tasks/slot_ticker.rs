//! Slot tick background task

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, trace};

use crate::{state::AppState, timers::SlotName};

/// Background task that applies cadence ticks to the shared timer manager
///
/// Ticks from every slot arrive on one channel and are applied in order, so
/// a tick can never interleave with a start, stop or reset of its slot.
pub async fn slot_tick_task(state: Arc<AppState>, mut ticks: UnboundedReceiver<SlotName>) {
    info!("Starting slot tick task");

    while let Some(slot) = ticks.recv().await {
        match state.tick(slot) {
            Ok(true) => trace!("Ticked {}", slot),
            // Delivered after the slot stopped
            Ok(false) => trace!("Dropped stale tick for {}", slot),
            Err(e) => error!("Failed to tick {}: {}", slot, e),
        }
    }

    info!("Tick channel closed, slot tick task exiting");
}
