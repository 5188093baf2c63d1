//! Recovery sequencer
//!
//! Runs when the daemon starts and whenever the host comes back to the
//! foreground. For each persisted slot it either re-attaches a running timer
//! from its live anchor, so time spent suspended or killed is counted, or
//! consumes the paused snapshot written at teardown.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::StoreValue;

use super::{SessionTimerManager, SlotName};

/// What recovery did to each slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Running again from the live anchor
    pub resumed: Vec<SlotName>,
    /// Paused value restored from the teardown snapshot
    pub restored: Vec<SlotName>,
    /// Already running in memory, left alone
    pub skipped: Vec<SlotName>,
}

impl RecoveryReport {
    pub fn is_empty(&self) -> bool {
        self.resumed.is_empty() && self.restored.is_empty()
    }
}

pub fn recover(manager: &mut SessionTimerManager) -> RecoveryReport {
    let store = manager.store();
    let now = manager.now();
    let mut report = RecoveryReport::default();

    for name in SlotName::ALL {
        let Some(keys) = name.keys() else {
            continue;
        };

        let slot = manager.slot(name);
        if slot.is_running() {
            // The in-memory session owns the slot; a snapshot taken earlier is stale
            slot.clear_snapshot(store.as_ref());
            report.skipped.push(name);
            continue;
        }
        if slot.is_editing() {
            report.skipped.push(name);
            continue;
        }

        let live_running = store.get_flag(&keys.is_running).unwrap_or(false);
        let live_anchor = store.get_timestamp(&keys.start_time);

        if let (true, Some(anchor)) = (live_running, live_anchor) {
            let slot = manager.slot_mut(name);
            slot.resume_from(anchor, now);
            store.set(&keys.elapsed, StoreValue::Duration(slot.elapsed()));
            slot.clear_snapshot(store.as_ref());
            manager.attach_cadence(name);

            info!("Resumed {} timer at {:.0}s", name, manager.slot(name).elapsed());
            report.resumed.push(name);
            continue;
        }

        // Anything left under the live keys is a partial write
        for key in keys.live() {
            if store.contains(key) {
                debug!("Removing stale store entry {}", key);
                store.remove(key);
            }
        }

        if let Some(elapsed) = store.get_duration(&keys.saved_elapsed) {
            let anchor = store.get_timestamp(&keys.saved_start_time);
            let slot = manager.slot_mut(name);
            slot.restore_paused(elapsed, anchor);
            slot.clear_snapshot(store.as_ref());
            slot.derive_manual_if_blank();

            info!("Restored paused {} timer at {:.0}s", name, elapsed);
            report.restored.push(name);
        } else {
            // A snapshot without its elapsed value carries nothing to restore
            manager.slot(name).clear_snapshot(store.as_ref());
        }
    }

    manager.flush_store();
    if !report.resumed.is_empty() {
        manager.refresh_live_status();
    }
    report
}
