//! Slot status view shared with the live-status collaborator and the API

use serde::{Deserialize, Serialize};

use crate::{
    timers::{DisplayUnit, ManualEntry, SlotName, TimerSlot},
    utils::duration_text::format_clock,
};

/// Point-in-time view of one timer slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStatus {
    pub slot: SlotName,
    pub running: bool,
    pub elapsed_seconds: u64,
    /// Stopwatch text, `HH:MM:SS`
    pub display: String,
    pub unit: DisplayUnit,
    pub manual: Option<ManualEntry>,
    pub editing: bool,
    /// Manual fields are only editable while the slot is stopped
    pub manual_entry_enabled: bool,
}

impl SlotStatus {
    pub fn from_slot(slot: &TimerSlot, elapsed: f64) -> Self {
        let elapsed_seconds = elapsed.max(0.0).floor() as u64;
        Self {
            slot: slot.name(),
            running: slot.is_running(),
            elapsed_seconds,
            display: format_clock(elapsed_seconds),
            unit: slot.name().unit(),
            manual: slot.manual().cloned(),
            editing: slot.is_editing(),
            manual_entry_enabled: !slot.is_running(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.running
    }
}
