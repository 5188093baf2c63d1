//! Timer slot: the tracked state of one named stopwatch

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    clock::{anchor_for, seconds_since},
    store::{KeyValueStore, SlotKeys, StoreValue},
    utils::duration_text::{
        format_hours_minutes_seconds, format_minutes_seconds, parse_field, split_hms,
    },
};

/// The fixed set of stopwatches the manager owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotName {
    Breastfeeding,
    LeftPump,
    RightPump,
    GenericActivity,
    Sleep,
}

/// How a slot's duration is shown and entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUnit {
    MinutesSeconds,
    HoursMinutesSeconds,
}

impl SlotName {
    pub const ALL: [SlotName; 5] = [
        SlotName::Breastfeeding,
        SlotName::LeftPump,
        SlotName::RightPump,
        SlotName::GenericActivity,
        SlotName::Sleep,
    ];

    /// Position in [`SlotName::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Breastfeeding => "breastfeeding",
            SlotName::LeftPump => "left-pump",
            SlotName::RightPump => "right-pump",
            SlotName::GenericActivity => "generic-activity",
            SlotName::Sleep => "sleep",
        }
    }

    /// Store key prefix; `None` for slots that do not survive a restart
    pub fn store_prefix(&self) -> Option<&'static str> {
        match self {
            SlotName::Breastfeeding => Some("breastfeeding"),
            SlotName::LeftPump => Some("leftPumping"),
            SlotName::RightPump => Some("rightPumping"),
            SlotName::Sleep => Some("sleep"),
            SlotName::GenericActivity => None,
        }
    }

    pub fn keys(&self) -> Option<SlotKeys> {
        self.store_prefix().map(SlotKeys::for_prefix)
    }

    pub fn unit(&self) -> DisplayUnit {
        match self {
            SlotName::Sleep | SlotName::GenericActivity => DisplayUnit::HoursMinutesSeconds,
            _ => DisplayUnit::MinutesSeconds,
        }
    }

    /// Human readable duration in this slot's unit
    pub fn format_duration(&self, seconds: u64) -> String {
        match self.unit() {
            DisplayUnit::MinutesSeconds => format_minutes_seconds(seconds),
            DisplayUnit::HoursMinutesSeconds => format_hours_minutes_seconds(seconds),
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breastfeeding" => Ok(SlotName::Breastfeeding),
            "left-pump" | "leftPumping" => Ok(SlotName::LeftPump),
            "right-pump" | "rightPumping" => Ok(SlotName::RightPump),
            "generic-activity" | "activity" => Ok(SlotName::GenericActivity),
            "sleep" => Ok(SlotName::Sleep),
            other => Err(format!("Unknown timer slot: {}", other)),
        }
    }
}

/// User-typed duration fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
}

impl ManualEntry {
    pub fn new(hours: &str, minutes: &str, seconds: &str) -> Self {
        Self {
            hours: hours.to_string(),
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.hours, &self.minutes, &self.seconds]
            .iter()
            .all(|field| field.trim().is_empty())
    }

    pub fn total_seconds(&self) -> u64 {
        parse_field(&self.hours)
            .saturating_mul(3600)
            .saturating_add(parse_field(&self.minutes).saturating_mul(60))
            .saturating_add(parse_field(&self.seconds))
    }

    /// Fill the fields from a duration, in the layout of `unit`
    pub fn from_seconds(total: u64, unit: DisplayUnit) -> Self {
        match unit {
            DisplayUnit::MinutesSeconds => Self {
                hours: String::new(),
                minutes: (total / 60).to_string(),
                seconds: (total % 60).to_string(),
            },
            DisplayUnit::HoursMinutesSeconds => {
                let (hours, minutes, seconds) = split_hms(total);
                Self {
                    hours: hours.to_string(),
                    minutes: minutes.to_string(),
                    seconds: seconds.to_string(),
                }
            }
        }
    }
}

/// One named stopwatch
///
/// While running, `elapsed` is recomputed from `anchor_start_time` on every
/// tick rather than accumulated, so missed ticks never cause drift.
#[derive(Debug, Clone)]
pub struct TimerSlot {
    name: SlotName,
    keys: Option<SlotKeys>,
    is_running: bool,
    anchor_start_time: Option<DateTime<Utc>>,
    elapsed: f64,
    manual: Option<ManualEntry>,
    editing: bool,
}

impl TimerSlot {
    pub fn new(name: SlotName) -> Self {
        Self {
            name,
            keys: name.keys(),
            is_running: false,
            anchor_start_time: None,
            elapsed: 0.0,
            manual: None,
            editing: false,
        }
    }

    pub fn name(&self) -> SlotName {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn anchor_start_time(&self) -> Option<DateTime<Utc>> {
        self.anchor_start_time
    }

    /// Cached elapsed seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn manual(&self) -> Option<&ManualEntry> {
        self.manual.as_ref()
    }

    /// Elapsed seconds as of `now`, without waiting for the next tick
    pub fn live_elapsed(&self, now: DateTime<Utc>) -> f64 {
        match (self.is_running, self.anchor_start_time) {
            (true, Some(anchor)) => seconds_since(anchor, now),
            _ => self.elapsed,
        }
    }

    /// Begin (or resume) timing from the current elapsed value
    pub fn start(&mut self, now: DateTime<Utc>, store: &dyn KeyValueStore) {
        if let Some(manual) = self.manual.take() {
            if !manual.is_empty() {
                self.elapsed = manual.total_seconds() as f64;
            }
        }

        let anchor = anchor_for(self.elapsed, now);
        self.anchor_start_time = Some(anchor);
        self.is_running = true;

        if let Some(keys) = &self.keys {
            store.set(&keys.start_time, StoreValue::Timestamp(anchor));
            store.set(&keys.elapsed, StoreValue::Duration(self.elapsed));
            store.set(&keys.is_running, StoreValue::Flag(true));
        }
        // A live session supersedes any earlier paused snapshot
        self.clear_snapshot(store);
        debug!("Slot {} started at {:.0}s", self.name, self.elapsed);
    }

    /// Recompute elapsed time; returns false when the slot is not running
    pub fn tick(&mut self, now: DateTime<Utc>, store: &dyn KeyValueStore) -> bool {
        if !self.is_running {
            return false;
        }
        let Some(anchor) = self.anchor_start_time else {
            return false;
        };

        self.elapsed = seconds_since(anchor, now);
        if let Some(keys) = &self.keys {
            store.set(&keys.elapsed, StoreValue::Duration(self.elapsed));
        }
        true
    }

    /// Pause the slot, keeping the elapsed value in memory only
    ///
    /// Both the live keys and any teardown snapshot are dropped.
    pub fn stop(&mut self, now: DateTime<Utc>, store: &dyn KeyValueStore) {
        if self.is_running {
            self.elapsed = self.live_elapsed(now);
            debug!("Slot {} stopped at {:.0}s", self.name, self.elapsed);
        }
        self.is_running = false;

        if let Some(keys) = &self.keys {
            for key in keys.live() {
                store.remove(key);
            }
        }
        self.clear_snapshot(store);
    }

    /// Stop and forget everything, including the teardown snapshot
    pub fn reset(&mut self, now: DateTime<Utc>, store: &dyn KeyValueStore) {
        self.stop(now, store);
        self.elapsed = 0.0;
        self.anchor_start_time = None;
        self.manual = None;
        self.editing = false;
    }

    /// Replace the manual entry while stopped; ignored while running
    pub fn set_manual(&mut self, entry: ManualEntry) -> bool {
        if self.is_running {
            return false;
        }
        if entry.is_empty() {
            self.manual = None;
        } else {
            self.elapsed = entry.total_seconds() as f64;
            self.manual = Some(entry);
        }
        true
    }

    /// Authoritative duration when the record is committed
    pub fn resolve_duration(&self, now: DateTime<Utc>) -> u64 {
        if !self.is_running {
            if let Some(manual) = self.manual.as_ref().filter(|m| !m.is_empty()) {
                if self.elapsed > 0.0 || self.editing {
                    return manual.total_seconds();
                }
            }
        }
        self.live_elapsed(now).floor() as u64
    }

    /// Enter edit mode with a duration parsed from a saved record
    pub fn seed_from_record(&mut self, seconds: u64) {
        self.editing = true;
        self.is_running = false;
        self.anchor_start_time = None;
        self.elapsed = seconds as f64;
        self.manual = Some(ManualEntry::from_seconds(seconds, self.name.unit()));
    }

    pub fn leave_edit(&mut self) {
        self.editing = false;
        self.elapsed = 0.0;
        self.anchor_start_time = None;
        self.manual = None;
    }

    /// Write the teardown snapshot; returns false when there is nothing worth saving
    pub fn save_snapshot(&self, now: DateTime<Utc>, store: &dyn KeyValueStore) -> bool {
        let Some(keys) = &self.keys else {
            return false;
        };
        let elapsed = self.live_elapsed(now);
        if !self.is_running && elapsed <= 0.0 {
            return false;
        }

        store.set(&keys.saved_elapsed, StoreValue::Duration(elapsed));
        store.set(&keys.saved_is_running, StoreValue::Flag(self.is_running));
        match self.anchor_start_time {
            Some(anchor) => store.set(&keys.saved_start_time, StoreValue::Timestamp(anchor)),
            None => store.remove(&keys.saved_start_time),
        }
        true
    }

    pub fn clear_snapshot(&self, store: &dyn KeyValueStore) {
        if let Some(keys) = &self.keys {
            for key in keys.saved() {
                store.remove(key);
            }
        }
    }

    /// Re-enter the running state from a persisted anchor
    pub fn resume_from(&mut self, anchor: DateTime<Utc>, now: DateTime<Utc>) {
        self.anchor_start_time = Some(anchor);
        self.elapsed = seconds_since(anchor, now);
        self.is_running = true;
    }

    /// Restore a paused value without running
    pub fn restore_paused(&mut self, elapsed: f64, anchor: Option<DateTime<Utc>>) {
        self.is_running = false;
        self.elapsed = elapsed.max(0.0);
        self.anchor_start_time = anchor;
    }

    /// Mirror the elapsed value into the manual fields when none are typed
    pub fn derive_manual_if_blank(&mut self) -> bool {
        let blank = self.manual.as_ref().map_or(true, ManualEntry::is_empty);
        if !blank || self.elapsed <= 0.0 {
            return false;
        }
        self.manual = Some(ManualEntry::from_seconds(
            self.elapsed.floor() as u64,
            self.name.unit(),
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn start_writes_live_keys() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::LeftPump);
        slot.start(t0(), &store);

        assert!(slot.is_running());
        assert_eq!(store.get_flag("leftPumpingIsRunning"), Some(true));
        assert_eq!(store.get_timestamp("leftPumpingStartTime"), Some(t0()));
        assert_eq!(store.get_duration("leftPumpingElapsed"), Some(0.0));
    }

    #[test]
    fn tick_recomputes_from_anchor() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Sleep);
        slot.start(t0(), &store);

        assert!(slot.tick(t0() + Duration::seconds(3), &store));
        assert!(slot.tick(t0() + Duration::seconds(65), &store));
        assert_eq!(slot.elapsed(), 65.0);
        assert_eq!(store.get_duration("sleepElapsed"), Some(65.0));
    }

    #[test]
    fn tick_on_stopped_slot_is_noop() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Sleep);
        slot.start(t0(), &store);
        slot.stop(t0() + Duration::seconds(10), &store);

        assert!(!slot.tick(t0() + Duration::seconds(20), &store));
        assert_eq!(slot.elapsed(), 10.0);
        assert!(store.is_empty());
    }

    #[test]
    fn start_seeds_from_manual_entry() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Breastfeeding);
        assert!(slot.set_manual(ManualEntry::new("", "3", "15")));
        slot.start(t0(), &store);

        assert!(slot.manual().is_none());
        assert_eq!(slot.anchor_start_time(), Some(t0() - Duration::seconds(195)));
        assert_eq!(slot.live_elapsed(t0() + Duration::seconds(5)), 200.0);
    }

    #[test]
    fn manual_entry_rejected_while_running() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Breastfeeding);
        slot.start(t0(), &store);
        assert!(!slot.set_manual(ManualEntry::new("", "9", "0")));
        assert!(slot.manual().is_none());
    }

    #[test]
    fn reset_purges_all_keys() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::RightPump);
        slot.start(t0(), &store);
        assert!(slot.save_snapshot(t0() + Duration::seconds(4), &store));
        slot.reset(t0() + Duration::seconds(5), &store);

        assert_eq!(slot.elapsed(), 0.0);
        assert!(slot.anchor_start_time().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn stop_drops_snapshot_taken_while_running() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Sleep);
        slot.start(t0(), &store);
        assert!(slot.save_snapshot(t0() + Duration::seconds(60), &store));
        slot.stop(t0() + Duration::seconds(660), &store);

        assert_eq!(slot.elapsed(), 660.0);
        assert!(store.is_empty());
    }

    #[test]
    fn start_supersedes_paused_snapshot() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::Breastfeeding);
        slot.restore_paused(30.0, None);
        assert!(slot.save_snapshot(t0(), &store));
        slot.start(t0(), &store);

        assert!(store.get("breastfeedingElapsed_saved").is_none());
        assert!(store.get("breastfeedingIsRunning_saved").is_none());
        assert_eq!(store.get_duration("breastfeedingElapsed"), Some(30.0));
    }

    #[test]
    fn generic_activity_never_touches_store() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::GenericActivity);
        slot.start(t0(), &store);
        slot.tick(t0() + Duration::seconds(2), &store);
        assert!(!slot.save_snapshot(t0() + Duration::seconds(2), &store));
        assert!(store.is_empty());
    }

    #[test]
    fn manual_precedence_only_when_stopped() {
        let store = MemoryStore::new();
        let mut slot = TimerSlot::new(SlotName::LeftPump);
        slot.start(t0(), &store);
        slot.stop(t0() + Duration::seconds(42), &store);
        slot.set_manual(ManualEntry::new("", "2", "30"));

        assert_eq!(slot.resolve_duration(t0() + Duration::seconds(100)), 150);
    }

    #[test]
    fn seeded_record_fills_fields_by_unit() {
        let mut slot = TimerSlot::new(SlotName::Sleep);
        slot.seed_from_record(3725);
        assert!(slot.is_editing());
        assert_eq!(slot.manual(), Some(&ManualEntry::new("1", "2", "5")));

        let mut slot = TimerSlot::new(SlotName::LeftPump);
        slot.seed_from_record(3725);
        assert_eq!(slot.manual(), Some(&ManualEntry::new("", "62", "5")));
    }

    #[test]
    fn slot_names_parse() {
        for name in SlotName::ALL {
            assert_eq!(name.as_str().parse::<SlotName>().unwrap(), name);
        }
        assert!("nap".parse::<SlotName>().is_err());
    }
}
