//! Session timer manager

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    state::SlotStatus,
    store::KeyValueStore,
    utils::duration_text::parse_duration_text,
};

use super::{LiveStatusSink, ManualEntry, SlotName, TickCadence, TickHandle, TimerSlot};

/// Owns the fixed slot set and mirrors every transition into the store
///
/// Operations never fail: redundant or conflicting requests are ignored and
/// reported through the returned `bool`.
pub struct SessionTimerManager {
    /// Indexed by [`SlotName::index`]
    slots: Vec<TimerSlot>,
    handles: HashMap<SlotName, TickHandle>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cadence: Arc<dyn TickCadence>,
    live_status: Arc<dyn LiveStatusSink>,
}

impl SessionTimerManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        cadence: Arc<dyn TickCadence>,
        live_status: Arc<dyn LiveStatusSink>,
    ) -> Self {
        let slots = SlotName::ALL.into_iter().map(TimerSlot::new).collect();

        Self {
            slots,
            handles: HashMap::new(),
            store,
            clock,
            cadence,
            live_status,
        }
    }

    /// Start or resume a slot; ignored if running or in edit mode
    pub fn start_slot(&mut self, name: SlotName) -> bool {
        let now = self.clock.now();
        let slot = self.slot(name);
        if slot.is_running() {
            debug!("Ignoring start for {}: already running", name);
            return false;
        }
        if slot.is_editing() {
            debug!("Ignoring start for {}: editing a saved record", name);
            return false;
        }

        let store = Arc::clone(&self.store);
        self.slot_mut(name).start(now, store.as_ref());
        self.attach_cadence(name);
        info!("Timer {} started", name);

        self.refresh_live_status();
        true
    }

    /// Pause a slot; returns whether it was running
    pub fn stop_slot(&mut self, name: SlotName) -> bool {
        self.cancel_cadence(name);

        let now = self.clock.now();
        let store = Arc::clone(&self.store);
        let slot = self.slot_mut(name);
        let was_running = slot.is_running();
        slot.stop(now, store.as_ref());
        if was_running {
            info!("Timer {} stopped at {:.0}s", name, slot.elapsed());
        }

        self.flush_store();
        self.refresh_live_status();
        was_running
    }

    pub fn reset_slot(&mut self, name: SlotName) {
        self.cancel_cadence(name);

        let now = self.clock.now();
        let store = Arc::clone(&self.store);
        let slot = self.slot_mut(name);
        let was_running = slot.is_running();
        slot.reset(now, store.as_ref());
        info!("Timer {} reset", name);

        self.flush_store();
        if was_running {
            self.refresh_live_status();
        }
    }

    /// Overwrite the manual entry fields; rejected while the slot runs
    pub fn manual_set_slot(
        &mut self,
        name: SlotName,
        minutes: &str,
        seconds: &str,
        hours: Option<&str>,
    ) -> bool {
        let entry = ManualEntry::new(hours.unwrap_or(""), minutes, seconds);
        let applied = self.slot_mut(name).set_manual(entry);
        if applied {
            debug!("Manual duration for {} set", name);
        } else {
            warn!("Ignoring manual duration for {}: timer is running", name);
        }
        applied
    }

    /// Duration in seconds to persist when the record is committed
    pub fn snapshot_for_save(&self, name: SlotName) -> u64 {
        self.slot(name).resolve_duration(self.clock.now())
    }

    /// Recompute a running slot's elapsed time; stale ticks are no-ops
    pub fn tick(&mut self, name: SlotName) -> bool {
        let now = self.clock.now();
        let store = Arc::clone(&self.store);
        self.slot_mut(name).tick(now, store.as_ref())
    }

    /// Load a saved record's duration text for editing; the slot will not run
    pub fn open_for_edit(&mut self, name: SlotName, historical_text: &str) -> bool {
        if self.slot(name).is_running() {
            warn!("Cannot edit a {} record while its timer is running", name);
            return false;
        }
        let seconds = parse_duration_text(historical_text);
        self.slot_mut(name).seed_from_record(seconds);
        debug!("Editing {} record with {}s", name, seconds);
        true
    }

    pub fn finish_edit(&mut self, name: SlotName) {
        let slot = self.slot_mut(name);
        if slot.is_editing() {
            slot.leave_edit();
        }
    }

    /// Teardown: snapshot every running or paused slot and flush
    pub fn persist_snapshot(&mut self) -> usize {
        let now = self.clock.now();
        let store = Arc::clone(&self.store);
        let saved = SlotName::ALL
            .into_iter()
            .filter(|name| !self.slot(*name).is_editing())
            .filter(|name| self.slot(*name).save_snapshot(now, store.as_ref()))
            .count();

        self.flush_store();
        info!("Saved teardown snapshot for {} timers", saved);
        saved
    }

    /// Drop every tick schedule, leaving durable state untouched
    pub fn cancel_all(&mut self) {
        for (name, handle) in self.handles.drain() {
            debug!("Cancelling ticks for {}", name);
            handle.cancel();
        }
    }

    pub fn is_running(&self, name: SlotName) -> bool {
        self.slot(name).is_running()
    }

    /// Elapsed seconds as of now, live while running
    pub fn elapsed(&self, name: SlotName) -> f64 {
        self.slot(name).live_elapsed(self.clock.now())
    }

    pub fn status(&self, name: SlotName) -> SlotStatus {
        let slot = self.slot(name);
        SlotStatus::from_slot(slot, slot.live_elapsed(self.clock.now()))
    }

    pub fn statuses(&self) -> Vec<SlotStatus> {
        SlotName::ALL.into_iter().map(|name| self.status(name)).collect()
    }

    pub fn has_cadence(&self, name: SlotName) -> bool {
        self.handles.contains_key(&name)
    }

    pub fn slot(&self, name: SlotName) -> &TimerSlot {
        &self.slots[name.index()]
    }

    pub(crate) fn slot_mut(&mut self, name: SlotName) -> &mut TimerSlot {
        &mut self.slots[name.index()]
    }

    pub(crate) fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub(crate) fn attach_cadence(&mut self, name: SlotName) {
        let handle = self.cadence.attach(name);
        if let Some(previous) = self.handles.insert(name, handle) {
            previous.cancel();
        }
    }

    fn cancel_cadence(&mut self, name: SlotName) {
        if let Some(handle) = self.handles.remove(&name) {
            handle.cancel();
        }
    }

    pub(crate) fn flush_store(&self) {
        if let Err(e) = self.store.flush() {
            warn!("Failed to flush timer store: {}", e);
        }
    }

    pub(crate) fn refresh_live_status(&self) {
        self.live_status.refresh(&self.statuses());
    }
}

impl std::fmt::Debug for SessionTimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimerManager")
            .field("slots", &self.slots)
            .field("handles", &self.handles.len())
            .finish()
    }
}
