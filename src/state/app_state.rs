//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    clock::Clock,
    records::{ActivityRecord, RecordStore},
    store::KeyValueStore,
    timers::{
        recover, RecoveryReport, SessionTimerManager, SlotName, TickCadence, WatchLiveStatus,
    },
};

use super::SlotStatus;

/// Result of a slot operation: whether it applied, plus the resulting status
#[derive(Debug, Clone)]
pub struct SlotOutcome {
    pub applied: bool,
    pub status: SlotStatus,
}

/// Main application state that owns the timer manager and its collaborators
pub struct AppState {
    /// The one manager observing the slot set in this process
    pub timers: Arc<Mutex<SessionTimerManager>>,
    pub store: Arc<dyn KeyValueStore>,
    pub records: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    /// Latest live-status refresh
    pub live_status_rx: watch::Receiver<Vec<SlotStatus>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        store: Arc<dyn KeyValueStore>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        cadence: Arc<dyn TickCadence>,
    ) -> Self {
        let (live_status, live_status_rx) = WatchLiveStatus::new();
        let manager = SessionTimerManager::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            cadence,
            Arc::new(live_status),
        );

        Self {
            timers: Arc::new(Mutex::new(manager)),
            store,
            records,
            clock,
            live_status_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, SessionTimerManager>, String> {
        self.timers
            .lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))
    }

    /// Run an operation on the manager and record it as the last action
    pub fn with_timers<F, R>(&self, action: &str, op: F) -> Result<R, String>
    where
        F: FnOnce(&mut SessionTimerManager) -> R,
    {
        let mut timers = self.lock_timers()?;
        let result = op(&mut *timers);
        drop(timers);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    fn slot_op<F>(&self, slot: SlotName, action: &str, op: F) -> Result<SlotOutcome, String>
    where
        F: FnOnce(&mut SessionTimerManager) -> bool,
    {
        self.with_timers(&format!("{}:{}", action, slot), |timers| {
            let applied = op(&mut *timers);
            SlotOutcome {
                applied,
                status: timers.status(slot),
            }
        })
    }

    pub fn start(&self, slot: SlotName) -> Result<SlotOutcome, String> {
        self.slot_op(slot, "start", |timers| timers.start_slot(slot))
    }

    pub fn stop(&self, slot: SlotName) -> Result<SlotOutcome, String> {
        self.slot_op(slot, "stop", |timers| timers.stop_slot(slot))
    }

    pub fn reset(&self, slot: SlotName) -> Result<SlotOutcome, String> {
        self.slot_op(slot, "reset", |timers| {
            timers.reset_slot(slot);
            true
        })
    }

    pub fn manual_set(
        &self,
        slot: SlotName,
        minutes: &str,
        seconds: &str,
        hours: Option<&str>,
    ) -> Result<SlotOutcome, String> {
        self.slot_op(slot, "manual", |timers| {
            timers.manual_set_slot(slot, minutes, seconds, hours)
        })
    }

    pub fn open_for_edit(&self, slot: SlotName, details: &str) -> Result<SlotOutcome, String> {
        self.slot_op(slot, "edit", |timers| timers.open_for_edit(slot, details))
    }

    /// Commit the slot's duration as an activity record, then reset the slot
    ///
    /// The slot is left untouched when the record store rejects the record.
    pub fn save_record(
        &self,
        slot: SlotName,
        notes: Option<String>,
    ) -> Result<ActivityRecord, String> {
        let mut timers = self.lock_timers()?;
        let seconds = timers.snapshot_for_save(slot);
        let record = ActivityRecord::from_slot(slot, seconds, self.clock.now(), notes);

        self.records.save(&record).map_err(|e| {
            error!("Failed to save {} record: {:#}", slot, e);
            format!("Failed to save record: {}", e)
        })?;

        timers.reset_slot(slot);
        drop(timers);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(format!("save:{}", slot));
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        Ok(record)
    }

    /// Apply a delivered tick
    pub fn tick(&self, slot: SlotName) -> Result<bool, String> {
        Ok(self.lock_timers()?.tick(slot))
    }

    /// Host is going to the background: snapshot every slot and flush
    pub fn background(&self) -> Result<usize, String> {
        self.with_timers("background", |timers| timers.persist_snapshot())
    }

    /// Host is back in the foreground: run the recovery sequencer
    pub fn foreground(&self) -> Result<RecoveryReport, String> {
        let report = self.with_timers("foreground", recover)?;
        if !report.is_empty() {
            info!(
                "Recovery resumed {:?}, restored {:?}",
                report.resumed, report.restored
            );
        }
        Ok(report)
    }

    /// Final teardown before the process exits: snapshot, stop ticking, flush
    pub fn shutdown(&self) -> Result<usize, String> {
        let mut timers = self.lock_timers()?;
        let saved = timers.persist_snapshot();
        timers.cancel_all();
        drop(timers);

        self.store
            .flush()
            .map_err(|e| format!("Final store flush failed: {}", e))?;
        Ok(saved)
    }

    pub fn get_statuses(&self) -> Result<Vec<SlotStatus>, String> {
        Ok(self.lock_timers()?.statuses())
    }

    pub fn get_status(&self, slot: SlotName) -> Result<SlotStatus, String> {
        Ok(self.lock_timers()?.status(slot))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("timers", &self.timers)
            .field("port", &self.port)
            .field("host", &self.host)
            .finish()
    }
}
