//! Activity record store collaborator
//!
//! Finalized records are handed to a [`RecordStore`] when the user commits a
//! timer. Querying and sync live elsewhere; this crate only appends.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::timers::SlotName;

/// A finalized activity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub duration_minutes: f64,
    pub notes: Option<String>,
}

impl ActivityRecord {
    /// Build the record for a committed timer slot
    pub fn from_slot(
        slot: SlotName,
        seconds: u64,
        timestamp: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        let kind = match slot {
            SlotName::Breastfeeding => "breastfeeding",
            SlotName::LeftPump | SlotName::RightPump => "pumping",
            SlotName::GenericActivity => "activity",
            SlotName::Sleep => "sleep",
        };
        let duration = format!("Duration: {}", slot.format_duration(seconds));
        let details = match slot {
            SlotName::LeftPump => format!("Left side, {}", duration),
            SlotName::RightPump => format!("Right side, {}", duration),
            _ => duration,
        };

        Self {
            kind: kind.to_string(),
            timestamp,
            details,
            duration_minutes: seconds as f64 / 60.0,
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Accepts finalized records for persistence
pub trait RecordStore: Send + Sync {
    fn save(&self, record: &ActivityRecord) -> anyhow::Result<()>;
}

/// Appends one JSON document per line
#[derive(Debug)]
pub struct JsonlRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl RecordStore for JsonlRecordStore {
    fn save(&self, record: &ActivityRecord) -> anyhow::Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock record file: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;
        writeln!(file, "{}", line).with_context(|| format!("Failed to write {:?}", self.path))?;

        info!("Saved {} record ({:.1} min)", record.kind, record.duration_minutes);
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<ActivityRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn save(&self, record: &ActivityRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock records: {}", e))?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::duration_text::parse_duration_text;
    use chrono::TimeZone;

    #[test]
    fn record_details_parse_back_to_duration() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let record = ActivityRecord::from_slot(SlotName::LeftPump, 754, at, None);

        assert_eq!(record.kind, "pumping");
        assert_eq!(record.details, "Left side, Duration: 12m 34s");
        assert_eq!(parse_duration_text(&record.details), 754);
    }

    #[test]
    fn blank_notes_are_dropped() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let record = ActivityRecord::from_slot(SlotName::Sleep, 5400, at, Some("  ".into()));
        assert_eq!(record.notes, None);
        assert_eq!(record.details, "Duration: 1h 30m 0s");
        assert_eq!(record.duration_minutes, 90.0);
    }

    #[test]
    fn jsonl_store_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records").join("activities.jsonl");
        let store = JsonlRecordStore::new(&path);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        store
            .save(&ActivityRecord::from_slot(SlotName::Sleep, 60, at, None))
            .unwrap();
        store
            .save(&ActivityRecord::from_slot(
                SlotName::Breastfeeding,
                600,
                at,
                Some("left first".into()),
            ))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let records: Vec<ActivityRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].notes.as_deref(), Some("left first"));
    }
}
