//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    records::ActivityRecord,
    state::{SlotOutcome, SlotStatus},
    timers::RecoveryReport,
};

/// API response structure for slot operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<SlotStatus>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: Option<SlotStatus>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Build from an operation outcome: `applied` or `ignored`
    pub fn from_outcome(outcome: SlotOutcome, applied: &str, ignored: &str) -> Self {
        if outcome.applied {
            Self::new("applied", applied.to_string(), Some(outcome.status))
        } else {
            Self::new("ignored", ignored.to_string(), Some(outcome.status))
        }
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error", message, None)
    }
}

/// Body of `POST /timers/:slot/manual`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualRequest {
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
    #[serde(default)]
    pub hours: Option<String>,
}

/// Body of `POST /timers/:slot/save`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `POST /timers/:slot/edit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// Details text of the saved record, e.g. `Duration: 12m 5s`
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub record: ActivityRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResponse {
    pub status: String,
    pub snapshots_saved: Option<usize>,
    pub recovery: Option<RecoveryReport>,
    pub timers: Vec<SlotStatus>,
}

/// Status response with every timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<SlotStatus>,
    pub running: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
