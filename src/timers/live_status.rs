//! Live-status collaborator, notified after every start and stop

use tokio::sync::watch;
use tracing::debug;

use crate::state::SlotStatus;

/// Receives the full slot picture whenever a timer starts or stops
pub trait LiveStatusSink: Send + Sync {
    fn refresh(&self, statuses: &[SlotStatus]);
}

/// Publishes refreshes on a watch channel
#[derive(Debug)]
pub struct WatchLiveStatus {
    tx: watch::Sender<Vec<SlotStatus>>,
}

impl WatchLiveStatus {
    pub fn new() -> (Self, watch::Receiver<Vec<SlotStatus>>) {
        let (tx, rx) = watch::channel(Vec::new());
        (Self { tx }, rx)
    }
}

impl LiveStatusSink for WatchLiveStatus {
    fn refresh(&self, statuses: &[SlotStatus]) {
        let running = statuses.iter().filter(|s| s.running).count();
        debug!("Live status refresh: {} running", running);
        // send_replace keeps the value even with no receivers left
        self.tx.send_replace(statuses.to_vec());
    }
}

/// Discards refreshes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLiveStatus;

impl LiveStatusSink for NoopLiveStatus {
    fn refresh(&self, _statuses: &[SlotStatus]) {}
}
