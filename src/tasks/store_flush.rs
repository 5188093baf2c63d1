//! Periodic store flush background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::store::KeyValueStore;

/// Background task that lazily flushes tick writes to durable storage
pub async fn store_flush_task(store: Arc<dyn KeyValueStore>, period: Duration) {
    info!("Starting store flush task every {:?}", period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if let Err(e) = store.flush() {
            warn!("Periodic store flush failed: {}", e);
        }
    }
}
