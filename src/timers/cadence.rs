//! Tick cadence: periodic tick scheduling with explicit cancel handles

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use super::SlotName;

/// Cancel handle for one slot's tick schedule
///
/// Cancelling is synchronous; a tick that was already delivered before the
/// cancel is still delivered and must be ignored by the receiver.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing behind it
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Something that can deliver periodic ticks for a slot
pub trait TickCadence: Send + Sync {
    fn attach(&self, slot: SlotName) -> TickHandle;
}

/// Spawns one tokio interval per running slot, delivering ticks over a channel
#[derive(Debug, Clone)]
pub struct IntervalCadence {
    period: Duration,
    tx: mpsc::UnboundedSender<SlotName>,
}

impl IntervalCadence {
    /// Create a cadence and the receiver its ticks arrive on
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<SlotName>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { period, tx }, rx)
    }
}

impl TickCadence for IntervalCadence {
    fn attach(&self, slot: SlotName) -> TickHandle {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("No runtime to schedule ticks for {}: {}", slot, e);
                return TickHandle::detached();
            }
        };

        let tx = self.tx.clone();
        let period = self.period;
        let task = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(slot).is_err() {
                    debug!("Tick receiver gone, ending cadence for {}", slot);
                    break;
                }
            }
        });

        let abort = task.abort_handle();
        TickHandle::new(move || abort.abort())
    }
}

/// Cadence that never fires; tests drive ticks by hand
#[derive(Debug, Default, Clone)]
pub struct ManualCadence {
    attached: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl ManualCadence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of schedules ever attached
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Schedules attached and not yet cancelled
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl TickCadence for ManualCadence {
    fn attach(&self, _slot: SlotName) -> TickHandle {
        self.attached.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        TickHandle::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_cancels_once() {
        let cadence = ManualCadence::new();
        let handle = cadence.attach(SlotName::Sleep);
        assert_eq!(cadence.active(), 1);
        handle.cancel();
        assert_eq!(cadence.active(), 0);
        assert_eq!(cadence.attached(), 1);
    }

    #[test]
    fn dropping_handle_cancels() {
        let cadence = ManualCadence::new();
        drop(cadence.attach(SlotName::Sleep));
        assert_eq!(cadence.active(), 0);
    }

    #[test]
    fn attach_outside_runtime_is_detached() {
        let (cadence, _rx) = IntervalCadence::new(Duration::from_millis(10));
        let handle = cadence.attach(SlotName::Sleep);
        assert!(format!("{:?}", handle).contains("false"));
    }

    #[tokio::test]
    async fn interval_delivers_until_cancelled() {
        let (cadence, mut rx) = IntervalCadence::new(Duration::from_millis(10));
        let handle = cadence.attach(SlotName::LeftPump);

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some(SlotName::LeftPump));

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }
}
