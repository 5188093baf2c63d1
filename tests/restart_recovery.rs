//! Timers survive a process restart through the file-backed store

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use nursery_timers::{
    clock::ManualClock,
    store::{FileStore, KeyValueStore},
    timers::{recover, ManualCadence, NoopLiveStatus, SessionTimerManager, SlotName},
};

fn manager(store: Arc<FileStore>, clock: Arc<ManualClock>) -> SessionTimerManager {
    SessionTimerManager::new(
        store,
        clock,
        Arc::new(ManualCadence::new()),
        Arc::new(NoopLiveStatus),
    )
}

#[test]
fn running_timer_counts_time_while_killed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap(),
    ));

    {
        let store = Arc::new(FileStore::open(&path));
        let mut first = manager(store.clone(), clock.clone());
        first.start_slot(SlotName::Sleep);
        clock.advance(60);
        first.tick(SlotName::Sleep);
        store.flush().unwrap();
    }

    clock.advance(45 * 60);

    let store = Arc::new(FileStore::open(&path));
    let mut second = manager(store, clock.clone());
    let report = recover(&mut second);

    assert_eq!(report.resumed, vec![SlotName::Sleep]);
    assert!(second.is_running(SlotName::Sleep));
    assert_eq!(second.elapsed(SlotName::Sleep), 46.0 * 60.0);
}

#[test]
fn paused_timer_survives_teardown_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap(),
    ));

    {
        let store = Arc::new(FileStore::open(&path));
        let mut first = manager(store, clock.clone());
        first.start_slot(SlotName::LeftPump);
        clock.advance(312);
        first.stop_slot(SlotName::LeftPump);
        first.persist_snapshot();
    }

    clock.advance(7200);

    let store = Arc::new(FileStore::open(&path));
    let mut second = manager(store.clone(), clock.clone());
    let report = recover(&mut second);

    assert_eq!(report.restored, vec![SlotName::LeftPump]);
    assert!(!second.is_running(SlotName::LeftPump));
    assert_eq!(second.elapsed(SlotName::LeftPump), 312.0);
    assert_eq!(second.snapshot_for_save(SlotName::LeftPump), 312);

    // Consumed: a second reopen starts from zero
    let mut third = manager(Arc::new(FileStore::open(&path)), clock);
    assert!(recover(&mut third).restored.is_empty());
    assert_eq!(third.elapsed(SlotName::LeftPump), 0.0);
}

#[test]
fn stop_without_teardown_loses_paused_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap(),
    ));

    {
        let mut first = manager(Arc::new(FileStore::open(&path)), clock.clone());
        first.start_slot(SlotName::Breastfeeding);
        clock.advance(90);
        first.stop_slot(SlotName::Breastfeeding);
    }

    let mut second = manager(Arc::new(FileStore::open(&path)), clock);
    let report = recover(&mut second);

    assert!(report.is_empty());
    assert_eq!(second.elapsed(SlotName::Breastfeeding), 0.0);
}

#[test]
fn snapshot_from_earlier_background_is_not_restored_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.json");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap(),
    ));

    {
        let mut first = manager(Arc::new(FileStore::open(&path)), clock.clone());
        first.start_slot(SlotName::Sleep);
        clock.advance(60);
        first.persist_snapshot();
        recover(&mut first);
        clock.advance(600);
        first.stop_slot(SlotName::Sleep);
        assert_eq!(first.elapsed(SlotName::Sleep), 660.0);
    }

    let mut second = manager(Arc::new(FileStore::open(&path)), clock);
    let report = recover(&mut second);

    assert!(report.restored.is_empty());
    assert_eq!(second.elapsed(SlotName::Sleep), 0.0);
}
