//! Wall-clock sources for the timer subsystem

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to, for tests and simulated restarts
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a manual clock frozen at the given instant
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Move the clock forward by a number of seconds
    pub fn advance(&self, seconds: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += Duration::seconds(seconds);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

/// Seconds between `anchor` and `now`, clamped at zero
pub fn seconds_since(anchor: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - anchor).num_milliseconds();
    (millis as f64 / 1000.0).max(0.0)
}

/// Anchor that makes `seconds_since(anchor, now) == elapsed`
pub fn anchor_for(elapsed: f64, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::milliseconds((elapsed.max(0.0) * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(90);
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn seconds_since_never_negative() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let future = now + Duration::seconds(30);
        assert_eq!(seconds_since(future, now), 0.0);
        assert_eq!(seconds_since(now - Duration::seconds(12), now), 12.0);
    }

    #[test]
    fn anchor_round_trips_elapsed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let anchor = anchor_for(42.5, now);
        assert_eq!(seconds_since(anchor, now), 42.5);
    }
}
