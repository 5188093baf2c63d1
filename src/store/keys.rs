//! Store key layout for persisted timer slots

/// The six keys one persisted slot owns in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKeys {
    pub is_running: String,
    pub start_time: String,
    pub elapsed: String,
    pub saved_is_running: String,
    pub saved_start_time: String,
    pub saved_elapsed: String,
}

impl SlotKeys {
    /// Build the key set for a slot prefix such as `leftPumping`
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            is_running: format!("{prefix}IsRunning"),
            start_time: format!("{prefix}StartTime"),
            elapsed: format!("{prefix}Elapsed"),
            saved_is_running: format!("{prefix}IsRunning_saved"),
            saved_start_time: format!("{prefix}StartTime_saved"),
            saved_elapsed: format!("{prefix}Elapsed_saved"),
        }
    }

    /// Keys written while a slot is live
    pub fn live(&self) -> [&str; 3] {
        [&self.is_running, &self.start_time, &self.elapsed]
    }

    /// Keys of the paused snapshot written on teardown
    pub fn saved(&self) -> [&str; 3] {
        [
            &self.saved_is_running,
            &self.saved_start_time,
            &self.saved_elapsed,
        ]
    }
}
