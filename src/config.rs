//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "nursery-timers")]
#[command(about = "A persistent session timer daemon for infant care tracking")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Durable timer state file
    #[arg(long, default_value = "nursery-timers.json")]
    pub state_file: PathBuf,

    /// Append-only file receiving committed activity records
    #[arg(long, default_value = "activity-records.jsonl")]
    pub records_file: PathBuf,

    /// Tick period of running timers in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Seconds between lazy flushes of the state file
    #[arg(long, default_value = "5")]
    pub flush_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn flush_period(&self) -> Duration {
        Duration::from_secs(self.flush_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["nursery-timers"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn zero_periods_are_clamped() {
        let config =
            Config::try_parse_from(["nursery-timers", "--tick-ms", "0", "--flush-secs", "0", "-v"])
                .unwrap();
        assert_eq!(config.tick_period(), Duration::from_millis(1));
        assert_eq!(config.flush_period(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "debug");
    }
}
