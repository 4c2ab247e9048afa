//! Time source for due-date calculations

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn epoch_seconds(&self) -> i64;
}

/// A clock that never moves. Used for deterministic tests and demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrozenClock(pub i64);

impl Default for FrozenClock {
    fn default() -> Self {
        FrozenClock(1)
    }
}

impl Clock for FrozenClock {
    fn epoch_seconds(&self) -> i64 {
        self.0
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Which clock the server should run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Frozen,
    System,
}

impl ClockMode {
    /// Build the clock for this mode. `frozen_at` is only used by `Frozen`.
    pub fn build(self, frozen_at: i64) -> Arc<dyn Clock> {
        match self {
            ClockMode::Frozen => Arc::new(FrozenClock(frozen_at)),
            ClockMode::System => Arc::new(SystemClock),
        }
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockMode::Frozen => write!(f, "frozen"),
            ClockMode::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for ClockMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "frozen" | "fixed" => Ok(ClockMode::Frozen),
            "system" | "wall" => Ok(ClockMode::System),
            _ => anyhow::bail!("Invalid clock mode: {}. Expected: frozen or system", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_clock_defaults_to_one() {
        assert_eq!(FrozenClock::default().epoch_seconds(), 1);
        assert_eq!(FrozenClock(42).epoch_seconds(), 42);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.epoch_seconds() > 1_577_836_800);
    }

    #[test]
    fn test_clock_mode_build() {
        assert_eq!(ClockMode::Frozen.build(7).epoch_seconds(), 7);
        assert_eq!("system".parse::<ClockMode>().unwrap(), ClockMode::System);
        assert!("lunar".parse::<ClockMode>().is_err());
    }
}
