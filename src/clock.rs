//! Source of the current local time.

use chrono::{DateTime, Local};

/// Provides "now" to the schedulers, so tests can substitute a fake clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that starts at a fixed local time and advances with tokio's
/// (possibly paused) timer.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct PausedClock {
    base: DateTime<Local>,
    started: tokio::time::Instant,
}

#[cfg(test)]
impl PausedClock {
    pub(crate) fn at(base: DateTime<Local>) -> Self {
        Self {
            base,
            started: tokio::time::Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for PausedClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = chrono::TimeDelta::from_std(self.started.elapsed()).unwrap_or_default();
        self.base + elapsed
    }
}
