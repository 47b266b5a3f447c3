use std::sync::Mutex;

use chrono::{DateTime, Duration, Months, Utc};

/// Source of "now" for cooldown decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and the CLI demo.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().expect("clock mutex poisoned") = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("clock mutex poisoned")
    }
}

/// Calendar-month addition; day-of-month overflow clamps to the last day of the target month.
pub fn add_one_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .checked_add_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
