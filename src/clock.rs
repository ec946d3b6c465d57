//! Time source for the store.
//!
//! Every "what day is it" question goes through [`Clock`] so rollovers can be
//! driven deterministically with [`FixedClock`].

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// The user's current calendar date.
    fn today(&self) -> NaiveDate;

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a settable date. `now_ms` starts at midnight UTC of that
/// date and ticks by one millisecond per call, so successive records never
/// share a timestamp.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
    ticks: AtomicI64,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
            ticks: AtomicI64::new(0),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        let mut current = self.today.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = today;
        self.ticks.store(0, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        let midnight = self.today().and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        midnight + self.ticks.fetch_add(1, Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
