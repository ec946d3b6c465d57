//! The record store: owns the persisted current jar and the per-year archive.
//!
//! Every mutation is a whole-jar read-modify-write: callers hand in the jar they
//! hold, get a new jar back, and the new jar is what lands in storage. There is
//! no merge with whatever else may have written the slot in the meantime.

use crate::clock::Clock;
use crate::errors::{AppError, AppResult};
use crate::jar;
use crate::models::{AppSettings, BackfillPolicy, Jar, MemoryStar};
use crate::settings;
use crate::storage::SlotStorage;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::sync::Arc;

pub const CURRENT_JAR_KEY: &str = "star-memories-jar";
pub const ARCHIVE_KEY_PREFIX: &str = "star-memories-archive-";
pub const QUARANTINE_KEY_PREFIX: &str = "star-memories-quarantine-";

static ARCHIVE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^star-memories-archive-(-?\d{1,6})$").expect("valid archive key regex"));

pub fn archive_key(year: i32) -> String {
    format!("{ARCHIVE_KEY_PREFIX}{year}")
}

struct StoredJar {
    jar: Jar,
    raw: String,
}

#[derive(Clone)]
pub struct JarStore {
    storage: Arc<dyn SlotStorage>,
    clock: Arc<dyn Clock>,
}

impl JarStore {
    pub fn new(storage: Arc<dyn SlotStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the jar for the current calendar year, creating it on first use.
    ///
    /// A stored jar from any other year is archived under its own year before
    /// the fresh jar is written. An archive slot, once written, is never
    /// replaced.
    pub fn current_jar(&self) -> AppResult<Jar> {
        let year = self.clock.current_year();
        match self.load_current()? {
            Some(stored) if stored.jar.year == year => Ok(stored.jar),
            Some(stored) => {
                tracing::info!(from_year = stored.jar.year, to_year = year, "jar year rollover");
                self.archive(&stored)?;
                self.create_jar(year)
            }
            None => self.create_jar(year),
        }
    }

    pub fn save_jar(&self, jar: &Jar) -> AppResult<()> {
        self.storage.set(CURRENT_JAR_KEY, &serde_json::to_string(jar)?)
    }

    /// Records `content` for `date` (today when omitted), replacing any star
    /// already recorded for that date.
    pub fn add_star(&self, jar: &Jar, content: &str, date: Option<NaiveDate>) -> AppResult<Jar> {
        let today = self.clock.today();
        let date = date.unwrap_or(today);

        if self.settings()?.backfill_policy == BackfillPolicy::Strict {
            if date.year() != jar.year {
                return Err(AppError::InvalidInput(format!(
                    "{date} is outside the {} jar",
                    jar.year
                )));
            }
            if date > today {
                return Err(AppError::InvalidInput(format!("{date} is in the future")));
            }
        }

        let replacing = jar::has_star_for_date(jar, date);
        let updated = jar::with_star_for_date(jar, content, date, self.clock.now_ms());
        self.save_jar(&updated)?;
        tracing::debug!(year = updated.year, date = %date, replacing, "star recorded");
        Ok(updated)
    }

    /// Rewrites the content of one star. Unknown ids return the jar unchanged
    /// and write nothing.
    pub fn update_star_content(&self, jar: &Jar, star_id: &str, content: &str) -> AppResult<Jar> {
        if jar::star_by_id(jar, star_id).is_none() {
            tracing::debug!(star_id, "edit ignored; no such star");
            return Ok(jar.clone());
        }

        let updated = jar::with_star_content(jar, star_id, content);
        self.save_jar(&updated)?;
        tracing::debug!(star_id, "star content updated");
        Ok(updated)
    }

    pub fn has_star_for_date(&self, jar: &Jar, date: NaiveDate) -> bool {
        jar::has_star_for_date(jar, date)
    }

    pub fn has_star_for_today(&self, jar: &Jar) -> bool {
        jar::has_star_for_date(jar, self.clock.today())
    }

    pub fn available_past_dates(&self, jar: &Jar) -> Vec<NaiveDate> {
        jar::available_past_dates(jar, self.clock.today())
    }

    pub fn star_by_id(&self, jar: &Jar, star_id: &str) -> Option<MemoryStar> {
        jar::star_by_id(jar, star_id).cloned()
    }

    pub fn random_star(&self, jar: &Jar) -> Option<MemoryStar> {
        self.random_star_with(jar, &mut rand::rng())
    }

    pub fn random_star_with<R: Rng>(&self, jar: &Jar, rng: &mut R) -> Option<MemoryStar> {
        jar::random_star(jar, rng).cloned()
    }

    /// Years with an archived jar, newest first.
    pub fn archived_years(&self) -> AppResult<Vec<i32>> {
        let keys = self.storage.keys()?;
        let mut years: Vec<i32> = keys
            .iter()
            .filter_map(|key| ARCHIVE_KEY_RE.captures(key))
            .filter_map(|caps| caps[1].parse().ok())
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }

    pub fn archived_jar(&self, year: i32) -> AppResult<Option<Jar>> {
        let Some(raw) = self.storage.get(&archive_key(year))? else {
            return Ok(None);
        };
        match serde_json::from_str::<Jar>(&raw) {
            Ok(jar) => Ok(Some(jar)),
            Err(error) => {
                tracing::warn!(year, error = %error, "archived jar is malformed");
                Ok(None)
            }
        }
    }

    pub fn settings(&self) -> AppResult<AppSettings> {
        settings::load(self.storage.as_ref())
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        settings::update(self.storage.as_ref(), update)
    }

    fn load_current(&self) -> AppResult<Option<StoredJar>> {
        let Some(raw) = self.storage.get(CURRENT_JAR_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Jar>(&raw) {
            Ok(jar) => Ok(Some(StoredJar { jar, raw })),
            Err(error) => {
                let key = self.quarantine(&raw)?;
                tracing::warn!(error = %error, quarantine_key = %key, "current jar is malformed; starting a fresh jar");
                Ok(None)
            }
        }
    }

    fn archive(&self, stored: &StoredJar) -> AppResult<()> {
        let key = archive_key(stored.jar.year);
        if self.storage.contains(&key)? {
            let quarantine_key = self.quarantine(&stored.raw)?;
            tracing::warn!(
                year = stored.jar.year,
                jar_id = %stored.jar.id,
                quarantine_key = %quarantine_key,
                "archive slot already written; outgoing jar quarantined"
            );
            return Ok(());
        }

        self.storage.set(&key, &stored.raw)?;
        tracing::info!(
            year = stored.jar.year,
            jar_id = %stored.jar.id,
            star_count = stored.jar.stars.len(),
            "jar archived"
        );
        Ok(())
    }

    fn quarantine(&self, raw: &str) -> AppResult<String> {
        let key = format!("{QUARANTINE_KEY_PREFIX}{}", self.clock.now_ms());
        self.storage.set(&key, raw)?;
        Ok(key)
    }

    fn create_jar(&self, year: i32) -> AppResult<Jar> {
        let jar = jar::new_jar(year, self.clock.now_ms());
        self.save_jar(&jar)?;
        tracing::info!(year, jar_id = %jar.id, "created jar");
        Ok(jar)
    }
}
