//! Presentation state on top of the store.
//!
//! The coordinator reads the current jar once, keeps it in memory, and swaps in
//! whatever jar the store hands back after each mutation.

use crate::errors::{AppError, AppResult};
use crate::jar;
use crate::models::{AppView, Jar, JarStats, MemoryStar, MonthGroup};
use crate::share;
use crate::store::JarStore;
use chrono::NaiveDate;

pub struct ViewCoordinator {
    store: JarStore,
    jar: Jar,
    view: AppView,
    shared_star: Option<MemoryStar>,
}

impl ViewCoordinator {
    /// Loads the current jar and picks the opening screen. A link carrying a
    /// `star` id that resolves opens the shared star; anything else opens the jar.
    pub fn start(store: JarStore, link: Option<&str>) -> AppResult<Self> {
        let jar = store.current_jar()?;
        let shared_star = match link.and_then(share::star_id_from_link) {
            Some(star_id) => {
                let found = resolve_shared_star(&store, &jar, &star_id)?;
                if found.is_none() {
                    tracing::warn!(star_id = %star_id, "shared star not found");
                }
                found
            }
            None => None,
        };
        let view = if shared_star.is_some() {
            AppView::SharedStar
        } else {
            AppView::Jar
        };

        Ok(Self {
            store,
            jar,
            view,
            shared_star,
        })
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn jar(&self) -> &Jar {
        &self.jar
    }

    pub fn shared_star(&self) -> Option<&MemoryStar> {
        self.shared_star.as_ref()
    }

    pub fn store(&self) -> &JarStore {
        &self.store
    }

    pub fn begin_write(&mut self) {
        self.set_view(AppView::Write);
    }

    pub fn cancel_write(&mut self) {
        self.set_view(AppView::Jar);
    }

    /// Validates and records a memory, then parks on `Home` while the star
    /// folds. Call [`Self::finish_folding`] to land back on the jar.
    pub fn submit_memory(&mut self, content: &str, date: Option<NaiveDate>) -> AppResult<MemoryStar> {
        let max_chars = self.store.settings()?.max_content_chars;
        let content = validate_content(content, max_chars)?;
        let date = date.unwrap_or_else(|| self.store.clock().today());

        self.jar = self.store.add_star(&self.jar, &content, Some(date))?;
        self.set_view(AppView::Home);

        self.jar
            .stars
            .iter()
            .find(|star| star.date == date)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("star for {date} missing after save")))
    }

    pub fn finish_folding(&mut self) {
        self.set_view(AppView::Jar);
    }

    /// Returns whether a star with `star_id` existed to be edited.
    pub fn edit_memory(&mut self, star_id: &str, content: &str) -> AppResult<bool> {
        let max_chars = self.store.settings()?.max_content_chars;
        let content = validate_content(content, max_chars)?;
        let exists = jar::star_by_id(&self.jar, star_id).is_some();
        self.jar = self.store.update_star_content(&self.jar, star_id, &content)?;
        Ok(exists)
    }

    pub fn view_recap(&mut self) {
        self.set_view(AppView::Recap);
    }

    pub fn back_to_jar(&mut self) {
        self.set_view(AppView::Jar);
    }

    pub fn create_own_from_shared(&mut self) {
        self.shared_star = None;
        self.set_view(AppView::Jar);
    }

    /// Re-reads the current jar, picking up a year rollover.
    pub fn refresh(&mut self) -> AppResult<()> {
        self.jar = self.store.current_jar()?;
        Ok(())
    }

    pub fn shake(&self) -> Option<MemoryStar> {
        self.store.random_star(&self.jar)
    }

    pub fn share_link(&self, star: &MemoryStar) -> AppResult<String> {
        let settings = self.store.settings()?;
        Ok(share::share_url(&settings.share_base_url, &star.id))
    }

    pub fn has_star_today(&self) -> bool {
        self.store.has_star_for_today(&self.jar)
    }

    pub fn available_past_dates(&self) -> Vec<NaiveDate> {
        self.store.available_past_dates(&self.jar)
    }

    pub fn stats(&self) -> JarStats {
        jar::stats(&self.jar)
    }

    pub fn recap(&self) -> Vec<MonthGroup> {
        jar::stars_by_month(&self.jar)
    }

    fn set_view(&mut self, next: AppView) {
        tracing::debug!(from = self.view.as_str(), to = next.as_str(), "view change");
        self.view = next;
    }
}

/// Trims a memory and enforces the input bounds: not blank, at most
/// `max_chars` characters.
pub fn validate_content(raw: &str, max_chars: usize) -> AppResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::InvalidInput("memory is empty".to_string()));
    }
    let length = content.chars().count();
    if length > max_chars {
        return Err(AppError::InvalidInput(format!(
            "memory is {length} characters; the limit is {max_chars}"
        )));
    }
    Ok(content.to_string())
}

fn resolve_shared_star(store: &JarStore, jar: &Jar, star_id: &str) -> AppResult<Option<MemoryStar>> {
    if let Some(star) = store.star_by_id(jar, star_id) {
        return Ok(Some(star));
    }
    for year in store.archived_years()? {
        if let Some(archived) = store.archived_jar(year)? {
            if let Some(star) = store.star_by_id(&archived, star_id) {
                return Ok(Some(star));
            }
        }
    }
    Ok(None)
}
