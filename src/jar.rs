//! Pure jar transformations.
//!
//! Nothing here touches storage or reads the wall clock: callers pass `today`
//! and `now_ms` in and persist whatever comes back. Inputs are never mutated.

use crate::models::{Jar, JarStats, MemoryStar, MonthGroup};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

pub fn new_jar(year: i32, now_ms: i64) -> Jar {
    Jar {
        id: Uuid::new_v4().to_string(),
        year,
        stars: Vec::new(),
        created_at: now_ms,
    }
}

pub fn new_star(date: NaiveDate, content: &str, now_ms: i64) -> MemoryStar {
    MemoryStar {
        id: Uuid::new_v4().to_string(),
        date,
        content: content.to_string(),
        created_at: now_ms,
    }
}

/// Returns a jar holding exactly one star for `date`, carrying `content`.
///
/// An existing star for that date is swapped for a freshly minted one at the
/// same position; otherwise the new star is appended.
pub fn with_star_for_date(jar: &Jar, content: &str, date: NaiveDate, now_ms: i64) -> Jar {
    let star = new_star(date, content, now_ms);
    let mut stars = jar.stars.clone();
    match stars.iter().position(|existing| existing.date == date) {
        Some(index) => stars[index] = star,
        None => stars.push(star),
    }
    Jar {
        stars,
        ..jar.clone()
    }
}

/// Replaces the content of the star with `star_id`. Unknown ids yield an
/// identical jar.
pub fn with_star_content(jar: &Jar, star_id: &str, content: &str) -> Jar {
    let stars = jar
        .stars
        .iter()
        .map(|star| {
            if star.id == star_id {
                MemoryStar {
                    content: content.to_string(),
                    ..star.clone()
                }
            } else {
                star.clone()
            }
        })
        .collect();
    Jar {
        stars,
        ..jar.clone()
    }
}

pub fn has_star_for_date(jar: &Jar, date: NaiveDate) -> bool {
    jar.stars.iter().any(|star| star.date == date)
}

pub fn star_by_id<'a>(jar: &'a Jar, star_id: &str) -> Option<&'a MemoryStar> {
    jar.stars.iter().find(|star| star.id == star_id)
}

/// Dates from Jan 1 of the jar's year through `today` (capped at Dec 31 of
/// that year) that have no star yet, ascending.
pub fn available_past_dates(jar: &Jar, today: NaiveDate) -> Vec<NaiveDate> {
    let (Some(start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(jar.year, 1, 1),
        NaiveDate::from_ymd_opt(jar.year, 12, 31),
    ) else {
        return Vec::new();
    };
    let end = today.min(year_end);
    let taken: HashSet<NaiveDate> = jar.stars.iter().map(|star| star.date).collect();

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !taken.contains(date))
        .collect()
}

pub fn random_star<'a, R: Rng>(jar: &'a Jar, rng: &mut R) -> Option<&'a MemoryStar> {
    if jar.stars.is_empty() {
        return None;
    }
    let index = rng.random_range(0..jar.stars.len());
    jar.stars.get(index)
}

/// Stars ordered by date. Insertion order breaks ties.
pub fn stars_by_date(jar: &Jar) -> Vec<MemoryStar> {
    let mut stars = jar.stars.clone();
    stars.sort_by_key(|star| star.date);
    stars
}

/// One group per calendar month, January first. Stars dated outside the
/// jar's year join the group for their month.
pub fn stars_by_month(jar: &Jar) -> Vec<MonthGroup> {
    let mut by_month: BTreeMap<u32, Vec<MemoryStar>> = BTreeMap::new();
    for star in stars_by_date(jar) {
        by_month.entry(star.date.month()).or_default().push(star);
    }
    by_month
        .into_values()
        .filter_map(|stars| {
            let month = stars.first()?.date.format("%B").to_string();
            Some(MonthGroup { month, stars })
        })
        .collect()
}

pub fn stats(jar: &Jar) -> JarStats {
    JarStats {
        year: jar.year,
        star_count: jar.stars.len(),
        days_to_go: 365usize.saturating_sub(jar.stars.len()),
    }
}

/// Long display form, e.g. `Friday, March 1, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn empty_jar(year: i32) -> Jar {
        new_jar(year, 1_700_000_000_000)
    }

    #[test]
    fn adding_twice_for_same_date_replaces_the_star() {
        let jar = empty_jar(2024);
        let first = with_star_for_date(&jar, "Sunny walk", date(2024, 3, 1), 10);
        assert_eq!(first.stars.len(), 1);
        assert_eq!(first.stars[0].content, "Sunny walk");
        assert_eq!(first.stars[0].date, date(2024, 3, 1));

        let second = with_star_for_date(&first, "Rainy walk", date(2024, 3, 1), 20);
        assert_eq!(second.stars.len(), 1);
        assert_eq!(second.stars[0].content, "Rainy walk");
        assert_ne!(second.stars[0].id, first.stars[0].id);
        assert_eq!(second.stars[0].created_at, 20);

        assert!(jar.stars.is_empty());
        assert_eq!(first.stars[0].content, "Sunny walk");
    }

    #[test]
    fn replacement_keeps_position_and_other_stars() {
        let mut jar = empty_jar(2024);
        for (day, content) in [(5, "a"), (2, "b"), (9, "c")] {
            jar = with_star_for_date(&jar, content, date(2024, 1, day), i64::from(day));
        }
        let replaced = with_star_for_date(&jar, "b2", date(2024, 1, 2), 99);

        let contents: Vec<&str> = replaced.stars.iter().map(|star| star.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b2", "c"]);
        assert_eq!(replaced.id, jar.id);
        assert_eq!(replaced.created_at, jar.created_at);
    }

    #[test]
    fn any_sequence_of_adds_keeps_one_star_per_date() {
        let mut jar = empty_jar(2024);
        let days = [1, 3, 1, 7, 3, 3, 12, 1];
        for (step, day) in days.iter().enumerate() {
            jar = with_star_for_date(&jar, &format!("step {step}"), date(2024, 2, *day), step as i64);
        }

        let mut per_date: HashMap<NaiveDate, usize> = HashMap::new();
        for star in &jar.stars {
            *per_date.entry(star.date).or_default() += 1;
        }
        assert_eq!(per_date.len(), 4);
        assert!(per_date.values().all(|count| *count == 1));

        let latest_for_first = jar
            .stars
            .iter()
            .find(|star| star.date == date(2024, 2, 1))
            .expect("star for feb 1");
        assert_eq!(latest_for_first.content, "step 7");
    }

    #[test]
    fn editing_changes_only_content_of_matching_star() {
        let jar = with_star_for_date(&empty_jar(2024), "first", date(2024, 4, 1), 1);
        let jar = with_star_for_date(&jar, "second", date(2024, 4, 2), 2);
        let target = jar.stars[0].clone();

        let edited = with_star_content(&jar, &target.id, "rewritten");
        assert_eq!(edited.stars[0].id, target.id);
        assert_eq!(edited.stars[0].date, target.date);
        assert_eq!(edited.stars[0].created_at, target.created_at);
        assert_eq!(edited.stars[0].content, "rewritten");
        assert_eq!(edited.stars[1], jar.stars[1]);
    }

    #[test]
    fn editing_unknown_id_returns_equal_jar() {
        let jar = with_star_for_date(&empty_jar(2024), "only", date(2024, 4, 1), 1);
        let edited = with_star_content(&jar, "missing-id", "ignored");
        assert_eq!(edited, jar);
    }

    #[test]
    fn star_lookups() {
        let jar = with_star_for_date(&empty_jar(2024), "hello", date(2024, 6, 15), 1);
        let id = jar.stars[0].id.clone();

        assert!(has_star_for_date(&jar, date(2024, 6, 15)));
        assert!(!has_star_for_date(&jar, date(2024, 6, 16)));
        assert_eq!(star_by_id(&jar, &id).map(|star| star.content.as_str()), Some("hello"));
        assert!(star_by_id(&jar, "nope").is_none());
    }

    #[test]
    fn past_dates_cover_every_day_through_today() {
        let jar = empty_jar(2024);
        let today = date(2024, 3, 10);
        let dates = available_past_dates(&jar, today);

        // 2024 is a leap year: 31 + 29 + 10
        assert_eq!(dates.len(), 70);
        assert_eq!(dates.first(), Some(&date(2024, 1, 1)));
        assert_eq!(dates.last(), Some(&today));
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(dates.contains(&date(2024, 2, 29)));
    }

    #[test]
    fn past_dates_skip_recorded_days() {
        let jar = with_star_for_date(&empty_jar(2024), "x", date(2024, 1, 2), 1);
        let jar = with_star_for_date(&jar, "y", date(2024, 1, 4), 2);
        let dates = available_past_dates(&jar, date(2024, 1, 5));
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)]);
    }

    #[test]
    fn past_dates_are_bounded_by_the_jar_year() {
        let jar = empty_jar(2023);
        assert_eq!(available_past_dates(&jar, date(2024, 2, 1)).len(), 365);
        assert!(available_past_dates(&jar, date(2022, 12, 31)).is_empty());
    }

    #[test]
    fn random_star_is_none_for_empty_jar() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(random_star(&empty_jar(2024), &mut rng).is_none());
    }

    #[test]
    fn random_star_picks_each_star_about_equally() {
        let mut jar = empty_jar(2024);
        for day in 1..=4 {
            jar = with_star_for_date(&jar, &format!("day {day}"), date(2024, 5, day), i64::from(day));
        }

        let mut rng = StdRng::seed_from_u64(42);
        let trials = 40_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let star = random_star(&jar, &mut rng).expect("non-empty jar");
            *counts.entry(star.id.clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        for count in counts.values() {
            let frequency = *count as f64 / trials as f64;
            assert!((frequency - 0.25).abs() < 0.02, "frequency {frequency}");
        }
    }

    #[test]
    fn recap_orders_and_groups_by_month() {
        let mut jar = empty_jar(2024);
        for (month, day, content) in [(3, 4, "c"), (1, 20, "b"), (1, 2, "a"), (3, 1, "d")] {
            jar = with_star_for_date(&jar, content, date(2024, month, day), 1);
        }

        let sorted = stars_by_date(&jar);
        let contents: Vec<&str> = sorted.iter().map(|star| star.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "d", "c"]);

        let groups = stars_by_month(&jar);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].month, "January");
        assert_eq!(groups[0].stars.len(), 2);
        assert_eq!(groups[1].month, "March");
        assert_eq!(groups[1].stars[0].content, "d");
    }

    #[test]
    fn recap_keeps_one_group_per_month_across_years() {
        let mut jar = empty_jar(2024);
        for (year, month, day, content) in [(2023, 12, 31, "eve"), (2024, 1, 5, "jan"), (2024, 12, 1, "dec")] {
            jar = with_star_for_date(&jar, content, date(year, month, day), 1);
        }

        let groups = stars_by_month(&jar);
        let months: Vec<&str> = groups.iter().map(|group| group.month.as_str()).collect();
        assert_eq!(months, vec!["January", "December"]);
        let december: Vec<&str> = groups[1].stars.iter().map(|star| star.content.as_str()).collect();
        assert_eq!(december, vec!["eve", "dec"]);
    }

    #[test]
    fn stats_and_formatting() {
        let jar = with_star_for_date(&empty_jar(2024), "x", date(2024, 3, 1), 1);
        let summary = stats(&jar);
        assert_eq!(summary.star_count, 1);
        assert_eq!(summary.days_to_go, 364);
        assert_eq!(format_date(date(2024, 3, 1)), "Friday, March 1, 2024");
    }
}
