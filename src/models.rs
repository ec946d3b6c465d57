use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated memory. `date` is the key: a jar holds at most one star per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStar {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub created_at: i64,
}

/// A year's worth of stars, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jar {
    pub id: String,
    pub year: i32,
    pub stars: Vec<MemoryStar>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppView {
    Home,
    Write,
    Jar,
    Recap,
    SharedStar,
}

impl AppView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Write => "write",
            Self::Jar => "jar",
            Self::Recap => "recap",
            Self::SharedStar => "shared-star",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackfillPolicy {
    /// Any date is accepted, including ones outside the jar's year.
    Permit,
    /// Only dates inside the jar's year and not after today.
    Strict,
}

impl BackfillPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permit => "permit",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub backfill_policy: BackfillPolicy,
    pub max_content_chars: usize,
    pub share_base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backfill_policy: BackfillPolicy::Permit,
            max_content_chars: 280,
            share_base_url: "https://star-jar.local/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarStats {
    pub year: i32,
    pub star_count: usize,
    pub days_to_go: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    pub month: String,
    pub stars: Vec<MemoryStar>,
}
