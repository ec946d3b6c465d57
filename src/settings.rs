use crate::errors::AppResult;
use crate::models::AppSettings;
use crate::storage::SlotStorage;

pub const SETTINGS_KEY: &str = "star-memories-settings";

/// Reads persisted settings. Missing or unreadable settings fall back to the
/// defaults.
pub fn load(storage: &dyn SlotStorage) -> AppResult<AppSettings> {
    let Some(raw) = storage.get(SETTINGS_KEY)? else {
        return Ok(AppSettings::default());
    };

    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(settings) => Ok(settings),
        Err(error) => {
            tracing::warn!(error = %error, "stored settings are malformed; using defaults");
            Ok(AppSettings::default())
        }
    }
}

/// Deep-merges `update` into the current settings and persists the result.
pub fn update(storage: &dyn SlotStorage, update: serde_json::Value) -> AppResult<AppSettings> {
    let current = load(storage)?;
    let mut merged = serde_json::to_value(current)?;
    merge_json(&mut merged, update);
    let settings: AppSettings = serde_json::from_value(merged)?;

    storage.set(SETTINGS_KEY, &serde_json::to_string(&settings)?)?;
    tracing::info!(
        backfill_policy = settings.backfill_policy.as_str(),
        max_content_chars = settings.max_content_chars,
        "settings updated"
    );
    Ok(settings)
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
