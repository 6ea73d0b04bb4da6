use crate::models::snapshot::DEFAULT_DAILY_GOAL;
use crate::progress::MAX_PAGES_PER_LOG;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: i64 = 2;
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub default_daily_goal: u32,
    pub session_log_enabled: bool,
    pub log_level: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_daily_goal: DEFAULT_DAILY_GOAL,
            session_log_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn get_settings(data_dir: String) -> Result<Value, String> {
    load_settings_from_disk(&data_dir)
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn save_settings(data_dir: String, settings: Value) -> Result<Value, String> {
    save_settings_to_disk(&data_dir, settings)
}

pub fn load_effective_tracker_settings(data_dir: &str) -> Result<TrackerSettings, String> {
    let settings = load_settings_from_disk(data_dir)?;
    Ok(effective_settings(&settings))
}

fn effective_settings(settings: &Value) -> TrackerSettings {
    let defaults = TrackerSettings::default();
    TrackerSettings {
        default_daily_goal: settings
            .get("defaultDailyGoal")
            .and_then(Value::as_u64)
            .map(|goal| goal.clamp(1, u64::from(MAX_PAGES_PER_LOG)) as u32)
            .unwrap_or(defaults.default_daily_goal),
        session_log_enabled: settings
            .get("sessionLogEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.session_log_enabled),
        log_level: settings
            .get("logLevel")
            .and_then(Value::as_str)
            .filter(|level| LOG_LEVELS.contains(level))
            .map(str::to_string)
            .unwrap_or(defaults.log_level),
    }
}

pub fn load_settings_from_disk(data_dir: &str) -> Result<Value, String> {
    let path = settings_path(data_dir);
    ensure_shelfmark_dir(data_dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read settings.json: {e}"))?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({}))
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        log::debug!("Rewriting {}", path.display());
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(data_dir: &str, settings: Value) -> Result<Value, String> {
    let path = settings_path(data_dir);
    ensure_shelfmark_dir(data_dir)?;

    let mut merged = load_settings_from_disk(data_dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(".shelfmark").join("settings.json")
}

fn ensure_shelfmark_dir(data_dir: &str) -> Result<(), String> {
    let dir = Path::new(data_dir).join(".shelfmark");
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create .shelfmark directory: {e}"))
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write settings.json: {e}"))
}

fn migrate_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 1 {
        rename_legacy_daily_goal(&mut out);
    }

    if version < 2 {
        // V2 introduces session logging and log level with explicit defaults.
        ensure_key(&mut out, "sessionLogEnabled", json!(true));
        ensure_key(&mut out, "logLevel", json!("info"));
    }

    deep_merge_defaults(&mut out, &default_settings());
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "defaultDailyGoal": DEFAULT_DAILY_GOAL,
        "sessionLogEnabled": true,
        "logLevel": "info"
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn ensure_key(target: &mut Value, key: &str, value: Value) {
    if let Some(obj) = target.as_object_mut() {
        obj.entry(key.to_string()).or_insert(value);
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

/// v0 files stored the goal under `dailyGoal`.
fn rename_legacy_daily_goal(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    if let Some(legacy) = obj.remove("dailyGoal") {
        obj.entry("defaultDailyGoal".to_string()).or_insert(legacy);
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(
        obj,
        "defaultDailyGoal",
        1,
        u64::from(MAX_PAGES_PER_LOG),
        u64::from(DEFAULT_DAILY_GOAL),
    );
    sanitize_enum(obj, "logLevel", LOG_LEVELS, "info");
    ensure_bool(obj, "sessionLogEnabled", true);
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}
