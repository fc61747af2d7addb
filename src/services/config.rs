//! Unlock/visibility configuration and its JSON-backed store.
//!
//! Every key is read on its own: a missing or malformed value only falls back to that key's
//! default, never to a wholesale reset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::shortcut::{DEFAULT_SHORTCUT, KeyCombo};
use crate::stealth::visibility::{MAX_HIDE_DELAY_MS, MIN_HIDE_DELAY_MS};

pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HOLD_DURATION_MS: u64 = 1_000;
pub const DEFAULT_MULTI_ENTER_WINDOW_MS: u64 = 3_000;
pub const DEFAULT_MULTI_ENTER_THRESHOLD: u32 = 5;
pub const DEFAULT_HIDE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_STARTUP_DISPLAY_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    pub hold_duration_ms: u64,
    pub multi_enter_window_ms: u64,
    pub multi_enter_threshold: u32,
    pub hide_delay_ms: u64,
    pub keyboard_mode_enabled: bool,
    pub keyboard_shortcut: String,
    pub auto_pause_on_hide: bool,
    pub is_window_pinned: bool,
    pub show_window_on_startup: bool,
    pub startup_display_ms: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            multi_enter_window_ms: DEFAULT_MULTI_ENTER_WINDOW_MS,
            multi_enter_threshold: DEFAULT_MULTI_ENTER_THRESHOLD,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            keyboard_mode_enabled: false,
            keyboard_shortcut: DEFAULT_SHORTCUT.to_string(),
            auto_pause_on_hide: true,
            is_window_pinned: false,
            show_window_on_startup: true,
            startup_display_ms: DEFAULT_STARTUP_DISPLAY_MS,
        }
    }
}

fn read_u64(map: &Map<String, Value>, keys: &[&str], default: u64, min: u64, max: u64) -> u64 {
    for key in keys {
        let Some(value) = map.get(*key) else { continue };
        match value.as_u64() {
            Some(v) => return v.clamp(min, max),
            None => {
                log::warn!("Config key '{}' is not a non-negative integer: {}", key, value);
                return default;
            }
        }
    }
    default
}

fn read_bool(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    match map.get(key) {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            log::warn!("Config key '{}' is not a boolean: {}", key, other);
            default
        }
    }
}

fn read_shortcut(map: &Map<String, Value>, key: &str) -> String {
    let Some(value) = map.get(key) else {
        return DEFAULT_SHORTCUT.to_string();
    };
    match value.as_str().map(KeyCombo::parse) {
        Some(Ok(combo)) => combo.to_string(),
        Some(Err(err)) => {
            log::warn!("Config key '{}' rejected: {}", key, err);
            DEFAULT_SHORTCUT.to_string()
        }
        None => {
            log::warn!("Config key '{}' is not a string: {}", key, value);
            DEFAULT_SHORTCUT.to_string()
        }
    }
}

impl ModeConfig {
    /// Parse a config object key by key. Non-objects yield the defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                log::warn!("Config root is not an object, using defaults");
            }
            return Self::default();
        };

        Self {
            hold_duration_ms: read_u64(
                map,
                &["holdDurationMs", "middleButtonHoldTime"],
                DEFAULT_HOLD_DURATION_MS,
                200,
                10_000,
            ),
            multi_enter_window_ms: read_u64(
                map,
                &["multiEnterWindowMs"],
                DEFAULT_MULTI_ENTER_WINDOW_MS,
                500,
                30_000,
            ),
            multi_enter_threshold: read_u64(
                map,
                &["multiEnterThreshold"],
                DEFAULT_MULTI_ENTER_THRESHOLD as u64,
                1,
                20,
            ) as u32,
            hide_delay_ms: read_u64(
                map,
                &["hideDelayMs"],
                DEFAULT_HIDE_DELAY_MS,
                MIN_HIDE_DELAY_MS,
                MAX_HIDE_DELAY_MS,
            ),
            keyboard_mode_enabled: read_bool(map, "keyboardModeEnabled", false),
            keyboard_shortcut: read_shortcut(map, "keyboardShortcut"),
            auto_pause_on_hide: read_bool(map, "autoPauseOnHide", true),
            is_window_pinned: read_bool(map, "isWindowPinned", false),
            show_window_on_startup: read_bool(map, "showWindowOnStartup", true),
            startup_display_ms: read_u64(
                map,
                &["startupDisplayMs", "startupDisplayDuration"],
                DEFAULT_STARTUP_DISPLAY_MS,
                0,
                30_000,
            ),
        }
    }

    pub fn key_combo(&self) -> KeyCombo {
        KeyCombo::parse(&self.keyboard_shortcut).unwrap_or_default()
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_enter_window_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_enter_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_mode_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_shortcut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_pause_on_hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_window_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_window_on_startup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_display_ms: Option<u64>,
}

impl ConfigPatch {
    pub fn pinned(pinned: bool) -> Self {
        Self {
            is_window_pinned: Some(pinned),
            ..Self::default()
        }
    }
}

pub trait ConfigStore: Send + Sync {
    fn load(&self) -> ModeConfig;
    fn update(&self, patch: &ConfigPatch) -> Result<ModeConfig, String>;
}

/// `config.json` under the app data directory. Unknown keys written by other parts of the app
/// are preserved on update.
pub struct JsonConfigStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lock only serializes file access, so a panic while holding it leaves nothing to repair.
    fn io_guard(&self) -> MutexGuard<'_, ()> {
        self.io_lock.lock().unwrap_or_else(|poisoned| {
            log::warn!("Config store lock was poisoned; continuing");
            poisoned.into_inner()
        })
    }

    fn read_raw(&self) -> Value {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Config read failed ({}): {}", self.path.display(), err);
                }
                return Value::Null;
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            log::warn!("Config parse failed ({}): {}", self.path.display(), err);
            Value::Null
        })
    }

    fn write_raw(&self, value: &Value) -> Result<(), String> {
        let serialized = serde_json::to_string_pretty(value)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).map_err(|e| format!("Failed to write config: {e}"))?;
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| format!("Failed to replace config: {e}"))
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> ModeConfig {
        let _guard = self.io_guard();
        ModeConfig::from_value(&self.read_raw())
    }

    fn update(&self, patch: &ConfigPatch) -> Result<ModeConfig, String> {
        let _guard = self.io_guard();

        let mut root = match self.read_raw() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let Value::Object(changes) =
            serde_json::to_value(patch).map_err(|e| format!("Invalid config patch: {e}"))?
        else {
            return Err("Invalid config patch".to_string());
        };
        root.extend(changes);

        let root = Value::Object(root);
        self.write_raw(&root)?;
        log::info!("Config saved to {}", self.path.display());
        Ok(ModeConfig::from_value(&root))
    }
}
