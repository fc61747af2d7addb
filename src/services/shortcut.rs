//! Global keyboard shortcut strings (`CommandOrControl+Shift+D`).

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SHORTCUT: &str = "CommandOrControl+Shift+D";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    CommandOrControl,
    Control,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "commandorcontrol" | "cmdorctrl" | "cmdorcontrol" | "commandorctrl" => {
                Some(Modifier::CommandOrControl)
            }
            "ctrl" | "control" => Some(Modifier::Control),
            "alt" | "option" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "super" | "win" | "meta" | "cmd" | "command" => Some(Modifier::Super),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Modifier::CommandOrControl => "CommandOrControl",
            Modifier::Control => "Control",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Super => "Super",
        }
    }
}

const NAMED_KEYS: &[&str] = &[
    "Space",
    "Tab",
    "Enter",
    "Escape",
    "Backspace",
    "Delete",
    "Insert",
    "Home",
    "End",
    "PageUp",
    "PageDown",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
];

fn normalize_key(token: &str) -> Option<String> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c
            .is_ascii_alphanumeric()
            .then(|| c.to_ascii_uppercase().to_string());
    }

    let lower = token.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n).then(|| format!("F{n}"));
    }

    let alias = match lower.as_str() {
        "esc" => "escape",
        "return" => "enter",
        "up" => "arrowup",
        "down" => "arrowdown",
        "left" => "arrowleft",
        "right" => "arrowright",
        "del" => "delete",
        other => other,
    };
    NAMED_KEYS
        .iter()
        .find(|name| name.eq_ignore_ascii_case(alias))
        .map(|name| name.to_string())
}

/// A modifier set plus exactly one key. At least one modifier is required so a bare key press
/// can never toggle the window by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    modifiers: SmallVec<[Modifier; 4]>,
    key: String,
}

impl KeyCombo {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut modifiers = SmallVec::<[Modifier; 4]>::new();
        let mut key: Option<String> = None;

        for token in raw.split('+').map(str::trim) {
            if token.is_empty() {
                return Err(format!("Invalid shortcut '{raw}': empty segment"));
            }
            if let Some(modifier) = Modifier::parse(token) {
                if !modifiers.contains(&modifier) {
                    modifiers.push(modifier);
                }
                continue;
            }
            let normalized =
                normalize_key(token).ok_or_else(|| format!("Invalid shortcut key '{token}'"))?;
            if key.replace(normalized).is_some() {
                return Err(format!("Invalid shortcut '{raw}': more than one key"));
            }
        }

        let key = key.ok_or_else(|| format!("Invalid shortcut '{raw}': missing key"))?;
        if modifiers.is_empty() {
            return Err(format!("Invalid shortcut '{raw}': needs a modifier"));
        }
        modifiers.sort();

        Ok(Self { modifiers, key })
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for KeyCombo {
    fn default() -> Self {
        Self {
            modifiers: SmallVec::from_slice(&[Modifier::CommandOrControl, Modifier::Shift]),
            key: "D".to_string(),
        }
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        write!(f, "{}", self.key)
    }
}

/// Swap the registered global shortcut for the one in `combo`, or clear it when keyboard mode is
/// off.
#[cfg(feature = "desktop")]
pub fn sync_global_shortcut(app: &tauri::AppHandle, combo: Option<&KeyCombo>) -> Result<(), String> {
    use tauri_plugin_global_shortcut::GlobalShortcutExt;

    let shortcuts = app.global_shortcut();
    shortcuts.unregister_all().map_err(|e| e.to_string())?;

    let Some(combo) = combo else {
        log::info!("Global shortcut cleared");
        return Ok(());
    };
    let accelerator = combo.to_string();
    shortcuts
        .register(accelerator.as_str())
        .map_err(|e| format!("Failed to register shortcut {accelerator}: {e}"))?;
    log::info!("Global shortcut registered: {}", accelerator);
    Ok(())
}
