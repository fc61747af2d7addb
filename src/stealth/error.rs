use serde::{Deserialize, Serialize};

/// Failure of a native window call. Always recovered locally by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostError {
    WindowGone { message: String },
    Native { message: String },
}

impl HostError {
    pub fn window_gone(message: impl Into<String>) -> Self {
        Self::WindowGone {
            message: message.into(),
        }
    }

    pub fn native(message: impl Into<String>) -> Self {
        Self::Native {
            message: message.into(),
        }
    }

    pub fn is_window_gone(&self) -> bool {
        matches!(self, Self::WindowGone { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::WindowGone { message } | Self::Native { message } => message,
        }
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowGone { message } => write!(f, "WindowGone: {}", message),
            Self::Native { message } => write!(f, "Native: {}", message),
        }
    }
}

impl std::error::Error for HostError {}

/// Structured failure reported by the embedded content host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MediaError {
    Unavailable { message: String },
    ScriptFailed { message: String },
    ModuleNotFound { message: String },
}

impl MediaError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn script_failed(message: impl Into<String>) -> Self {
        Self::ScriptFailed {
            message: message.into(),
        }
    }

    pub fn module_not_found(message: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable { message }
            | Self::ScriptFailed { message }
            | Self::ModuleNotFound { message } => message,
        }
    }
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { message } => write!(f, "Unavailable: {}", message),
            Self::ScriptFailed { message } => write!(f, "ScriptFailed: {}", message),
            Self::ModuleNotFound { message } => write!(f, "ModuleNotFound: {}", message),
        }
    }
}

impl std::error::Error for MediaError {}
