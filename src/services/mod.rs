pub mod config;
pub mod shortcut;

#[cfg(feature = "desktop")]
pub mod cursor;
#[cfg(feature = "desktop")]
pub mod media_bridge;
