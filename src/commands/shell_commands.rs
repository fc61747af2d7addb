use tauri::State;

use crate::services::config::{ConfigPatch, ConfigStore, JsonConfigStore, ModeConfig};
use crate::services::media_bridge::MediaStateCache;
use crate::stealth::{ShellEvent, ShellHandle, ShellStatus};

#[tauri::command]
pub fn middle_button_pressed(shell: State<'_, ShellHandle>) -> Result<(), String> {
    shell.send(ShellEvent::MiddleButtonPressed)
}

#[tauri::command]
pub fn middle_button_released(shell: State<'_, ShellHandle>) -> Result<(), String> {
    shell.send(ShellEvent::MiddleButtonReleased)
}

#[tauri::command]
pub fn window_close(shell: State<'_, ShellHandle>) -> Result<(), String> {
    shell.send(ShellEvent::CloseRequested)
}

#[tauri::command]
pub fn window_minimize(shell: State<'_, ShellHandle>) -> Result<(), String> {
    shell.send(ShellEvent::MinimizeRequested)
}

#[tauri::command]
pub fn get_pin_state(shell: State<'_, ShellHandle>) -> bool {
    shell.pin_state()
}

/// Persists `isWindowPinned` before telling the controller, so a crash in between keeps the
/// user's choice.
#[tauri::command]
pub fn set_pin_state(
    shell: State<'_, ShellHandle>,
    store: State<'_, JsonConfigStore>,
    pinned: bool,
) -> Result<bool, String> {
    store.update(&ConfigPatch::pinned(pinned))?;
    shell.send(ShellEvent::SetPinned(pinned))?;
    Ok(pinned)
}

#[tauri::command]
pub fn reload_unlock_config(
    app: tauri::AppHandle,
    shell: State<'_, ShellHandle>,
    store: State<'_, JsonConfigStore>,
) -> Result<ModeConfig, String> {
    let config = store.load();
    crate::sync_shortcut(&app, &config);
    shell.send(ShellEvent::ConfigReloaded(config.clone()))?;
    Ok(config)
}

/// `playing: null` means the loaded content has no player at all.
#[tauri::command]
pub fn report_media_state(media: State<'_, MediaStateCache>, playing: Option<bool>) {
    media.report(playing);
}

#[tauri::command]
pub fn content_fullscreen_changed(
    shell: State<'_, ShellHandle>,
    fullscreen: bool,
) -> Result<(), String> {
    shell.send(ShellEvent::ContentFullscreenChanged(fullscreen))
}

#[tauri::command]
pub fn request_content_fullscreen(shell: State<'_, ShellHandle>) -> Result<(), String> {
    shell.send(ShellEvent::RequestFullscreen)
}

#[tauri::command]
pub fn get_shell_status(shell: State<'_, ShellHandle>) -> ShellStatus {
    shell.status().as_ref().clone()
}
