pub mod services;
pub mod stealth;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod windows;

/// `ShellStatus` after every controller step that changed it.
pub const EVT_SHELL_STATUS: &str = "shell-status";

#[cfg(feature = "desktop")]
use tauri::{Emitter, Manager};

#[cfg(feature = "desktop")]
use crate::services::config::{ConfigStore, JsonConfigStore, ModeConfig};
#[cfg(feature = "desktop")]
use crate::stealth::{ShellEvent, ShellHandle};

/// Register the toggle shortcut only while keyboard mode owns visibility.
#[cfg(feature = "desktop")]
pub(crate) fn sync_shortcut(app: &tauri::AppHandle, config: &ModeConfig) {
    let combo = config
        .keyboard_mode_enabled
        .then(|| config.key_combo());
    if let Err(err) = services::shortcut::sync_global_shortcut(app, combo.as_ref()) {
        log::warn!("{}", err);
    }
}

#[cfg(feature = "desktop")]
fn setup_shell(app: &tauri::AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    use crate::services::cursor::DesktopCursor;
    use crate::services::media_bridge::{MediaStateCache, WebviewMedia};
    use crate::stealth::{ShellDriver, ShellPorts, StealthController};
    use crate::windows::capture_window::TauriCaptureSurface;
    use crate::windows::overlay_window::TauriOverlayWindow;

    let store = JsonConfigStore::in_dir(&app.path().app_data_dir()?);
    let config = store.load();
    log::info!(
        "Unlock config loaded from {} (keyboard_mode={}, pinned={})",
        store.path().display(),
        config.keyboard_mode_enabled,
        config.is_window_pinned
    );
    sync_shortcut(app, &config);

    let media_state = app.state::<MediaStateCache>().inner().clone();
    let ports = ShellPorts::new(
        TauriOverlayWindow::new(app.clone()),
        TauriCaptureSurface::new(app.clone()),
        WebviewMedia::new(app.clone(), media_state),
        DesktopCursor::new(app.clone()),
    );

    let emitter = app.clone();
    let (driver, handle) = ShellDriver::new(StealthController::new(ports, config));
    let driver = driver.on_status(move |status| {
        let _ = emitter.emit(EVT_SHELL_STATUS, status);
    });

    app.manage(handle);
    app.manage(store);

    tauri::async_runtime::spawn(async move {
        driver.run().await;
    });
    Ok(())
}

#[cfg(feature = "desktop")]
fn on_window_event(window: &tauri::Window, event: &tauri::WindowEvent) {
    use crate::windows::overlay_window::window_bounds;
    use crate::windows::{CAPTURE_WINDOW_LABEL, MAIN_WINDOW_LABEL};
    use tauri::WindowEvent;

    let Some(shell) = window.try_state::<ShellHandle>() else {
        return;
    };

    let shell_event = match (window.label(), event) {
        (MAIN_WINDOW_LABEL, WindowEvent::Moved(_) | WindowEvent::Resized(_)) => {
            if window.is_minimized().unwrap_or(false) {
                return;
            }
            window_bounds(window).map(ShellEvent::BoundsChanged)
        }
        (MAIN_WINDOW_LABEL, WindowEvent::Destroyed) => Some(ShellEvent::WindowDestroyed),
        (CAPTURE_WINDOW_LABEL, WindowEvent::Destroyed) => {
            Some(ShellEvent::CaptureSurfaceDestroyed)
        }
        _ => None,
    };

    if let Some(shell_event) = shell_event {
        let _ = shell.send(shell_event);
    }
}

#[cfg(feature = "desktop")]
pub fn run() {
    use tauri_plugin_global_shortcut::ShortcutState;
    use tauri_plugin_log::{Target, TargetKind};

    let log_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let app = tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log_level)
                .targets([
                    Target::new(TargetKind::Stdout),
                    Target::new(TargetKind::LogDir { file_name: None }),
                ])
                .build(),
        )
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state() != ShortcutState::Pressed {
                        return;
                    }
                    if let Some(shell) = app.try_state::<ShellHandle>() {
                        let _ = shell.send(ShellEvent::ShortcutPressed);
                    }
                })
                .build(),
        )
        .manage(services::media_bridge::MediaStateCache::default())
        .invoke_handler(tauri::generate_handler![
            commands::shell_commands::middle_button_pressed,
            commands::shell_commands::middle_button_released,
            commands::shell_commands::window_close,
            commands::shell_commands::window_minimize,
            commands::shell_commands::get_pin_state,
            commands::shell_commands::set_pin_state,
            commands::shell_commands::reload_unlock_config,
            commands::shell_commands::report_media_state,
            commands::shell_commands::content_fullscreen_changed,
            commands::shell_commands::request_content_fullscreen,
            commands::shell_commands::get_shell_status,
        ])
        .setup(|app| {
            setup_shell(app.handle())?;
            Ok(())
        })
        .on_window_event(on_window_event)
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| {
        if let tauri::RunEvent::Exit = event {
            if let Some(shell) = app.try_state::<ShellHandle>() {
                let _ = shell.send(ShellEvent::Shutdown);
            }
        }
    });
}
