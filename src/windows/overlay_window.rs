use tauri::{AppHandle, Emitter, Manager, WebviewWindow};

use crate::stealth::{HostError, OverlayWindow, WindowBounds};

use super::MAIN_WINDOW_LABEL;

pub const EVT_CHROME_VISIBILITY: &str = "shell-chrome-visibility";

/// Physical outer rect of a window, the same frame `GetCursorPos` reports in.
pub fn window_bounds(window: &tauri::Window) -> Option<WindowBounds> {
    let pos = window.outer_position().ok()?;
    let size = window.outer_size().ok()?;
    Some(WindowBounds::new(
        pos.x,
        pos.y,
        size.width as i32,
        size.height as i32,
    ))
}

fn native(err: tauri::Error) -> HostError {
    HostError::native(err.to_string())
}

/// The `main` content window, looked up by label on every call so a closed window surfaces as
/// `WindowGone` instead of a dangling handle.
pub struct TauriOverlayWindow {
    app: AppHandle,
}

impl TauriOverlayWindow {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self) -> Result<WebviewWindow, HostError> {
        self.app
            .get_webview_window(MAIN_WINDOW_LABEL)
            .ok_or_else(|| HostError::window_gone(MAIN_WINDOW_LABEL))
    }
}

impl OverlayWindow for TauriOverlayWindow {
    fn bounds(&self) -> Result<WindowBounds, HostError> {
        let window = self.window()?;
        let pos = window.outer_position().map_err(native)?;
        let size = window.outer_size().map_err(native)?;
        Ok(WindowBounds::new(
            pos.x,
            pos.y,
            size.width as i32,
            size.height as i32,
        ))
    }

    fn show(&mut self) -> Result<(), HostError> {
        let window = self.window()?;
        if window.is_minimized().unwrap_or(false) {
            window.unminimize().map_err(native)?;
        }
        window.show().map_err(native)
    }

    fn focus(&mut self) -> Result<(), HostError> {
        self.window()?.set_focus().map_err(native)
    }

    fn hide(&mut self) -> Result<(), HostError> {
        self.window()?.hide().map_err(native)
    }

    fn minimize(&mut self) -> Result<(), HostError> {
        self.window()?.minimize().map_err(native)
    }

    fn close(&mut self) -> Result<(), HostError> {
        match self.app.get_webview_window(MAIN_WINDOW_LABEL) {
            Some(window) => window.close().map_err(native),
            None => Ok(()),
        }
    }

    fn set_chrome_visible(&mut self, visible: bool) -> Result<(), HostError> {
        self.window()?
            .emit(EVT_CHROME_VISIBILITY, visible)
            .map_err(native)
    }
}
