use tauri::{AppHandle, Manager, PhysicalPosition, PhysicalSize, WebviewWindow};

use crate::stealth::{CaptureSurface, HostError, WindowBounds};

use super::CAPTURE_WINDOW_LABEL;

fn native(err: tauri::Error) -> HostError {
    HostError::native(err.to_string())
}

/// Transparent, undecorated, always-on-top window laid over the hidden `main` window. It only
/// hosts `capture.html`, which forwards middle-button presses back to the shell.
pub struct TauriCaptureSurface {
    app: AppHandle,
}

impl TauriCaptureSurface {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self) -> Result<WebviewWindow, HostError> {
        self.app
            .get_webview_window(CAPTURE_WINDOW_LABEL)
            .ok_or_else(|| HostError::window_gone(CAPTURE_WINDOW_LABEL))
    }

    fn place(window: &WebviewWindow, bounds: WindowBounds) -> Result<(), HostError> {
        window
            .set_position(tauri::Position::Physical(PhysicalPosition {
                x: bounds.x,
                y: bounds.y,
            }))
            .map_err(native)?;
        window
            .set_size(tauri::Size::Physical(PhysicalSize {
                width: bounds.width.max(1) as u32,
                height: bounds.height.max(1) as u32,
            }))
            .map_err(native)
    }
}

impl CaptureSurface for TauriCaptureSurface {
    fn create(&mut self, bounds: WindowBounds) -> Result<(), HostError> {
        if let Some(window) = self.app.get_webview_window(CAPTURE_WINDOW_LABEL) {
            return Self::place(&window, bounds);
        }

        let window = tauri::WebviewWindowBuilder::new(
            &self.app,
            CAPTURE_WINDOW_LABEL,
            tauri::WebviewUrl::App("capture.html".into()),
        )
        .title("stealth-capture")
        .decorations(false)
        .transparent(true)
        .shadow(false)
        .resizable(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .focused(false)
        .visible(false)
        .build()
        .map_err(native)?;

        if let Err(err) = window.set_focusable(false) {
            log::debug!("Capture surface: set_focusable failed: {}", err);
        }
        Self::place(&window, bounds)
    }

    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), HostError> {
        Self::place(&self.window()?, bounds)
    }

    fn set_click_through(&mut self, click_through: bool) -> Result<(), HostError> {
        self.window()?
            .set_ignore_cursor_events(click_through)
            .map_err(native)
    }

    fn show(&mut self) -> Result<(), HostError> {
        self.window()?.show().map_err(native)
    }

    fn hide(&mut self) -> Result<(), HostError> {
        self.window()?.hide().map_err(native)
    }

    fn destroy(&mut self) -> Result<(), HostError> {
        match self.app.get_webview_window(CAPTURE_WINDOW_LABEL) {
            Some(window) => window.destroy().map_err(native),
            None => Ok(()),
        }
    }
}
