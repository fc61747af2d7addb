use super::error::HostError;
use super::host::CaptureSurface;
use super::types::{CaptureMode, WindowBounds};

/// Keeps the capture surface's geometry, visibility and click-through mode in step with the
/// primary window.
///
/// Applied state is cached so native calls only happen on change. A failed call drops the cached
/// value so the next sync retries; a failed mode switch falls back to pass-through so the surface
/// never blocks the desktop.
#[derive(Debug, Default)]
pub struct CaptureSurfaceSync {
    present: bool,
    engaged: bool,
    shown: Option<bool>,
    mode: Option<CaptureMode>,
    bounds: Option<WindowBounds>,
}

impl CaptureSurfaceSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn mode(&self) -> Option<CaptureMode> {
        if self.present { self.mode } else { None }
    }

    pub fn mirrored_bounds(&self) -> Option<WindowBounds> {
        self.bounds
    }

    /// The primary window is hiding: make sure the surface exists over its bounds and is shown
    /// in pass-through mode.
    pub fn engage(&mut self, surface: &mut dyn CaptureSurface, bounds: Option<WindowBounds>) {
        self.engaged = true;

        if !self.present {
            let Some(bounds) = bounds else {
                log::debug!("Capture surface: no window bounds yet, deferring creation");
                return;
            };
            match surface.create(bounds) {
                Ok(()) => {
                    log::info!(
                        "Capture surface created at ({}, {}) {}x{}",
                        bounds.x,
                        bounds.y,
                        bounds.width,
                        bounds.height
                    );
                    self.present = true;
                    self.bounds = Some(bounds);
                    self.shown = Some(false);
                    self.mode = None;
                }
                Err(err) => {
                    log::warn!("Capture surface: create failed: {}", err);
                    return;
                }
            }
        } else if let Some(bounds) = bounds {
            self.mirror_bounds(surface, bounds);
        }

        self.apply_mode(surface, CaptureMode::PassThrough);
        self.apply_shown(surface, true);
    }

    /// The primary window is visible again: hide the surface and stop intercepting input.
    pub fn suppress(&mut self, surface: &mut dyn CaptureSurface) {
        self.engaged = false;
        if !self.present {
            return;
        }
        self.apply_mode(surface, CaptureMode::PassThrough);
        self.apply_shown(surface, false);
    }

    pub fn mirror_bounds(&mut self, surface: &mut dyn CaptureSurface, bounds: WindowBounds) {
        if !self.present || self.bounds == Some(bounds) {
            return;
        }
        match surface.set_bounds(bounds) {
            Ok(()) => self.bounds = Some(bounds),
            Err(err) => {
                self.bounds = None;
                self.on_error("set_bounds", &err);
            }
        }
    }

    /// Capture only while engaged and the caller says a hold is possible under the pointer.
    pub fn refresh_mode(&mut self, surface: &mut dyn CaptureSurface, want_capture: bool) {
        if !self.present {
            return;
        }
        let desired = if self.engaged && want_capture {
            CaptureMode::Capturing
        } else {
            CaptureMode::PassThrough
        };
        self.apply_mode(surface, desired);
    }

    /// The native surface went away on its own.
    pub fn forget(&mut self) {
        if self.present {
            log::debug!("Capture surface destroyed externally");
        }
        let engaged = self.engaged;
        *self = Self::default();
        self.engaged = engaged;
    }

    pub fn teardown(&mut self, surface: &mut dyn CaptureSurface) {
        if self.present {
            if let Err(err) = surface.destroy() {
                log::debug!("Capture surface: destroy failed: {}", err);
            } else {
                log::info!("Capture surface destroyed");
            }
        }
        *self = Self::default();
    }

    fn apply_mode(&mut self, surface: &mut dyn CaptureSurface, desired: CaptureMode) {
        if !self.present || self.mode == Some(desired) {
            return;
        }
        let click_through = desired == CaptureMode::PassThrough;
        match surface.set_click_through(click_through) {
            Ok(()) => {
                self.mode = Some(desired);
                log::trace!("Capture surface mode -> {:?}", desired);
            }
            Err(err) => {
                self.mode = None;
                self.on_error("set_click_through", &err);
                if self.present && !click_through && surface.set_click_through(true).is_ok() {
                    self.mode = Some(CaptureMode::PassThrough);
                }
            }
        }
    }

    fn apply_shown(&mut self, surface: &mut dyn CaptureSurface, shown: bool) {
        if !self.present || self.shown == Some(shown) {
            return;
        }
        let result = if shown { surface.show() } else { surface.hide() };
        match result {
            Ok(()) => self.shown = Some(shown),
            Err(err) => {
                self.shown = None;
                self.on_error(if shown { "show" } else { "hide" }, &err);
            }
        }
    }

    fn on_error(&mut self, op: &str, err: &HostError) {
        if err.is_window_gone() {
            self.forget();
        }
        log::debug!("Capture surface: {} failed: {}", op, err);
    }
}
