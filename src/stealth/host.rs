//! Native capabilities the controller drives. The desktop build implements these over Tauri;
//! tests implement them with recording fakes.

use super::error::{HostError, MediaError};
use super::types::{CursorPoint, WindowBounds};

/// The primary content window.
pub trait OverlayWindow {
    fn bounds(&self) -> Result<WindowBounds, HostError>;
    fn show(&mut self) -> Result<(), HostError>;
    fn focus(&mut self) -> Result<(), HostError>;
    fn hide(&mut self) -> Result<(), HostError>;
    fn minimize(&mut self) -> Result<(), HostError>;
    fn close(&mut self) -> Result<(), HostError>;
    /// Toolbar/chrome visibility, toggled around content fullscreen.
    fn set_chrome_visible(&mut self, visible: bool) -> Result<(), HostError>;
}

/// The transparent always-on-top surface that receives button presses while the primary window
/// is hidden.
pub trait CaptureSurface {
    fn create(&mut self, bounds: WindowBounds) -> Result<(), HostError>;
    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), HostError>;
    /// `true` forwards every event to whatever is beneath the surface.
    fn set_click_through(&mut self, click_through: bool) -> Result<(), HostError>;
    fn show(&mut self) -> Result<(), HostError>;
    fn hide(&mut self) -> Result<(), HostError>;
    fn destroy(&mut self) -> Result<(), HostError>;
}

/// Playback capability of the embedded content host.
pub trait MediaControl {
    fn is_playing(&self) -> Result<bool, MediaError>;
    fn pause(&mut self) -> Result<(), MediaError>;
    fn resume(&mut self) -> Result<(), MediaError>;
    fn request_fullscreen(&mut self) -> Result<(), MediaError>;
}

pub trait CursorSource {
    fn cursor_position(&self) -> Option<CursorPoint>;
}

/// Everything the controller talks to, bundled so a single value moves into the driver task.
pub struct ShellPorts<W, S, M, C> {
    pub window: W,
    pub surface: S,
    pub media: M,
    pub cursor: C,
}

impl<W, S, M, C> ShellPorts<W, S, M, C>
where
    W: OverlayWindow,
    S: CaptureSurface,
    M: MediaControl,
    C: CursorSource,
{
    pub fn new(window: W, surface: S, media: M, cursor: C) -> Self {
        Self {
            window,
            surface,
            media,
            cursor,
        }
    }
}
