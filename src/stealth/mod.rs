//! Stealth visibility core.
//!
//! Everything here runs on a virtual millisecond clock against the traits in [`host`], so the
//! whole state machine is testable without a window system. The desktop build plugs Tauri
//! adapters into the same traits.

pub mod capture;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod host;
pub mod media;
pub mod runtime;
pub mod sampler;
pub mod timer;
pub mod types;
pub mod visibility;

pub use controller::{ShellEvent, ShellStatus, StealthController};
pub use error::{HostError, MediaError};
pub use host::{CaptureSurface, CursorSource, MediaControl, OverlayWindow, ShellPorts};
pub use runtime::{ShellDriver, ShellHandle};
pub use types::{CaptureMode, CursorPoint, Millis, Visibility, WindowBounds};
