use serde::{Deserialize, Serialize};

/// Milliseconds since the shell driver started.
pub type Millis = u64;

/// Screen-space rectangle of the overlay window, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowBounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width.max(0) as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height.max(0) as i64
    }

    /// Inclusive on every edge: a cursor resting on the right/bottom border still counts.
    pub fn contains(&self, point: CursorPoint) -> bool {
        let px = point.x as i64;
        let py = point.y as i64;
        px >= self.x as i64 && px <= self.right() && py >= self.y as i64 && py <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPoint {
    pub x: i32,
    pub y: i32,
}

impl CursorPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Containment edge produced by the region sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Entered,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Which recognizer asked for the window to be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnlockSource {
    Hold,
    MultiEnter,
    Keyboard,
    Startup,
}

/// Click-through state of the capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    PassThrough,
    Capturing,
}
