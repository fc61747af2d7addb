use tauri::AppHandle;

use crate::stealth::{CursorPoint, CursorSource};

/// Global pointer position in physical screen pixels.
pub struct DesktopCursor {
    #[cfg_attr(target_os = "windows", allow(dead_code))]
    app: AppHandle,
}

impl DesktopCursor {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl CursorSource for DesktopCursor {
    #[cfg(target_os = "windows")]
    fn cursor_position(&self) -> Option<CursorPoint> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut pt = POINT::default();
        if unsafe { GetCursorPos(&mut pt) }.is_err() {
            return None;
        }
        Some(CursorPoint::new(pt.x, pt.y))
    }

    #[cfg(not(target_os = "windows"))]
    fn cursor_position(&self) -> Option<CursorPoint> {
        let pos = self.app.cursor_position().ok()?;
        Some(CursorPoint::new(pos.x.round() as i32, pos.y.round() as i32))
    }
}
