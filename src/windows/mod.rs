pub mod capture_window;
pub mod overlay_window;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const CAPTURE_WINDOW_LABEL: &str = "capture";
