//! Unlock gesture recognizers.
//!
//! Three recognizers compete for the same outcome (revealing the window):
//! - hold-to-unlock: a button press held inside the window for `hold_duration_ms`
//! - multi-enter: `multi_enter_threshold` pointer entries within `multi_enter_window_ms`
//! - keyboard toggle: a global shortcut, only while keyboard mode is active
//!
//! Keyboard mode is exclusive with the two mouse recognizers: switching into it clears their
//! timers synchronously so nothing stale can fire after the switch.

use super::timer::TimerSlot;
use super::types::{Edge, Millis, UnlockSource};
use crate::services::config::ModeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSettings {
    pub hold_duration_ms: Millis,
    pub multi_enter_window_ms: Millis,
    pub multi_enter_threshold: u32,
}

impl From<&ModeConfig> for GestureSettings {
    fn from(config: &ModeConfig) -> Self {
        Self {
            hold_duration_ms: config.hold_duration_ms,
            multi_enter_window_ms: config.multi_enter_window_ms,
            multi_enter_threshold: config.multi_enter_threshold.max(1),
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&ModeConfig::default())
    }
}

#[derive(Debug, Default)]
struct HoldGesture {
    pressed: bool,
    press_started_at: Option<Millis>,
    timer: TimerSlot,
}

impl HoldGesture {
    fn reset(&mut self) {
        self.pressed = false;
        self.press_started_at = None;
        self.timer.cancel();
    }

    fn in_flight(&self) -> bool {
        self.pressed && self.timer.is_pending()
    }
}

#[derive(Debug, Default)]
struct MultiEnterGesture {
    count: u32,
    window: TimerSlot,
}

impl MultiEnterGesture {
    fn reset(&mut self) {
        self.count = 0;
        self.window.cancel();
    }
}

#[derive(Debug, Default)]
pub struct GestureArbiter {
    settings: GestureSettings,
    keyboard_mode: bool,
    hold: HoldGesture,
    multi_enter: MultiEnterGesture,
}

impl GestureArbiter {
    pub fn new(settings: GestureSettings, keyboard_mode: bool) -> Self {
        Self {
            settings,
            keyboard_mode,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> GestureSettings {
        self.settings
    }

    pub fn keyboard_mode(&self) -> bool {
        self.keyboard_mode
    }

    pub fn enter_count(&self) -> u32 {
        self.multi_enter.count
    }

    pub fn hold_in_flight(&self) -> bool {
        self.hold.in_flight()
    }

    pub fn hold_started_at(&self) -> Option<Millis> {
        self.hold.press_started_at
    }

    /// Whether a hold could legitimately start right now (drives capture mode).
    pub fn hold_possible(&self) -> bool {
        !self.keyboard_mode
    }

    /// New thresholds apply from the next event; accumulated counts are not re-evaluated and a
    /// running window timer keeps its original deadline.
    pub fn apply_settings(&mut self, settings: GestureSettings) {
        if self.settings != settings {
            log::debug!(
                "Gesture settings updated (hold={}ms, window={}ms, threshold={})",
                settings.hold_duration_ms,
                settings.multi_enter_window_ms,
                settings.multi_enter_threshold
            );
        }
        self.settings = settings;
    }

    /// Returns whether the mode actually changed.
    pub fn set_keyboard_mode(&mut self, enabled: bool) -> bool {
        if self.keyboard_mode == enabled {
            return false;
        }
        // Clear mouse-mode timers before the other mode becomes active.
        self.reset();
        self.keyboard_mode = enabled;
        log::info!(
            "Unlock mode switched to {}",
            if enabled { "keyboard" } else { "mouse" }
        );
        true
    }

    pub fn reset(&mut self) {
        self.hold.reset();
        self.multi_enter.reset();
    }

    /// Start a hold. Only counts while the pointer is inside the window.
    pub fn on_press(&mut self, now: Millis, inside: bool) -> bool {
        if self.keyboard_mode || !inside {
            return false;
        }
        if self.hold.pressed {
            return false;
        }
        self.hold.pressed = true;
        self.hold.press_started_at = Some(now);
        self.hold.timer.start(now, self.settings.hold_duration_ms);
        log::debug!("Hold gesture armed ({}ms)", self.settings.hold_duration_ms);
        true
    }

    /// Returns whether a pending hold was abandoned.
    pub fn on_release(&mut self) -> bool {
        if !self.hold.pressed {
            return false;
        }
        let abandoned = self.hold.timer.is_pending();
        self.hold.reset();
        if abandoned {
            log::debug!("Hold gesture released early");
        }
        abandoned
    }

    pub fn on_edge(&mut self, edge: Edge, now: Millis) -> Option<UnlockSource> {
        if self.keyboard_mode {
            return None;
        }

        match edge {
            Edge::Left => {
                // A hold cannot span outside the window. The enter count is left alone.
                if self.hold.pressed {
                    self.hold.reset();
                    log::debug!("Hold gesture cancelled: pointer left");
                }
                None
            }
            Edge::Entered => {
                self.multi_enter.count = self.multi_enter.count.saturating_add(1);
                if self.multi_enter.count == 1 {
                    self.multi_enter
                        .window
                        .start(now, self.settings.multi_enter_window_ms);
                }
                log::trace!(
                    "Multi-enter count {}/{}",
                    self.multi_enter.count,
                    self.settings.multi_enter_threshold
                );

                if self.multi_enter.count >= self.settings.multi_enter_threshold {
                    self.reset();
                    return Some(UnlockSource::MultiEnter);
                }
                None
            }
        }
    }

    pub fn on_shortcut(&self) -> Option<UnlockSource> {
        self.keyboard_mode.then_some(UnlockSource::Keyboard)
    }

    pub fn hold_deadline(&self) -> Option<Millis> {
        self.hold.timer.deadline()
    }

    pub fn window_deadline(&self) -> Option<Millis> {
        self.multi_enter.window.deadline()
    }

    pub fn fire_hold_if_due(&mut self, now: Millis, inside: bool) -> Option<UnlockSource> {
        if !self.hold.timer.take_if_due(now) {
            return None;
        }
        if self.hold.pressed && inside {
            self.reset();
            return Some(UnlockSource::Hold);
        }
        self.hold.reset();
        None
    }

    /// Returns whether the pattern window expired (and the count was dropped).
    pub fn expire_window_if_due(&mut self, now: Millis) -> bool {
        if !self.multi_enter.window.take_if_due(now) {
            return false;
        }
        if self.multi_enter.count > 0 {
            log::trace!(
                "Multi-enter window expired at count {}",
                self.multi_enter.count
            );
        }
        self.multi_enter.count = 0;
        true
    }
}
