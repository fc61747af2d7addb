use super::timer::TimerSlot;
use super::types::{Edge, Millis, Visibility, WindowBounds};

/// Floor for the hide debounce; shorter delays make the window flicker on jittery pointers.
pub const MIN_HIDE_DELAY_MS: Millis = 1_000;
pub const MAX_HIDE_DELAY_MS: Millis = 60_000;

pub fn clamp_hide_delay(ms: Millis) -> Millis {
    ms.clamp(MIN_HIDE_DELAY_MS, MAX_HIDE_DELAY_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reveal,
    Conceal,
}

/// Why a conceal was scheduled; decides which guard applies when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideCause {
    Debounce,
    StartupIndication,
}

/// The `Hidden`/`Visible` state machine.
///
/// Decisions (`reveal`, `take_due_hide`, ...) only describe a transition; the state changes when
/// the coordinator calls [`VisibilityController::commit`] after the native call succeeded. A
/// transition whose native call failed is dropped and the last known state stands.
#[derive(Debug)]
pub struct VisibilityController {
    state: Visibility,
    pinned: bool,
    auto_hide_suspended: bool,
    hide_delay_ms: Millis,
    bounds: Option<WindowBounds>,
    hide_timer: TimerSlot,
    startup_timer: TimerSlot,
}

impl VisibilityController {
    pub fn new(pinned: bool, hide_delay_ms: Millis) -> Self {
        Self {
            state: Visibility::Hidden,
            pinned,
            auto_hide_suspended: false,
            hide_delay_ms: clamp_hide_delay(hide_delay_ms),
            bounds: None,
            hide_timer: TimerSlot::new(),
            startup_timer: TimerSlot::new(),
        }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == Visibility::Visible
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn hide_delay_ms(&self) -> Millis {
        self.hide_delay_ms
    }

    pub fn hide_pending(&self) -> bool {
        self.hide_timer.is_pending()
    }

    pub fn bounds(&self) -> Option<WindowBounds> {
        self.bounds
    }

    /// Native move/resize notification. The only path that writes bounds.
    pub fn update_bounds(&mut self, bounds: WindowBounds) -> bool {
        if self.bounds == Some(bounds) {
            return false;
        }
        self.bounds = Some(bounds);
        true
    }

    pub fn set_hide_delay(&mut self, ms: Millis) {
        self.hide_delay_ms = clamp_hide_delay(ms);
    }

    /// Keyboard mode owns visibility explicitly; automatic hides are suspended and any pending
    /// debounce is cleared on the switch.
    pub fn set_auto_hide_suspended(&mut self, suspended: bool) {
        self.auto_hide_suspended = suspended;
        if suspended {
            self.hide_timer.cancel();
        }
    }

    pub fn auto_hide_suspended(&self) -> bool {
        self.auto_hide_suspended
    }

    /// Plan the startup indication. Returns the transition to apply right away.
    pub fn begin_startup(
        &mut self,
        now: Millis,
        show_on_startup: bool,
        indication_ms: Millis,
    ) -> Transition {
        if self.pinned {
            return Transition::Reveal;
        }
        if show_on_startup {
            self.startup_timer.start(now, indication_ms);
            return Transition::Reveal;
        }
        Transition::Conceal
    }

    /// Idempotent: `None` while already visible.
    pub fn reveal(&self) -> Option<Transition> {
        (self.state == Visibility::Hidden).then_some(Transition::Reveal)
    }

    pub fn toggle(&self) -> Transition {
        match self.state {
            Visibility::Hidden => Transition::Reveal,
            Visibility::Visible => Transition::Conceal,
        }
    }

    pub fn commit(&mut self, transition: Transition) {
        self.hide_timer.cancel();
        self.state = match transition {
            Transition::Reveal => Visibility::Visible,
            Transition::Conceal => {
                self.startup_timer.cancel();
                Visibility::Hidden
            }
        };
    }

    pub fn on_edge(&mut self, edge: Edge, now: Millis) {
        match edge {
            Edge::Entered => {
                if self.hide_timer.cancel() {
                    log::trace!("Hide debounce cancelled: pointer re-entered");
                }
            }
            Edge::Left => self.schedule_hide(now),
        }
    }

    pub fn cancel_pending_hide(&mut self) -> bool {
        self.hide_timer.cancel()
    }

    fn schedule_hide(&mut self, now: Millis) {
        if self.state != Visibility::Visible || self.pinned || self.auto_hide_suspended {
            return;
        }
        // Restart: a new `left` always pushes the deadline out.
        self.hide_timer.start(now, self.hide_delay_ms);
        log::trace!("Hide debounce scheduled in {}ms", self.hide_delay_ms);
    }

    /// Returns whether the pin state changed.
    pub fn set_pinned(&mut self, pinned: bool, now: Millis, inside: bool) -> bool {
        if self.pinned == pinned {
            return false;
        }
        self.pinned = pinned;
        if pinned {
            self.hide_timer.cancel();
            self.startup_timer.cancel();
        } else if !inside {
            // Unpinning while the pointer is away behaves like a fresh `left`.
            self.schedule_hide(now);
        }
        true
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        super::timer::earliest([self.hide_timer.deadline(), self.startup_timer.deadline()])
    }

    pub fn hide_deadline(&self) -> Option<Millis> {
        self.hide_timer.deadline()
    }

    pub fn startup_deadline(&self) -> Option<Millis> {
        self.startup_timer.deadline()
    }

    /// Fire the debounce if due. The guard (`!pinned && still outside`) is re-checked here.
    pub fn take_due_hide(&mut self, now: Millis, inside: bool) -> Option<Transition> {
        if !self.hide_timer.take_if_due(now) {
            return None;
        }
        self.guarded_conceal(HideCause::Debounce, inside)
    }

    pub fn take_due_startup(&mut self, now: Millis, inside: bool) -> Option<Transition> {
        if !self.startup_timer.take_if_due(now) {
            return None;
        }
        self.guarded_conceal(HideCause::StartupIndication, inside)
    }

    fn guarded_conceal(&self, cause: HideCause, inside: bool) -> Option<Transition> {
        if self.state != Visibility::Visible || self.pinned {
            return None;
        }
        match cause {
            HideCause::Debounce if inside || self.auto_hide_suspended => None,
            // Nothing else would ever hide the window in keyboard mode.
            HideCause::StartupIndication if inside && !self.auto_hide_suspended => None,
            _ => Some(Transition::Conceal),
        }
    }

    /// Window destroyed: drop every timer and forget the geometry.
    pub fn teardown(&mut self) {
        self.hide_timer.cancel();
        self.startup_timer.cancel();
        self.bounds = None;
        self.state = Visibility::Hidden;
    }
}
