use serde::Serialize;
use smallvec::SmallVec;

use super::capture::CaptureSurfaceSync;
use super::error::HostError;
use super::gesture::{GestureArbiter, GestureSettings};
use super::host::{CaptureSurface, CursorSource, MediaControl, OverlayWindow, ShellPorts};
use super::media::MediaCoordinator;
use super::sampler::RegionSampler;
use super::timer::earliest;
use super::types::{CaptureMode, Edge, Millis, UnlockSource, Visibility, WindowBounds};
use super::visibility::{Transition, VisibilityController};
use crate::services::config::ModeConfig;

/// Inbound signals from the renderer, the window system and the settings layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    MiddleButtonPressed,
    MiddleButtonReleased,
    ShortcutPressed,
    BoundsChanged(WindowBounds),
    WindowDestroyed,
    CaptureSurfaceDestroyed,
    CloseRequested,
    MinimizeRequested,
    SetPinned(bool),
    ConfigReloaded(ModeConfig),
    ContentFullscreenChanged(bool),
    RequestFullscreen,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellStatus {
    pub visibility: Visibility,
    pub pinned: bool,
    pub keyboard_mode: bool,
    pub window_alive: bool,
    pub pointer_inside: bool,
    pub enter_count: u32,
    pub hold_in_flight: bool,
    pub hide_pending: bool,
    pub capture: Option<CaptureMode>,
    pub media_paused_by_shell: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    Hold,
    MultiEnterWindow,
    HideDebounce,
    StartupIndication,
    MediaResume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConcealVia {
    Hide,
    Minimize,
}

/// Owns every piece of stealth state for one overlay window.
///
/// All mutation happens through `start`, `tick`, `advance` and `handle`, each called with the
/// current time. Timers due at or before that time fire first, in deadline order, so callbacks
/// keep the order they would have had on a real event loop.
pub struct StealthController<W, S, M, C> {
    ports: ShellPorts<W, S, M, C>,
    config: ModeConfig,
    sampler: RegionSampler,
    gestures: GestureArbiter,
    visibility: VisibilityController,
    capture: CaptureSurfaceSync,
    media: MediaCoordinator,
    window_alive: bool,
    minimized: bool,
    stopped: bool,
}

impl<W, S, M, C> StealthController<W, S, M, C>
where
    W: OverlayWindow,
    S: CaptureSurface,
    M: MediaControl,
    C: CursorSource,
{
    pub fn new(ports: ShellPorts<W, S, M, C>, config: ModeConfig) -> Self {
        let mut visibility =
            VisibilityController::new(config.is_window_pinned, config.hide_delay_ms);
        visibility.set_auto_hide_suspended(config.keyboard_mode_enabled);

        Self {
            gestures: GestureArbiter::new(
                GestureSettings::from(&config),
                config.keyboard_mode_enabled,
            ),
            media: MediaCoordinator::new(config.auto_pause_on_hide),
            sampler: RegionSampler::new(),
            capture: CaptureSurfaceSync::new(),
            visibility,
            ports,
            config,
            window_alive: true,
            minimized: false,
            stopped: false,
        }
    }

    pub fn ports(&self) -> &ShellPorts<W, S, M, C> {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut ShellPorts<W, S, M, C> {
        &mut self.ports
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn status(&self) -> ShellStatus {
        ShellStatus {
            visibility: self.visibility.state(),
            pinned: self.visibility.is_pinned(),
            keyboard_mode: self.gestures.keyboard_mode(),
            window_alive: self.window_alive,
            pointer_inside: self.sampler.is_inside(),
            enter_count: self.gestures.enter_count(),
            hold_in_flight: self.gestures.hold_in_flight(),
            hide_pending: self.visibility.hide_pending(),
            capture: self.capture.mode(),
            media_paused_by_shell: self.media.paused_by_shell(),
        }
    }

    /// Earliest pending timer, if any. The driver sleeps until then.
    pub fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.gestures.hold_deadline(),
            self.gestures.window_deadline(),
            self.visibility.next_deadline(),
            self.media.resume_deadline(),
        ])
    }

    /// Read the window geometry, seed pointer containment and run the startup indication.
    pub fn start(&mut self, now: Millis) {
        match self.ports.window.bounds() {
            Ok(bounds) => {
                self.visibility.update_bounds(bounds);
            }
            Err(err) => {
                log::warn!("Stealth controller: initial bounds unavailable: {}", err);
                if err.is_window_gone() {
                    self.window_alive = false;
                    return;
                }
            }
        }

        self.sampler
            .prime(self.ports.cursor.cursor_position(), self.visibility.bounds());

        let transition = self.visibility.begin_startup(
            now,
            self.config.show_window_on_startup,
            self.config.startup_display_ms,
        );
        log::info!(
            "Stealth controller started (startup={:?}, pinned={}, keyboard_mode={}, indication={}ms)",
            transition,
            self.visibility.is_pinned(),
            self.gestures.keyboard_mode(),
            self.config.startup_display_ms
        );
        self.apply(transition, now);
        self.refresh_capture_mode();
    }

    /// One sampler tick.
    pub fn tick(&mut self, now: Millis) {
        self.advance(now);
        if !self.window_alive || self.stopped {
            return;
        }

        let outcome = self.sampler.sample(
            self.ports.cursor.cursor_position(),
            self.visibility.bounds(),
            self.visibility.hide_pending(),
        );
        if outcome.cancel_pending_hide {
            self.visibility.cancel_pending_hide();
        }
        if let Some(edge) = outcome.edge {
            self.on_edge(edge, now);
        }
        self.refresh_capture_mode();
    }

    /// Fire every timer due at `now`.
    pub fn advance(&mut self, now: Millis) {
        let mut due = SmallVec::<[(Millis, TimerKind); 5]>::new();
        self.collect_due(now, &mut due);
        if due.is_empty() {
            return;
        }
        due.sort();
        for (_, kind) in due {
            // An earlier firing may have cleared this slot; the take below re-checks.
            self.fire(kind, now);
        }
        self.refresh_capture_mode();
    }

    pub fn handle(&mut self, event: ShellEvent, now: Millis) {
        self.advance(now);
        if self.stopped {
            return;
        }
        log::trace!("Stealth controller event: {:?}", event);

        match event {
            ShellEvent::MiddleButtonPressed => {
                self.gestures.on_press(now, self.sampler.is_inside());
            }
            ShellEvent::MiddleButtonReleased => {
                self.gestures.on_release();
            }
            ShellEvent::ShortcutPressed => self.on_shortcut(now),
            ShellEvent::BoundsChanged(bounds) => {
                // A minimized window reports a parked off-screen rect.
                if self.minimized {
                    log::trace!("Bounds change ignored while minimized");
                } else {
                    self.track_bounds(bounds);
                }
            }
            ShellEvent::WindowDestroyed => self.on_window_destroyed(),
            ShellEvent::CaptureSurfaceDestroyed => self.capture.forget(),
            ShellEvent::CloseRequested => {
                self.on_window_destroyed();
                if let Err(err) = self.ports.window.close() {
                    log::debug!("Window close failed: {}", err);
                }
            }
            ShellEvent::MinimizeRequested => {
                if self.visibility.is_visible() {
                    self.conceal(ConcealVia::Minimize);
                }
            }
            ShellEvent::SetPinned(pinned) => {
                if self
                    .visibility
                    .set_pinned(pinned, now, self.sampler.is_inside())
                {
                    log::info!("Window pin -> {}", pinned);
                }
            }
            ShellEvent::ConfigReloaded(config) => self.reload(config, now),
            ShellEvent::ContentFullscreenChanged(fullscreen) => {
                if let Err(err) = self.ports.window.set_chrome_visible(!fullscreen) {
                    self.native_failure("set_chrome_visible", err);
                }
            }
            ShellEvent::RequestFullscreen => {
                if let Err(err) = self.ports.media.request_fullscreen() {
                    log::warn!("Content fullscreen request failed: {}", err);
                }
            }
            ShellEvent::Shutdown => self.shutdown(),
        }

        self.refresh_capture_mode();
    }

    /// Clear every timer and release the capture surface. The primary window is left alone.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.gestures.reset();
        self.media.teardown();
        self.visibility.set_auto_hide_suspended(true);
        self.visibility.cancel_pending_hide();
        self.capture.teardown(&mut self.ports.surface);
        log::info!("Stealth controller stopped");
    }

    fn on_edge(&mut self, edge: Edge, now: Millis) {
        self.visibility.on_edge(edge, now);
        if let Some(source) = self.gestures.on_edge(edge, now) {
            self.unlock(source, now);
        }
    }

    fn on_shortcut(&mut self, now: Millis) {
        if self.gestures.on_shortcut().is_none() {
            return;
        }
        if !self.window_alive {
            log::debug!("Shortcut ignored: no window");
            return;
        }
        match self.visibility.toggle() {
            Transition::Reveal => self.unlock(UnlockSource::Keyboard, now),
            Transition::Conceal => self.conceal(ConcealVia::Hide),
        }
    }

    fn unlock(&mut self, source: UnlockSource, now: Millis) {
        match self.visibility.reveal() {
            Some(transition) => {
                log::info!("Unlock via {:?}", source);
                self.apply(transition, now);
            }
            None => log::trace!("Unlock via {:?} ignored: already visible", source),
        }
    }

    fn reload(&mut self, config: ModeConfig, now: Millis) {
        let was_keyboard = self.gestures.keyboard_mode();
        let now_keyboard = config.keyboard_mode_enabled;
        // Deactivated mode's timers are cleared before the other mode takes over.
        self.gestures.set_keyboard_mode(now_keyboard);
        self.visibility.set_auto_hide_suspended(now_keyboard);
        self.gestures.apply_settings(GestureSettings::from(&config));
        self.visibility.set_hide_delay(config.hide_delay_ms);
        self.media.set_enabled(config.auto_pause_on_hide);

        if !was_keyboard && now_keyboard {
            // No gesture needs a button capture while the shortcut owns visibility.
            self.capture.teardown(&mut self.ports.surface);
        }
        if was_keyboard && !now_keyboard && self.window_alive {
            if self.visibility.is_visible() {
                if !self.sampler.is_inside() {
                    // Pointer already away: count down like a fresh leave.
                    self.visibility.on_edge(Edge::Left, now);
                }
            } else {
                self.capture
                    .engage(&mut self.ports.surface, self.visibility.bounds());
            }
        }

        log::info!(
            "Unlock config reloaded (keyboard_mode={}, hold={}ms, threshold={}, hide_delay={}ms)",
            config.keyboard_mode_enabled,
            config.hold_duration_ms,
            config.multi_enter_threshold,
            self.visibility.hide_delay_ms()
        );
        self.config = config;
    }

    fn track_bounds(&mut self, bounds: WindowBounds) {
        if self.window_alive && self.visibility.update_bounds(bounds) {
            self.capture.mirror_bounds(&mut self.ports.surface, bounds);
        }
    }

    fn on_window_destroyed(&mut self) {
        if !self.window_alive {
            return;
        }
        self.window_alive = false;
        self.minimized = false;
        self.gestures.reset();
        self.visibility.teardown();
        self.sampler.reset();
        self.media.teardown();
        self.capture.teardown(&mut self.ports.surface);
        log::info!("Overlay window gone; stealth timers cleared");
    }

    fn collect_due(&self, now: Millis, out: &mut SmallVec<[(Millis, TimerKind); 5]>) {
        let slots = [
            (self.gestures.hold_deadline(), TimerKind::Hold),
            (self.gestures.window_deadline(), TimerKind::MultiEnterWindow),
            (self.visibility.hide_deadline(), TimerKind::HideDebounce),
            (
                self.visibility.startup_deadline(),
                TimerKind::StartupIndication,
            ),
            (self.media.resume_deadline(), TimerKind::MediaResume),
        ];
        for (deadline, kind) in slots {
            if let Some(deadline) = deadline.filter(|d| *d <= now) {
                out.push((deadline, kind));
            }
        }
    }

    fn fire(&mut self, kind: TimerKind, now: Millis) {
        let inside = self.sampler.is_inside();
        match kind {
            TimerKind::Hold => {
                if let Some(source) = self.gestures.fire_hold_if_due(now, inside) {
                    self.unlock(source, now);
                }
            }
            TimerKind::MultiEnterWindow => {
                self.gestures.expire_window_if_due(now);
            }
            TimerKind::HideDebounce => {
                if let Some(transition) = self.visibility.take_due_hide(now, inside) {
                    self.apply(transition, now);
                }
            }
            TimerKind::StartupIndication => {
                if let Some(transition) = self.visibility.take_due_startup(now, inside) {
                    self.apply(transition, now);
                }
            }
            TimerKind::MediaResume => {
                self.media.fire_resume_if_due(now, &mut self.ports.media);
            }
        }
    }

    fn apply(&mut self, transition: Transition, now: Millis) {
        match transition {
            Transition::Reveal => self.reveal_now(now),
            Transition::Conceal => self.conceal(ConcealVia::Hide),
        }
    }

    fn reveal_now(&mut self, now: Millis) {
        if !self.window_alive {
            log::debug!("Reveal dropped: window gone");
            return;
        }
        if let Err(err) = self.ports.window.show() {
            self.native_failure("show", err);
            return;
        }
        if let Err(err) = self.ports.window.focus() {
            log::debug!("Window focus failed: {}", err);
        }
        if std::mem::take(&mut self.minimized) {
            match self.ports.window.bounds() {
                Ok(bounds) => self.track_bounds(bounds),
                Err(err) => log::debug!("Bounds re-read after restore failed: {}", err),
            }
        }
        self.visibility.commit(Transition::Reveal);
        self.capture.suppress(&mut self.ports.surface);
        self.media.on_revealed(now);
        log::debug!("Overlay revealed");
    }

    fn conceal(&mut self, via: ConcealVia) {
        if !self.window_alive {
            log::debug!("Conceal dropped: window gone");
            return;
        }
        let result = match via {
            ConcealVia::Hide => self.ports.window.hide(),
            ConcealVia::Minimize => self.ports.window.minimize(),
        };
        if let Err(err) = result {
            self.native_failure(if via == ConcealVia::Hide { "hide" } else { "minimize" }, err);
            return;
        }
        self.minimized = via == ConcealVia::Minimize;
        self.visibility.commit(Transition::Conceal);
        self.gestures.on_release();
        if !self.gestures.keyboard_mode() {
            self.capture
                .engage(&mut self.ports.surface, self.visibility.bounds());
        }
        self.media.on_concealed(&mut self.ports.media);
        log::debug!("Overlay concealed ({:?})", via);
    }

    fn refresh_capture_mode(&mut self) {
        let want_capture = self.window_alive
            && !self.stopped
            && !self.visibility.is_visible()
            && self.sampler.is_inside()
            && self.gestures.hold_possible();
        self.capture
            .refresh_mode(&mut self.ports.surface, want_capture);
    }

    fn native_failure(&mut self, op: &str, err: HostError) {
        log::debug!("Native {} failed: {}", op, err);
        if err.is_window_gone() {
            self.on_window_destroyed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::error::MediaError;
    use crate::stealth::types::CursorPoint;

    const BOUNDS: WindowBounds = WindowBounds {
        x: 0,
        y: 0,
        width: 100,
        height: 100,
    };
    const IN: CursorPoint = CursorPoint { x: 50, y: 50 };
    const OUT: CursorPoint = CursorPoint { x: 500, y: 500 };

    struct FakeWindow {
        bounds: WindowBounds,
        calls: Vec<&'static str>,
        chrome: Option<bool>,
        gone: bool,
    }

    impl FakeWindow {
        fn record(&mut self, call: &'static str) -> Result<(), HostError> {
            if self.gone {
                return Err(HostError::window_gone("main"));
            }
            self.calls.push(call);
            Ok(())
        }

        fn count(&self, call: &str) -> usize {
            self.calls.iter().filter(|c| **c == call).count()
        }
    }

    impl OverlayWindow for FakeWindow {
        fn bounds(&self) -> Result<WindowBounds, HostError> {
            if self.gone {
                return Err(HostError::window_gone("main"));
            }
            Ok(self.bounds)
        }
        fn show(&mut self) -> Result<(), HostError> {
            self.record("show")
        }
        fn focus(&mut self) -> Result<(), HostError> {
            self.record("focus")
        }
        fn hide(&mut self) -> Result<(), HostError> {
            self.record("hide")
        }
        fn minimize(&mut self) -> Result<(), HostError> {
            self.record("minimize")
        }
        fn close(&mut self) -> Result<(), HostError> {
            self.record("close")
        }
        fn set_chrome_visible(&mut self, visible: bool) -> Result<(), HostError> {
            self.record("chrome")?;
            self.chrome = Some(visible);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        calls: Vec<String>,
    }

    impl FakeSurface {
        fn count(&self, call: &str) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl CaptureSurface for FakeSurface {
        fn create(&mut self, _bounds: WindowBounds) -> Result<(), HostError> {
            self.calls.push("create".into());
            Ok(())
        }
        fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), HostError> {
            self.calls.push(format!("bounds {},{}", bounds.x, bounds.y));
            Ok(())
        }
        fn set_click_through(&mut self, click_through: bool) -> Result<(), HostError> {
            self.calls.push(format!("click_through {click_through}"));
            Ok(())
        }
        fn show(&mut self) -> Result<(), HostError> {
            self.calls.push("show".into());
            Ok(())
        }
        fn hide(&mut self) -> Result<(), HostError> {
            self.calls.push("hide".into());
            Ok(())
        }
        fn destroy(&mut self) -> Result<(), HostError> {
            self.calls.push("destroy".into());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeMedia {
        playing: bool,
        pauses: u32,
        resumes: u32,
        fullscreen_requests: u32,
    }

    impl MediaControl for FakeMedia {
        fn is_playing(&self) -> Result<bool, MediaError> {
            Ok(self.playing)
        }
        fn pause(&mut self) -> Result<(), MediaError> {
            self.pauses += 1;
            self.playing = false;
            Ok(())
        }
        fn resume(&mut self) -> Result<(), MediaError> {
            self.resumes += 1;
            self.playing = true;
            Ok(())
        }
        fn request_fullscreen(&mut self) -> Result<(), MediaError> {
            self.fullscreen_requests += 1;
            Ok(())
        }
    }

    struct FakeCursor {
        at: Option<CursorPoint>,
    }

    impl CursorSource for FakeCursor {
        fn cursor_position(&self) -> Option<CursorPoint> {
            self.at
        }
    }

    type TestController = StealthController<FakeWindow, FakeSurface, FakeMedia, FakeCursor>;

    fn hidden_config() -> ModeConfig {
        ModeConfig {
            show_window_on_startup: false,
            ..ModeConfig::default()
        }
    }

    fn controller(config: ModeConfig, inside: bool) -> TestController {
        let window = FakeWindow {
            bounds: BOUNDS,
            calls: Vec::new(),
            chrome: None,
            gone: false,
        };
        let cursor = FakeCursor {
            at: Some(if inside { IN } else { OUT }),
        };
        let ports = ShellPorts::new(window, FakeSurface::default(), FakeMedia::default(), cursor);
        StealthController::new(ports, config)
    }

    fn move_and_tick(ctl: &mut TestController, inside: bool, now: Millis) {
        ctl.ports_mut().cursor.at = Some(if inside { IN } else { OUT });
        ctl.tick(now);
    }

    #[test]
    fn test_hold_unlocks_once_at_duration() {
        let mut ctl = controller(hidden_config(), true);
        ctl.start(0);
        assert_eq!(ctl.ports().window.count("hide"), 1);
        assert_eq!(ctl.status().capture, Some(CaptureMode::Capturing));

        ctl.handle(ShellEvent::MiddleButtonPressed, 0);
        assert!(ctl.status().hold_in_flight);
        assert_eq!(ctl.next_deadline(), Some(1000));

        ctl.tick(999);
        assert_eq!(ctl.ports().window.count("show"), 0);

        ctl.tick(1000);
        assert_eq!(ctl.ports().window.count("show"), 1);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        assert!(!ctl.status().hold_in_flight);
        assert_eq!(ctl.status().capture, Some(CaptureMode::PassThrough));

        ctl.tick(2500);
        assert_eq!(ctl.ports().window.count("show"), 1);
    }

    #[test]
    fn test_hold_released_early_does_not_unlock() {
        let mut ctl = controller(hidden_config(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::MiddleButtonPressed, 0);
        ctl.handle(ShellEvent::MiddleButtonReleased, 400);
        ctl.tick(1500);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
    }

    #[test]
    fn test_multi_enter_unlocks_within_window() {
        let config = ModeConfig {
            multi_enter_threshold: 3,
            multi_enter_window_ms: 3000,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);

        move_and_tick(&mut ctl, true, 0);
        move_and_tick(&mut ctl, false, 100);
        move_and_tick(&mut ctl, true, 500);
        move_and_tick(&mut ctl, false, 600);
        assert_eq!(ctl.status().enter_count, 2);
        move_and_tick(&mut ctl, true, 2900);

        assert_eq!(ctl.status().visibility, Visibility::Visible);
        assert_eq!(ctl.status().enter_count, 0);
        assert_eq!(ctl.ports().window.count("show"), 1);
    }

    #[test]
    fn test_multi_enter_window_expiry_restarts_count() {
        let config = ModeConfig {
            multi_enter_threshold: 3,
            multi_enter_window_ms: 3000,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);

        move_and_tick(&mut ctl, true, 0);
        move_and_tick(&mut ctl, false, 100);
        move_and_tick(&mut ctl, true, 500);
        move_and_tick(&mut ctl, false, 600);
        move_and_tick(&mut ctl, true, 3100);

        assert_eq!(ctl.status().visibility, Visibility::Hidden);
        assert_eq!(ctl.status().enter_count, 1);
    }

    #[test]
    fn test_reenter_cancels_hide_debounce() {
        let config = ModeConfig {
            show_window_on_startup: true,
            startup_display_ms: 3000,
            ..ModeConfig::default()
        };
        let mut ctl = controller(config, true);
        ctl.start(0);
        assert_eq!(ctl.status().visibility, Visibility::Visible);

        // startup indication ends with the pointer over the window
        ctl.tick(3000);
        assert_eq!(ctl.status().visibility, Visibility::Visible);

        move_and_tick(&mut ctl, false, 3100);
        assert!(ctl.status().hide_pending);
        move_and_tick(&mut ctl, true, 3700);
        assert!(!ctl.status().hide_pending);
        ctl.tick(5000);
        assert_eq!(ctl.ports().window.count("hide"), 0);

        move_and_tick(&mut ctl, false, 6000);
        ctl.tick(6999);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        ctl.tick(7000);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
        assert_eq!(ctl.ports().window.count("hide"), 1);
        assert!(ctl.status().capture.is_some());
    }

    #[test]
    fn test_user_paused_media_is_left_alone() {
        let config = ModeConfig {
            keyboard_mode_enabled: true,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);
        ctl.handle(ShellEvent::ShortcutPressed, 100);
        ctl.handle(ShellEvent::ShortcutPressed, 200);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
        assert!(!ctl.status().media_paused_by_shell);

        ctl.handle(ShellEvent::ShortcutPressed, 300);
        ctl.advance(2000);
        assert_eq!(ctl.ports().media.pauses, 0);
        assert_eq!(ctl.ports().media.resumes, 0);
    }

    #[test]
    fn test_media_paused_by_hide_resumes_after_settle() {
        let config = ModeConfig {
            keyboard_mode_enabled: true,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.ports_mut().media.playing = true;
        ctl.start(0);
        assert_eq!(ctl.ports().media.pauses, 1);
        assert!(ctl.status().media_paused_by_shell);

        ctl.handle(ShellEvent::ShortcutPressed, 100);
        ctl.advance(399);
        assert_eq!(ctl.ports().media.resumes, 0);
        ctl.advance(400);
        assert_eq!(ctl.ports().media.resumes, 1);
        assert!(!ctl.status().media_paused_by_shell);
    }

    #[test]
    fn test_reveal_while_visible_has_no_side_effects() {
        let config = ModeConfig {
            multi_enter_threshold: 1,
            ..ModeConfig::default()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);
        assert_eq!(ctl.ports().window.count("show"), 1);
        assert_eq!(ctl.ports().window.count("focus"), 1);

        move_and_tick(&mut ctl, true, 100);
        ctl.handle(ShellEvent::MiddleButtonPressed, 150);
        ctl.tick(1200);

        assert_eq!(ctl.ports().window.count("show"), 1);
        assert_eq!(ctl.ports().window.count("focus"), 1);
        assert!(ctl.ports().surface.calls.is_empty());
    }

    #[test]
    fn test_pinned_window_never_hides() {
        let config = ModeConfig {
            is_window_pinned: true,
            ..hidden_config()
        };
        let mut ctl = controller(config, true);
        ctl.start(0);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        assert!(ctl.status().pinned);

        move_and_tick(&mut ctl, false, 100);
        assert!(!ctl.status().hide_pending);
        ctl.tick(60_000);
        assert_eq!(ctl.status().visibility, Visibility::Visible);

        ctl.handle(ShellEvent::SetPinned(false), 61_000);
        assert!(ctl.status().hide_pending);
        ctl.advance(62_000);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
    }

    #[test]
    fn test_keyboard_mode_switch_clears_mouse_timers() {
        let mut ctl = controller(hidden_config(), false);
        ctl.start(0);
        move_and_tick(&mut ctl, true, 50);
        ctl.handle(ShellEvent::MiddleButtonPressed, 60);
        assert_eq!(ctl.status().capture, Some(CaptureMode::Capturing));
        assert!(ctl.next_deadline().is_some());

        let keyboard = ModeConfig {
            keyboard_mode_enabled: true,
            ..hidden_config()
        };
        ctl.handle(ShellEvent::ConfigReloaded(keyboard), 100);

        let status = ctl.status();
        assert!(status.keyboard_mode);
        assert_eq!(status.enter_count, 0);
        assert!(!status.hold_in_flight);
        assert_eq!(status.capture, None);
        assert_eq!(
            ctl.ports().surface.calls.last().map(String::as_str),
            Some("destroy")
        );
        assert_eq!(ctl.next_deadline(), None);

        ctl.advance(5000);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
    }

    #[test]
    fn test_back_to_mouse_mode_outside_schedules_hide() {
        let config = ModeConfig {
            keyboard_mode_enabled: true,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);
        ctl.handle(ShellEvent::ShortcutPressed, 0);
        assert_eq!(ctl.status().visibility, Visibility::Visible);

        ctl.handle(ShellEvent::ConfigReloaded(hidden_config()), 100);
        assert!(ctl.status().hide_pending);
        ctl.advance(1100);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
        assert_eq!(ctl.ports().surface.count("create"), 1);
        assert_eq!(ctl.status().capture, Some(CaptureMode::PassThrough));
    }

    #[test]
    fn test_keyboard_mode_hides_without_capture_surface() {
        let keyboard = ModeConfig {
            keyboard_mode_enabled: true,
            ..hidden_config()
        };
        let mut ctl = controller(keyboard, true);
        ctl.start(0);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);

        ctl.handle(ShellEvent::ShortcutPressed, 100);
        ctl.handle(ShellEvent::ShortcutPressed, 200);
        assert_eq!(ctl.ports().window.count("hide"), 2);
        assert_eq!(ctl.ports().surface.count("create"), 0);
        assert_eq!(ctl.status().capture, None);

        // back to mouse mode while hidden: the gestures need the surface again
        ctl.handle(ShellEvent::ConfigReloaded(hidden_config()), 300);
        assert_eq!(ctl.ports().surface.count("create"), 1);
        assert_eq!(ctl.status().capture, Some(CaptureMode::Capturing));

        ctl.handle(ShellEvent::MiddleButtonPressed, 400);
        ctl.advance(1400);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
    }

    #[test]
    fn test_shortcut_ignored_outside_keyboard_mode() {
        let mut ctl = controller(hidden_config(), false);
        ctl.start(0);
        ctl.handle(ShellEvent::ShortcutPressed, 10);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
    }

    #[test]
    fn test_window_gone_drops_transition() {
        let mut ctl = controller(hidden_config(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::MiddleButtonPressed, 0);
        ctl.ports_mut().window.gone = true;

        ctl.advance(1000);
        let status = ctl.status();
        assert!(!status.window_alive);
        assert_eq!(status.visibility, Visibility::Hidden);
        assert_eq!(status.capture, None);
        assert_eq!(
            ctl.ports().surface.calls.last().map(String::as_str),
            Some("destroy")
        );

        ctl.tick(2000);
        assert_eq!(ctl.next_deadline(), None);

        ctl.ports_mut().window.gone = false;
        ctl.handle(ShellEvent::MiddleButtonPressed, 3000);
        ctl.advance(5000);
        assert!(!ctl.status().window_alive);
        assert_eq!(ctl.ports().window.count("show"), 0);
    }

    #[test]
    fn test_minimize_conceals_and_engages_capture() {
        let mut ctl = controller(ModeConfig::default(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::MinimizeRequested, 100);

        assert_eq!(ctl.ports().window.count("minimize"), 1);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);
        assert_eq!(ctl.status().capture, Some(CaptureMode::Capturing));
        // the startup indication no longer matters once hidden
        assert_eq!(ctl.next_deadline(), None);
    }

    #[test]
    fn test_parked_bounds_while_minimized_are_ignored() {
        let config = ModeConfig {
            multi_enter_threshold: 1,
            ..ModeConfig::default()
        };
        let mut ctl = controller(config, true);
        ctl.start(0);
        ctl.handle(ShellEvent::MinimizeRequested, 100);
        let parked = WindowBounds {
            x: -32000,
            y: -32000,
            width: 160,
            height: 28,
        };
        ctl.handle(ShellEvent::BoundsChanged(parked), 110);
        assert!(!ctl.ports().surface.calls.iter().any(|c| c.contains("-32000")));

        move_and_tick(&mut ctl, false, 300);
        move_and_tick(&mut ctl, true, 450);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        assert_eq!(ctl.ports().window.count("show"), 2);

        // restored: moves are tracked again
        let moved = WindowBounds { x: 40, ..BOUNDS };
        ctl.handle(ShellEvent::BoundsChanged(moved), 500);
        assert!(ctl.ports().surface.calls.iter().any(|c| c == "bounds 40,0"));
    }

    #[test]
    fn test_restore_from_minimize_rereads_bounds() {
        let mut ctl = controller(ModeConfig::default(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::MinimizeRequested, 100);
        ctl.ports_mut().window.bounds = WindowBounds { x: 300, ..BOUNDS };

        ctl.handle(ShellEvent::MiddleButtonPressed, 200);
        ctl.advance(1200);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        assert!(ctl.ports().surface.calls.iter().any(|c| c == "bounds 300,0"));
    }

    #[test]
    fn test_close_tears_everything_down() {
        let mut ctl = controller(hidden_config(), false);
        ctl.start(0);
        ctl.handle(ShellEvent::CloseRequested, 100);

        assert_eq!(ctl.ports().window.count("close"), 1);
        assert!(ctl.ports().surface.calls.iter().any(|c| c == "destroy"));
        assert!(!ctl.status().window_alive);
    }

    #[test]
    fn test_bounds_are_mirrored_to_capture_surface() {
        let mut ctl = controller(hidden_config(), false);
        ctl.start(0);
        let moved = WindowBounds { x: 40, ..BOUNDS };
        ctl.handle(ShellEvent::BoundsChanged(moved), 10);
        ctl.handle(ShellEvent::BoundsChanged(moved), 20);

        let mirrored: Vec<_> = ctl
            .ports()
            .surface
            .calls
            .iter()
            .filter(|c| c.starts_with("bounds"))
            .collect();
        assert_eq!(mirrored, vec!["bounds 40,0"]);
    }

    #[test]
    fn test_capture_surface_recreated_after_external_destroy() {
        let config = ModeConfig {
            multi_enter_threshold: 1,
            ..hidden_config()
        };
        let mut ctl = controller(config, false);
        ctl.start(0);
        ctl.handle(ShellEvent::CaptureSurfaceDestroyed, 10);
        assert_eq!(ctl.status().capture, None);

        move_and_tick(&mut ctl, true, 30);
        assert_eq!(ctl.status().visibility, Visibility::Visible);
        move_and_tick(&mut ctl, false, 600);
        ctl.advance(1600);
        assert_eq!(ctl.status().visibility, Visibility::Hidden);

        let creates = ctl
            .ports()
            .surface
            .calls
            .iter()
            .filter(|c| *c == "create")
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn test_content_fullscreen_toggles_chrome() {
        let mut ctl = controller(ModeConfig::default(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::ContentFullscreenChanged(true), 10);
        assert_eq!(ctl.ports().window.chrome, Some(false));
        ctl.handle(ShellEvent::ContentFullscreenChanged(false), 20);
        assert_eq!(ctl.ports().window.chrome, Some(true));

        ctl.handle(ShellEvent::RequestFullscreen, 30);
        assert_eq!(ctl.ports().media.fullscreen_requests, 1);
    }

    #[test]
    fn test_shutdown_stops_processing() {
        let mut ctl = controller(hidden_config(), true);
        ctl.start(0);
        ctl.handle(ShellEvent::MiddleButtonPressed, 0);
        ctl.handle(ShellEvent::Shutdown, 10);

        assert!(ctl.is_stopped());
        assert_eq!(ctl.next_deadline(), None);
        assert_eq!(ctl.status().capture, None);

        ctl.tick(2000);
        ctl.handle(ShellEvent::MiddleButtonPressed, 2100);
        ctl.advance(5000);
        assert_eq!(ctl.ports().window.count("show"), 0);
    }
}
