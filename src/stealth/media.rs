use super::host::MediaControl;
use super::timer::TimerSlot;
use super::types::Millis;

/// Delay between the window reappearing and the resume attempt, so playback does not start
/// before the content has repainted.
pub const RESUME_SETTLE_MS: Millis = 300;

/// Pauses embedded media when the window hides and resumes it when the window comes back, but
/// only media this coordinator paused itself.
#[derive(Debug)]
pub struct MediaCoordinator {
    enabled: bool,
    paused_by_shell: bool,
    resume_timer: TimerSlot,
}

impl MediaCoordinator {
    pub fn new(auto_pause_on_hide: bool) -> Self {
        Self {
            enabled: auto_pause_on_hide,
            paused_by_shell: false,
            resume_timer: TimerSlot::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn paused_by_shell(&self) -> bool {
        self.paused_by_shell
    }

    pub fn resume_deadline(&self) -> Option<Millis> {
        self.resume_timer.deadline()
    }

    pub fn on_concealed(&mut self, media: &mut dyn MediaControl) {
        // Hidden again before the settle delay ran out: the media is still ours to resume later.
        self.resume_timer.cancel();

        if !self.enabled || self.paused_by_shell {
            return;
        }

        match media.is_playing() {
            Ok(true) => match media.pause() {
                Ok(()) => {
                    self.paused_by_shell = true;
                    log::debug!("Media paused on hide");
                }
                Err(err) => log::warn!("Media pause failed: {}", err),
            },
            Ok(false) => {}
            Err(err) => log::debug!("Media state unavailable on hide: {}", err),
        }
    }

    pub fn on_revealed(&mut self, now: Millis) {
        if self.paused_by_shell {
            self.resume_timer.start(now, RESUME_SETTLE_MS);
        }
    }

    /// Fire the deferred resume. The flag is cleared by the attempt, whatever its outcome.
    pub fn fire_resume_if_due(&mut self, now: Millis, media: &mut dyn MediaControl) -> bool {
        if !self.resume_timer.take_if_due(now) {
            return false;
        }
        if !self.paused_by_shell {
            return false;
        }
        self.paused_by_shell = false;
        match media.resume() {
            Ok(()) => log::debug!("Media resumed on show"),
            Err(err) => log::warn!("Media resume failed: {}", err),
        }
        true
    }

    /// Window closed: nothing left to resume.
    pub fn teardown(&mut self) {
        self.resume_timer.cancel();
        self.paused_by_shell = false;
    }
}
