use super::types::Millis;

/// A single-slot cancellable scheduled action.
///
/// Starting the slot replaces whatever deadline it held, so two timers of the same kind can
/// never overlap. The owner polls [`TimerSlot::take_if_due`] with the current time; a due slot
/// is cleared as it fires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Millis>,
}

impl TimerSlot {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    pub fn start(&mut self, now: Millis, delay_ms: Millis) {
        self.deadline = Some(now.saturating_add(delay_ms));
    }

    /// Returns whether a pending deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    pub fn take_if_due(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest<I>(deadlines: I) -> Option<Millis>
where
    I: IntoIterator<Item = Option<Millis>>,
{
    deadlines.into_iter().flatten().min()
}
