use super::types::{CursorPoint, Edge, WindowBounds};

/// Fixed sampling cadence. Short enough that a dwell of a few hundred ms is always seen.
pub const SAMPLE_INTERVAL_MS: u64 = 150;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleOutcome {
    pub edge: Option<Edge>,
    /// Set together with `Entered` when a hide debounce was pending at the time of the tick.
    pub cancel_pending_hide: bool,
}

/// Turns raw cursor positions into `entered`/`left` edges against the tracked bounds.
///
/// This is the only writer of the pointer containment flag.
#[derive(Debug, Default)]
pub struct RegionSampler {
    inside: bool,
}

impl RegionSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Seed containment without producing an edge.
    pub fn prime(&mut self, cursor: Option<CursorPoint>, bounds: Option<WindowBounds>) {
        if let (Some(cursor), Some(bounds)) = (cursor, bounds) {
            self.inside = bounds.contains(cursor);
        }
    }

    pub fn reset(&mut self) {
        self.inside = false;
    }

    /// One sampling tick. A missing cursor or window (destroyed mid-tick) is a no-op.
    pub fn sample(
        &mut self,
        cursor: Option<CursorPoint>,
        bounds: Option<WindowBounds>,
        hide_pending: bool,
    ) -> SampleOutcome {
        let (Some(cursor), Some(bounds)) = (cursor, bounds) else {
            return SampleOutcome::default();
        };

        let inside = bounds.contains(cursor);
        if inside == self.inside {
            return SampleOutcome::default();
        }
        self.inside = inside;

        if inside {
            log::trace!("Region sampler: entered ({}, {})", cursor.x, cursor.y);
            SampleOutcome {
                edge: Some(Edge::Entered),
                cancel_pending_hide: hide_pending,
            }
        } else {
            log::trace!("Region sampler: left ({}, {})", cursor.x, cursor.y);
            SampleOutcome {
                edge: Some(Edge::Left),
                cancel_pending_hide: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: WindowBounds = WindowBounds {
        x: 0,
        y: 0,
        width: 100,
        height: 100,
    };

    fn at(x: i32, y: i32) -> Option<CursorPoint> {
        Some(CursorPoint::new(x, y))
    }

    #[test]
    fn test_edges_only_on_transitions() {
        let mut sampler = RegionSampler::new();
        assert_eq!(sampler.sample(at(200, 200), Some(BOUNDS), false).edge, None);
        assert_eq!(
            sampler.sample(at(50, 50), Some(BOUNDS), false).edge,
            Some(Edge::Entered)
        );
        assert_eq!(sampler.sample(at(60, 60), Some(BOUNDS), false).edge, None);
        assert_eq!(
            sampler.sample(at(101, 60), Some(BOUNDS), false).edge,
            Some(Edge::Left)
        );
        assert!(!sampler.is_inside());
    }

    #[test]
    fn test_cancel_pending_hide_rides_on_entered() {
        let mut sampler = RegionSampler::new();
        let out = sampler.sample(at(10, 10), Some(BOUNDS), true);
        assert_eq!(out.edge, Some(Edge::Entered));
        assert!(out.cancel_pending_hide);

        let out = sampler.sample(at(500, 10), Some(BOUNDS), true);
        assert_eq!(out.edge, Some(Edge::Left));
        assert!(!out.cancel_pending_hide);
    }

    #[test]
    fn test_missing_window_is_noop() {
        let mut sampler = RegionSampler::new();
        sampler.sample(at(10, 10), Some(BOUNDS), false);
        let out = sampler.sample(at(500, 500), None, false);
        assert_eq!(out, SampleOutcome::default());
        assert!(sampler.is_inside());
        assert_eq!(sampler.sample(None, Some(BOUNDS), false), SampleOutcome::default());
    }

    #[test]
    fn test_prime_does_not_emit() {
        let mut sampler = RegionSampler::new();
        sampler.prime(at(10, 10), Some(BOUNDS));
        assert!(sampler.is_inside());
        assert_eq!(sampler.sample(at(20, 20), Some(BOUNDS), false).edge, None);
    }
}
