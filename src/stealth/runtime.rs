use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::controller::{ShellEvent, ShellStatus, StealthController};
use super::host::{CaptureSurface, CursorSource, MediaControl, OverlayWindow};
use super::sampler::SAMPLE_INTERVAL_MS;
use super::types::Millis;

pub type StatusListener = Box<dyn Fn(&ShellStatus) + Send + Sync>;

/// Cloneable front for the driver task: send events, read the last published status.
#[derive(Clone)]
pub struct ShellHandle {
    tx: mpsc::UnboundedSender<ShellEvent>,
    status: Arc<ArcSwap<ShellStatus>>,
    pinned: Arc<AtomicBool>,
}

impl ShellHandle {
    pub fn send(&self, event: ShellEvent) -> Result<(), String> {
        let pin = match &event {
            ShellEvent::SetPinned(pinned) => Some(*pinned),
            _ => None,
        };
        self.tx
            .send(event)
            .map_err(|_| "Stealth driver is not running".to_string())?;
        if let Some(pinned) = pin {
            self.pinned.store(pinned, Ordering::SeqCst);
        }
        Ok(())
    }

    pub fn status(&self) -> Arc<ShellStatus> {
        self.status.load_full()
    }

    /// Pin state as of the last accepted `SetPinned`, even before the driver has applied it.
    pub fn pin_state(&self) -> bool {
        self.pinned.load(Ordering::SeqCst)
    }
}

/// Owns the controller on a single task. Sampler ticks, timer deadlines and inbound events are
/// serialized through one `select!` loop, so the controller itself needs no locking.
pub struct ShellDriver<W, S, M, C> {
    controller: StealthController<W, S, M, C>,
    rx: mpsc::UnboundedReceiver<ShellEvent>,
    status: Arc<ArcSwap<ShellStatus>>,
    listener: Option<StatusListener>,
    epoch: Instant,
}

impl<W, S, M, C> ShellDriver<W, S, M, C>
where
    W: OverlayWindow,
    S: CaptureSurface,
    M: MediaControl,
    C: CursorSource,
{
    pub fn new(controller: StealthController<W, S, M, C>) -> (Self, ShellHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let initial = controller.status();
        let pinned = Arc::new(AtomicBool::new(initial.pinned));
        let status = Arc::new(ArcSwap::from_pointee(initial));
        let handle = ShellHandle {
            tx,
            status: status.clone(),
            pinned,
        };
        let driver = Self {
            controller,
            rx,
            status,
            listener: None,
            epoch: Instant::now(),
        };
        (driver, handle)
    }

    /// Called with every status that differs from the previous one.
    pub fn on_status(mut self, listener: impl Fn(&ShellStatus) + Send + Sync + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Runs until `Shutdown` arrives or every handle is dropped. Returns the controller so the
    /// caller can inspect or reuse the ports.
    pub async fn run(mut self) -> StealthController<W, S, M, C> {
        self.epoch = Instant::now();
        self.controller.start(0);
        self.publish();

        log::info!(
            "Stealth driver started (sample interval={}ms)",
            SAMPLE_INTERVAL_MS
        );

        let mut ticker = tokio::time::interval(Duration::from_millis(SAMPLE_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self
                .controller
                .next_deadline()
                .map(|ms| self.epoch + Duration::from_millis(ms));

            tokio::select! {
                _ = ticker.tick() => {
                    let now = self.now();
                    self.controller.tick(now);
                }
                _ = sleep_until(deadline) => {
                    let now = self.now();
                    self.controller.advance(now);
                }
                event = self.rx.recv() => {
                    let now = self.now();
                    match event {
                        Some(event) => self.controller.handle(event, now),
                        None => self.controller.shutdown(),
                    }
                }
            }

            self.publish();
            if self.controller.is_stopped() {
                break;
            }
        }

        log::info!("Stealth driver stopped");
        self.controller
    }

    fn now(&self) -> Millis {
        self.epoch.elapsed().as_millis() as Millis
    }

    fn publish(&self) {
        let status = self.controller.status();
        if **self.status.load() == status {
            return;
        }
        if let Some(listener) = &self.listener {
            listener(&status);
        }
        self.status.store(Arc::new(status));
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
