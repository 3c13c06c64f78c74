/// Fixed-period scheduling and the per-tick pipeline.
///
/// A [`TickTimer`] produces ticks on a background thread; a [`TickDriver`]
/// turns each tick into cloud motion, drop motion, explosion animation and
/// one render of the resulting [`Snapshot`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::compute::{advance_drops, CloudEvent, CloudMotion, Impact};
use crate::config::FieldConfig;
use crate::entities::{Cloud, Explosion, GameStatus, Scenery, SessionStats, WaterDrop};
use crate::registry::{EntityId, Registry};
use crate::state::GameState;

// ── Render sink ───────────────────────────────────────────────────────────────

/// Read-only view of the world handed to the renderer once per tick.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub field: &'a FieldConfig,
    pub scenery: &'a Scenery,
    pub cloud: &'a Cloud,
    pub drops: &'a Registry<WaterDrop>,
    pub explosions: &'a Registry<Explosion>,
    pub drops_left: u32,
    pub max_drops: u32,
    pub pass: u32,
    pub stats: SessionStats,
    pub status: GameStatus,
    pub won: bool,
    pub lost: bool,
    pub paused: bool,
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a GameState) -> Self {
        Self {
            field: &state.field,
            scenery: state.scenery(),
            cloud: state.cloud(),
            drops: state.drops(),
            explosions: state.explosions(),
            drops_left: state.drops_left(),
            max_drops: state.max_drops(),
            pass: state.pass(),
            stats: state.stats(),
            status: state.status(),
            won: state.is_won(),
            lost: state.is_lost(),
            paused: state.is_paused(),
        }
    }
}

/// Fire-and-forget consumer of snapshots. The renderer never computes physics.
pub trait RenderSink {
    fn render(&mut self, snapshot: &Snapshot<'_>);
}

impl<F> RenderSink for F
where
    F: FnMut(&Snapshot<'_>),
{
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}

// ── Tick driver ───────────────────────────────────────────────────────────────

/// What one tick did, for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub elapsed: Duration,
    pub cloud: CloudEvent,
    pub impacts: Vec<(EntityId, Impact)>,
}

#[derive(Debug)]
pub struct TickDriver {
    cloud: CloudMotion,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl TickDriver {
    pub fn new(state: &GameState) -> Self {
        Self {
            cloud: CloudMotion::new(state),
            last_tick: None,
            ticks: 0,
        }
    }

    /// Starts from a given cloud position instead of the left edge.
    pub fn with_cloud(cloud: CloudMotion) -> Self {
        Self {
            cloud,
            last_tick: None,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cloud_motion(&self) -> &CloudMotion {
        &self.cloud
    }

    /// Runs one tick at wall-clock `now`. The cloud moves by the time since
    /// the previous tick (zero on the first); drops use their own clocks.
    /// Rendering happens even while paused so the last frame stays visible.
    pub fn tick(
        &mut self,
        state: &mut GameState,
        now: Instant,
        sink: &mut dyn RenderSink,
    ) -> TickReport {
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);
        self.ticks += 1;

        let cloud = self.cloud.advance(elapsed.as_secs_f32() * 1000.0, state);
        let impacts = advance_drops(state, now);
        if !state.is_paused() {
            state.advance_explosions();
        }
        sink.render(&Snapshot::of(state));

        if cloud == CloudEvent::Crashed {
            debug!(tick = self.ticks, "session lost");
        }
        TickReport {
            elapsed,
            cloud,
            impacts,
        }
    }
}

// ── Tick timer ────────────────────────────────────────────────────────────────

/// Scoped periodic timer. Ticks go through a rendezvous channel, so a tick is
/// delivered only while the consumer is blocked in [`TickTimer::recv_timeout`].
/// A tick that fires while the previous one is still being processed is
/// dropped, never queued. Dropping the timer stops and joins its thread.
#[derive(Debug)]
pub struct TickTimer {
    rx: Receiver<Instant>,
    stop: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl TickTimer {
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::sync_channel::<Instant>(0);
        let stop = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicU64::new(0));

        let thread_stop = Arc::clone(&stop);
        let thread_dropped = Arc::clone(&dropped);
        let handle = thread::spawn(move || {
            let mut next = Instant::now() + period;
            while !thread_stop.load(Ordering::Acquire) {
                let now = Instant::now();
                if now < next {
                    thread::sleep(next - now);
                    continue;
                }
                next += period;
                match tx.try_send(Instant::now()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        thread_dropped.fetch_add(1, Ordering::Relaxed);
                        trace!("tick dropped, consumer busy");
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
        });

        Self {
            rx,
            stop,
            dropped,
            handle: Some(handle),
        }
    }

    /// Waits up to `timeout` for the next tick.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Instant> {
        match self.rx.recv_timeout(timeout) {
            Ok(at) => Some(at),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Never blocks. Ticks are not buffered, so this only yields one when a
    /// tick is being handed over at this very moment.
    pub fn try_recv(&self) -> Option<Instant> {
        self.rx.try_recv().ok()
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
