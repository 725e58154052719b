//! Repeating tick sources that drive the scheduler.
//!
//! [`TokioTicker`] is the production timer. [`ManualTicker`] fires only when
//! asked to, which lets the scheduler's state machine be exercised without
//! real time passing.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{EngineError, Result};

/// Callback invoked on every firing.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Starts repeating timers.
pub trait Ticker: Send + Sync + 'static {
    /// Starts invoking `on_tick` every `period`, first firing one period from now.
    ///
    /// The timer runs until the returned handle is cancelled or dropped.
    fn start(&self, period: Duration, on_tick: TickFn) -> TimerHandle;
}

/// Owner of a running timer. Cancelling or dropping it stops the timer.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wraps the action that stops the timer.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops the timer.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Tokio-backed interval timer.
///
/// Each timer is a spawned task looping on `tokio::time::interval_at`;
/// cancelling aborts the task. Late ticks are delayed, never burst.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    handle: Handle,
}

impl TokioTicker {
    /// Spawns timers on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawns timers on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| EngineError::NoRuntime)
    }
}

impl Ticker for TokioTicker {
    fn start(&self, period: Duration, on_tick: TickFn) -> TimerHandle {
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        TimerHandle::new(move || task.abort())
    }
}

#[derive(Default)]
struct ManualState {
    running: Option<(u64, TickFn)>,
    period: Option<Duration>,
    generation: u64,
    starts: usize,
}

/// Timer that fires only when [`ManualTicker::fire`] is called.
///
/// Clones share state, so a test can keep one clone and hand the other to
/// the scheduler.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// use energy_telemetry::pubsub::ticker::{ManualTicker, Ticker};
///
/// let ticker = ManualTicker::new();
/// let count = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&count);
/// let handle = ticker.start(Duration::from_secs(2), Arc::new(move || {
///     c.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// assert!(ticker.fire());
/// handle.cancel();
/// assert!(!ticker.fire());
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualTicker {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a timer is currently started and not cancelled.
    pub fn is_running(&self) -> bool {
        self.inner.lock().running.is_some()
    }

    /// Period requested by the most recent start.
    pub fn period(&self) -> Option<Duration> {
        self.inner.lock().period
    }

    /// Number of times a timer has been started.
    pub fn starts(&self) -> usize {
        self.inner.lock().starts
    }

    /// Fires the running timer once. Returns `false` when no timer is running.
    ///
    /// The callback runs without the internal lock held, so it may cancel or
    /// restart the timer.
    pub fn fire(&self) -> bool {
        let on_tick = self
            .inner
            .lock()
            .running
            .as_ref()
            .map(|(_, f)| Arc::clone(f));
        match on_tick {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    /// Fires up to `n` times, stopping early if the timer is cancelled. Returns the number fired.
    pub fn fire_n(&self, n: usize) -> usize {
        (0..n).take_while(|_| self.fire()).count()
    }
}

impl Ticker for ManualTicker {
    fn start(&self, period: Duration, on_tick: TickFn) -> TimerHandle {
        let generation = {
            let mut state = self.inner.lock();
            state.generation += 1;
            state.starts += 1;
            state.period = Some(period);
            state.running = Some((state.generation, on_tick));
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        TimerHandle::new(move || {
            let mut state = inner.lock();
            if matches!(state.running, Some((g, _)) if g == generation) {
                state.running = None;
            }
        })
    }
}

impl std::fmt::Debug for ManualTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTicker")
            .field("running", &self.is_running())
            .field("starts", &self.starts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn manual_ticker_fires_until_cancelled() {
        let ticker = ManualTicker::new();
        let (count, f) = counter();
        let handle = ticker.start(Duration::from_millis(10), f);
        assert_eq!(ticker.fire_n(3), 3);
        handle.cancel();
        assert_eq!(ticker.fire_n(3), 0);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dropping_handle_cancels() {
        let ticker = ManualTicker::new();
        let (_, f) = counter();
        drop(ticker.start(Duration::from_millis(10), f));
        assert!(!ticker.is_running());
    }

    #[test]
    fn stale_handle_does_not_cancel_newer_timer() {
        let ticker = ManualTicker::new();
        let (_, f1) = counter();
        let (count2, f2) = counter();
        let old = ticker.start(Duration::from_millis(10), f1);
        let _new = ticker.start(Duration::from_millis(20), f2);
        old.cancel();
        assert!(ticker.is_running());
        assert!(ticker.fire());
        assert_eq!(count2.load(Ordering::SeqCst), 1);
        assert_eq!(ticker.starts(), 2);
        assert_eq!(ticker.period(), Some(Duration::from_millis(20)));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_skips_immediate_tick() {
        let ticker = TokioTicker::current().unwrap();
        let (count, f) = counter();
        let handle = ticker.start(Duration::from_secs(2), f);

        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(4200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn tokio_ticker_requires_runtime() {
        assert!(matches!(TokioTicker::current(), Err(EngineError::NoRuntime)));
    }
}
