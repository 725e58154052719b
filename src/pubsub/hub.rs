//! Publish/subscribe scheduler with an explicit Idle/Active state machine.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::devices::DeviceRegistry;
use crate::error::{EngineError, Result};
use crate::sim::engine::TelemetryEngine;
use crate::sim::history::{HistoryPoint, Period};
use crate::sim::types::Snapshot;

use super::subscribers::{SnapshotCallback, SubscriberRegistry, SubscriptionId};
use super::ticker::{Ticker, TimerHandle, TokioTicker};

/// Snapshots buffered per channel subscriber before new ones are dropped.
pub const CHANNEL_CAPACITY: usize = 16;

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No subscribers, no timer.
    Idle,
    /// Timer running, at least one subscriber.
    Active,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Active => f.write_str("active"),
        }
    }
}

struct HubState<R: Rng> {
    phase: SchedulerState,
    engine: TelemetryEngine<R>,
    subscribers: SubscriberRegistry,
    timer: Option<TimerHandle>,
    /// Bumped on every Idle to Active transition; firings from older timers are ignored.
    generation: u64,
    ticks: u64,
}

struct Shared<R: Rng> {
    state: Mutex<HubState<R>>,
    ticker: Box<dyn Ticker>,
    period: Duration,
}

/// Removal side of a registration, erased over the engine's RNG type.
trait Unsubscribe: Send + Sync {
    fn remove(&self, id: SubscriptionId) -> bool;
}

/// Handle returned by [`Hub::subscribe`].
///
/// Dropping the handle leaves the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription keeps the callback registered"]
pub struct Subscription {
    id: SubscriptionId,
    hub: Weak<dyn Unsubscribe>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes this registration. Returns `false` if it was already removed
    /// or the hub no longer exists.
    pub fn unsubscribe(self) -> bool {
        self.hub.upgrade().is_some_and(|hub| hub.remove(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Owns the tick timer and fans snapshots out to subscribers.
///
/// The timer runs only while at least one subscriber is registered: the
/// first subscription moves the hub from Idle to Active and starts the
/// timer, removing the last one cancels it and returns to Idle. Each firing
/// builds one snapshot and delivers the same `Arc<Snapshot>` to every
/// subscriber in registration order. Clones share the same hub.
pub struct Hub<R: Rng + Send + 'static = StdRng> {
    shared: Arc<Shared<R>>,
}

impl<R: Rng + Send + 'static> Clone for Hub<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Hub<StdRng> {
    /// Builds a hub from configuration, driven by a tokio timer on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns a configuration or registry error, or [`EngineError::NoRuntime`]
    /// when called outside a tokio runtime.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let engine = TelemetryEngine::from_config(config)?;
        Self::new(engine, TokioTicker::current()?, config.tick_period())
    }
}

impl<R: Rng + Send + 'static> Hub<R> {
    /// Creates an idle hub.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTickPeriod`] if `period` is zero.
    pub fn new(engine: TelemetryEngine<R>, ticker: impl Ticker, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(EngineError::InvalidTickPeriod);
        }
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(HubState {
                    phase: SchedulerState::Idle,
                    engine,
                    subscribers: SubscriberRegistry::default(),
                    timer: None,
                    generation: 0,
                    ticks: 0,
                }),
                ticker: Box::new(ticker),
                period,
            }),
        })
    }

    /// Registers `callback` for every subsequent tick.
    ///
    /// Starts the timer when the hub is Idle. Nothing is delivered until the
    /// next firing; missed ticks are never replayed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Arc<Snapshot>) + Send + Sync + 'static,
    {
        let callback: SnapshotCallback = Arc::new(callback);
        let id = {
            let mut state = self.shared.state.lock();
            let id = state.subscribers.insert(callback);
            if state.phase == SchedulerState::Idle {
                state.phase = SchedulerState::Active;
                state.generation += 1;
                state.timer = Some(self.start_timer(state.generation));
                info!(period_ms = self.shared.period.as_millis() as u64, "scheduler active");
            }
            debug!(subscription = %id, subscribers = state.subscribers.len(), "subscribed");
            id
        };

        let hub: Arc<dyn Unsubscribe> = self.shared.clone();
        Subscription {
            id,
            hub: Arc::downgrade(&hub),
        }
    }

    /// Registers a bounded channel receiver instead of a callback.
    ///
    /// Up to [`CHANNEL_CAPACITY`] snapshots are buffered; while the buffer is
    /// full, new snapshots are dropped for this receiver without blocking the
    /// tick. Dropping the receiver removes the registration on the next tick.
    pub fn subscribe_channel(&self) -> (Subscription, mpsc::Receiver<Arc<Snapshot>>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let own_id = Arc::new(OnceLock::new());
        let slot = Arc::clone(&own_id);
        let weak = Arc::downgrade(&self.shared);

        let subscription = self.subscribe(move |snapshot| match tx.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("channel subscriber lagging; snapshot dropped"),
            Err(TrySendError::Closed(_)) => {
                if let (Some(shared), Some(id)) = (weak.upgrade(), slot.get()) {
                    debug!(subscription = %id, "receiver dropped");
                    shared.remove(*id);
                }
            }
        });
        let _ = own_id.set(subscription.id());
        (subscription, rx)
    }

    /// Removes a registration by id. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.remove(id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.shared.state.lock().phase
    }

    /// Number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().subscribers.len()
    }

    /// Number of snapshots published since creation.
    pub fn tick_count(&self) -> u64 {
        self.shared.state.lock().ticks
    }

    /// Configured tick period.
    pub fn period(&self) -> Duration {
        self.shared.period
    }

    /// Clone of the device registry the engine samples.
    pub fn registry(&self) -> DeviceRegistry {
        self.shared.state.lock().engine.registry().clone()
    }

    /// Runs one tick immediately, outside the timer.
    ///
    /// Returns the published snapshot, or `None` when the hub is Idle.
    pub fn publish_now(&self) -> Option<Arc<Snapshot>> {
        self.shared.tick(None)
    }

    /// Generates an on-demand historical series; independent of subscriptions.
    pub fn generate_historical_data(&self, period: Period) -> Vec<HistoryPoint> {
        self.shared.state.lock().engine.historical(period)
    }

    fn start_timer(&self, generation: u64) -> TimerHandle {
        let weak = Arc::downgrade(&self.shared);
        self.shared.ticker.start(
            self.shared.period,
            Arc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick(Some(generation));
                }
            }),
        )
    }
}

impl<R: Rng + Send + 'static> Shared<R> {
    /// Builds one snapshot and delivers it to a copy of the subscriber set.
    ///
    /// `generation` identifies the timer that fired, `None` for a forced tick.
    /// A firing from a cancelled timer that was already running when the hub
    /// went Idle is discarded. The state lock is released before any callback runs.
    fn tick(&self, generation: Option<u64>) -> Option<Arc<Snapshot>> {
        let (snapshot, subscribers) = {
            let mut state = self.state.lock();
            if state.phase == SchedulerState::Idle {
                return None;
            }
            if generation.is_some_and(|g| g != state.generation) {
                debug!("stale timer firing ignored");
                return None;
            }
            let snapshot = Arc::new(state.engine.snapshot());
            state.ticks += 1;
            (snapshot, state.subscribers.to_vec())
        };

        debug!(subscribers = subscribers.len(), "publishing snapshot");
        for (id, callback) in subscribers {
            let delivery = Arc::clone(&snapshot);
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(delivery))) {
                warn!(
                    subscription = %id,
                    reason = panic_message(payload.as_ref()),
                    "subscriber panicked; continuing fan-out"
                );
            }
        }

        Some(snapshot)
    }
}

impl<R: Rng + Send + 'static> Unsubscribe for Shared<R> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let stopped = {
            let mut state = self.state.lock();
            if !state.subscribers.remove(id) {
                return false;
            }
            debug!(subscription = %id, subscribers = state.subscribers.len(), "unsubscribed");
            if state.subscribers.is_empty() && state.phase == SchedulerState::Active {
                state.phase = SchedulerState::Idle;
                state.timer.take()
            } else {
                None
            }
        };

        if let Some(timer) = stopped {
            timer.cancel();
            info!("scheduler idle");
        }
        true
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
