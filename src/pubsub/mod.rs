//! Timer-driven publication of snapshots to subscribers.

pub mod hub;
pub mod subscribers;
pub mod ticker;

pub use hub::{Hub, SchedulerState, Subscription};
pub use subscribers::{SnapshotCallback, SubscriptionId};
pub use ticker::{ManualTicker, Ticker, TimerHandle, TokioTicker};
