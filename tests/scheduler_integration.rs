//! Publish/subscribe lifecycle: Idle/Active transitions, fan-out, and fault isolation.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use energy_telemetry::devices::DeviceRegistry;
use energy_telemetry::pubsub::{Hub, SchedulerState, TokioTicker};
use energy_telemetry::sim::history::Period;
use energy_telemetry::sim::types::Snapshot;
use parking_lot::Mutex;

use common::{PERIOD, manual_hub, seeded_engine};

fn recorder(hub: &Hub) -> (Arc<Mutex<Vec<Arc<Snapshot>>>>, energy_telemetry::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = hub.subscribe(move |s: Arc<Snapshot>| sink.lock().push(s));
    (seen, sub)
}

#[test]
fn all_subscribers_receive_the_same_snapshot() {
    let (hub, ticker) = manual_hub(1);
    let (a, _sa) = recorder(&hub);
    let (b, _sb) = recorder(&hub);
    let (c, _sc) = recorder(&hub);

    assert_eq!(ticker.fire_n(3), 3);
    for i in 0..3 {
        let first = Arc::clone(&a.lock()[i]);
        assert!(Arc::ptr_eq(&first, &b.lock()[i]));
        assert!(Arc::ptr_eq(&first, &c.lock()[i]));
    }
    assert_eq!(hub.tick_count(), 3);
}

#[test]
fn delivery_follows_registration_order() {
    let (hub, ticker) = manual_hub(2);
    let order = Arc::new(Mutex::new(Vec::new()));
    let subs: Vec<_> = (0..4)
        .map(|n| {
            let order = Arc::clone(&order);
            hub.subscribe(move |_: Arc<Snapshot>| order.lock().push(n))
        })
        .collect();

    ticker.fire();
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    assert_eq!(subs.len(), 4);
}

#[test]
fn panicking_subscriber_does_not_block_others() {
    let (hub, ticker) = manual_hub(3);
    let (before, _s1) = recorder(&hub);
    let _boom = hub.subscribe(|_: Arc<Snapshot>| panic!("subscriber failure"));
    let (after, _s3) = recorder(&hub);

    assert_eq!(ticker.fire_n(2), 2);
    assert_eq!(before.lock().len(), 2);
    assert_eq!(after.lock().len(), 2);
    assert_eq!(hub.state(), SchedulerState::Active);
}

#[test]
fn last_unsubscribe_returns_to_idle() {
    let (hub, ticker) = manual_hub(4);
    let (seen_a, sa) = recorder(&hub);
    let (seen_b, sb) = recorder(&hub);
    ticker.fire();

    assert!(sa.unsubscribe());
    assert_eq!(hub.state(), SchedulerState::Active);
    ticker.fire();
    assert_eq!(seen_a.lock().len(), 1);
    assert_eq!(seen_b.lock().len(), 2);

    assert!(sb.unsubscribe());
    assert_eq!(hub.state(), SchedulerState::Idle);
    assert!(!ticker.is_running());
    assert!(!ticker.fire());
    assert_eq!(hub.tick_count(), 2);
}

#[test]
fn dropped_handle_keeps_registration() {
    let (hub, ticker) = manual_hub(5);
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    drop(hub.subscribe(move |_: Arc<Snapshot>| {
        c.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(hub.subscriber_count(), 1);
    ticker.fire();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn subscriber_can_unsubscribe_itself_during_fan_out() {
    let (hub, ticker) = manual_hub(6);
    let slot: Arc<Mutex<Option<energy_telemetry::Subscription>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let own = Arc::clone(&slot);
    let c = Arc::clone(&calls);
    let sub = hub.subscribe(move |_: Arc<Snapshot>| {
        c.fetch_add(1, Ordering::SeqCst);
        let taken = own.lock().take();
        if let Some(me) = taken {
            let _ = me.unsubscribe();
        }
    });
    *slot.lock() = Some(sub);

    ticker.fire();
    assert_eq!(hub.state(), SchedulerState::Idle);
    assert!(!ticker.fire());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn publish_now_is_noop_when_idle() {
    let (hub, _ticker) = manual_hub(7);
    assert!(hub.publish_now().is_none());
    let (seen, _s) = recorder(&hub);
    let published = hub.publish_now();
    assert!(published.is_some());
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn history_is_available_without_subscribers() {
    let (hub, _ticker) = manual_hub(8);
    let week = hub.generate_historical_data(Period::Week);
    assert_eq!(week.len(), 7);
    assert!(week.iter().all(|p| p.consumption >= 50.0));
    assert_eq!(hub.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn subscribe_then_unsubscribe_before_tick_delivers_nothing() {
    let hub = Hub::new(seeded_engine(9), TokioTicker::current().unwrap(), PERIOD).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let sub = hub.subscribe(move |_: Arc<Snapshot>| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(hub.state(), SchedulerState::Active);
    assert!(sub.unsubscribe());
    assert_eq!(hub.state(), SchedulerState::Idle);

    tokio::time::sleep(PERIOD * 5).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(hub.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_period_and_stop_after_last_unsubscribe() {
    let hub = Hub::new(seeded_engine(10), TokioTicker::current().unwrap(), PERIOD).unwrap();
    let (sub, mut rx) = hub.subscribe_channel();

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(rx.try_recv().is_err(), "no immediate tick on subscribe");

    for _ in 0..3 {
        let snapshot = rx.recv().await;
        assert!(snapshot.is_some_and(|s| s.readings.len() == 5));
    }
    assert_eq!(hub.tick_count(), 3);

    assert!(sub.unsubscribe());
    tokio::time::sleep(PERIOD * 10).await;
    assert_eq!(hub.tick_count(), 3);
    assert_eq!(hub.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn from_config_uses_configured_period() {
    let mut cfg = energy_telemetry::EngineConfig::office();
    cfg.engine.tick_ms = 500;
    cfg.engine.seed = Some(11);
    let hub = Hub::from_config(&cfg).unwrap();
    assert_eq!(hub.period(), Duration::from_millis(500));
    assert_eq!(hub.registry().len(), DeviceRegistry::default().len());

    let (sub, mut rx) = hub.subscribe_channel();
    tokio::time::sleep(Duration::from_millis(1_250)).await;
    let mut received = 0;
    while rx.try_recv().is_ok() {
        received += 1;
    }
    assert_eq!(received, 2);
    let _ = sub.unsubscribe();
}
