//! Producer lifecycle: idle parking, restart, stop latency.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use trainer::app::ports::ProducerControl;
use trainer::app::{Producer, StreamMode};
use trainer::shared::{ActuatorTarget, SensorReading, SharedState};

use super::mock_collaborators::wait_for;

fn counting(
    calls: &Arc<AtomicU64>,
) -> impl FnMut(SensorReading) -> anyhow::Result<SensorReading> + Send + 'static {
    let calls = Arc::clone(calls);
    move |previous| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(SensorReading(previous.0 + 2))
    }
}

fn hub() -> Arc<SharedState> {
    SharedState::shared(SensorReading(0), ActuatorTarget::HOLD)
}

#[test]
fn idle_producer_neither_publishes_nor_spins() {
    let calls = Arc::new(AtomicU64::new(0));
    let state = hub();
    let producer =
        Producer::spawn(Arc::clone(&state), counting(&calls), Duration::from_millis(1)).unwrap();

    std::thread::sleep(Duration::from_millis(100));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(state.sensor_reading(), SensorReading(0));
    let stats = producer.stats();
    assert_eq!(stats.ticks, 0);
    assert!(stats.cycles <= 1, "worker looped {} times while idle", stats.cycles);
}

#[test]
fn start_stop_start_resumes_ticking() {
    let calls = Arc::new(AtomicU64::new(0));
    let producer = Producer::spawn(hub(), counting(&calls), Duration::from_millis(1)).unwrap();

    producer.start();
    assert!(wait_for(|| producer.stats().ticks >= 2));
    producer.stop();
    assert_eq!(producer.mode(), StreamMode::Idle);

    // Let any in-flight tick drain, then confirm the count is frozen.
    std::thread::sleep(Duration::from_millis(20));
    let frozen = calls.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::SeqCst), frozen);

    producer.start();
    assert!(wait_for(|| calls.load(Ordering::SeqCst) >= frozen + 2));
    assert!(producer.is_streaming());
}

#[test]
fn each_tick_builds_on_the_previous_reading() {
    let calls = Arc::new(AtomicU64::new(0));
    let state = hub();
    let producer =
        Producer::spawn(Arc::clone(&state), counting(&calls), Duration::from_millis(1)).unwrap();

    producer.start();
    assert!(wait_for(|| producer.stats().ticks >= 3));
    producer.stop();
    std::thread::sleep(Duration::from_millis(20));

    let ticks = producer.stats().ticks as i64;
    assert_eq!(state.sensor_reading(), SensorReading(ticks * 2));
}

#[test]
fn handle_controls_the_worker() {
    let calls = Arc::new(AtomicU64::new(0));
    let producer = Producer::spawn(hub(), counting(&calls), Duration::from_secs(60)).unwrap();
    let handle = producer.handle();

    assert!(handle.start());
    assert_eq!(producer.mode(), StreamMode::Streaming);
    assert!(handle.stop());
    assert_eq!(producer.mode(), StreamMode::Idle);
    assert_eq!(handle.last_failure(), None);
}
