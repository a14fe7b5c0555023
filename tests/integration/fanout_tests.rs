//! Shared-state fan-out: snapshot semantics and concurrent publishers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use trainer::shared::{ActuatorTarget, Channel, SensorReading, SharedState};

fn hub() -> Arc<SharedState> {
    SharedState::shared(SensorReading(0), ActuatorTarget::HOLD)
}

#[test]
fn listener_added_mid_fanout_waits_for_next_publish() {
    let state = hub();
    let late_hits = Arc::new(AtomicUsize::new(0));
    let registered = Arc::new(AtomicBool::new(false));

    {
        let weak = Arc::downgrade(&state);
        let late_hits = Arc::clone(&late_hits);
        let registered = Arc::clone(&registered);
        state.register_sensor_listener(move || {
            if !registered.swap(true, Ordering::SeqCst) {
                let state = weak.upgrade().unwrap();
                let late_hits = Arc::clone(&late_hits);
                state.register_sensor_listener(move || {
                    late_hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
            }
            Ok(())
        });
    }

    state.publish_sensor_reading(SensorReading(1)).unwrap();
    assert_eq!(late_hits.load(Ordering::SeqCst), 0, "not in the same fan-out");
    assert_eq!(state.listener_count(Channel::Sensor), 2);

    state.publish_sensor_reading(SensorReading(2)).unwrap();
    assert_eq!(late_hits.load(Ordering::SeqCst), 1, "runs on the next publish");
}

#[test]
fn listener_removed_mid_fanout_still_runs_this_time() {
    let state = hub();
    let second_hits = Arc::new(AtomicUsize::new(0));
    let second_id = Arc::new(Mutex::new(None));

    {
        let weak = Arc::downgrade(&state);
        let second_id = Arc::clone(&second_id);
        state.register_sensor_listener(move || {
            if let Some(id) = second_id.lock().unwrap().take() {
                weak.upgrade().unwrap().unregister_listener(id);
            }
            Ok(())
        });
    }
    let id = {
        let second_hits = Arc::clone(&second_hits);
        state.register_sensor_listener(move || {
            second_hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };
    *second_id.lock().unwrap() = Some(id);

    state.publish_sensor_reading(SensorReading(1)).unwrap();
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    state.publish_sensor_reading(SensorReading(2)).unwrap();
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_publishers_never_share_a_fanout() {
    const THREADS: i64 = 4;
    const PER_THREAD: i64 = 200;

    let state = hub();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let in_fanout = Arc::new(AtomicBool::new(false));
    {
        let weak = Arc::downgrade(&state);
        let seen = Arc::clone(&seen);
        let in_fanout = Arc::clone(&in_fanout);
        state.register_sensor_listener(move || {
            assert!(
                !in_fanout.swap(true, Ordering::SeqCst),
                "two fan-outs overlapped"
            );
            let reading = weak.upgrade().unwrap().sensor_reading();
            seen.lock().unwrap().push(reading.0);
            in_fanout.store(false, Ordering::SeqCst);
            Ok(())
        });
    }

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    state
                        .publish_sensor_reading(SensorReading(t * PER_THREAD + i))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    let expected: Vec<i64> = (0..THREADS * PER_THREAD).collect();
    assert_eq!(seen, expected, "every publish observed its own value once");
}

#[test]
fn actuator_publish_from_sensor_listener_nests_on_same_thread() {
    let state = hub();
    let order = Arc::new(Mutex::new(Vec::new()));
    {
        let weak = Arc::downgrade(&state);
        let order = Arc::clone(&order);
        state.register_sensor_listener(move || {
            order.lock().unwrap().push("sensor:begin");
            weak.upgrade()
                .unwrap()
                .publish_actuator_target(ActuatorTarget([1, 1, 1]))?;
            order.lock().unwrap().push("sensor:end");
            Ok(())
        });
    }
    {
        let order = Arc::clone(&order);
        state.register_actuator_listener(move || {
            order.lock().unwrap().push("actuator");
            Ok(())
        });
    }

    state.publish_sensor_reading(SensorReading(1)).unwrap();
    assert_eq!(
        *order.lock().unwrap(),
        vec!["sensor:begin", "actuator", "sensor:end"]
    );
}
