//! Property-based tests for the flip state machine.
//!
//! The flip monitor must stay edge-triggered under arbitrary sensor
//! chatter: duplicate callbacks never double-fire side effects, and a full
//! flip cycle restores exactly the mode that was captured on entry.

mod common;

use proptest::prelude::*;
use std::sync::Arc;

use common::{CountingWakeLock, FakeRinger, RecordingSink};
use glintd::audio::{RingerControl, RingerMode};
use glintd::core::dispatch::Dispatcher;
use glintd::core::flip::FlipMonitor;
use glintd::io::wakelock::NoopWakeLock;

/// Count logical rising edges in a sensor sequence starting from face-up.
fn rising_edges(sequence: &[bool]) -> usize {
    let mut flipped = false;
    let mut edges = 0;
    for &event in sequence {
        if event != flipped {
            if event {
                edges += 1;
            }
            flipped = event;
        }
    }
    edges
}

proptest! {
    /// One flip animation and one silence per rising edge, no matter how
    /// noisy the sensor stream is.
    #[test]
    fn side_effects_fire_once_per_rising_edge(
        sequence in proptest::collection::vec(any::<bool>(), 0..48)
    ) {
        let (sink, log) = RecordingSink::new();
        let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(NoopWakeLock));
        let ringer = FakeRinger::new(RingerMode::Normal);
        let mut monitor = FlipMonitor::new(false);

        for &event in &sequence {
            monitor.on_sensor_event(event, &ringer, &dispatcher);
        }
        drop(dispatcher);

        let edges = rising_edges(&sequence);
        let plays = log
            .lock()
            .unwrap()
            .iter()
            .filter(|line| *line == "play flip")
            .count();
        prop_assert_eq!(plays, edges);

        let silences = ringer
            .set_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|mode| **mode == RingerMode::Silent)
            .count();
        prop_assert_eq!(silences, edges);
    }

    /// After any sequence ending face-up, the live ringer mode equals the
    /// initial mode: every capture was restored.
    #[test]
    fn ringer_round_trips_when_face_up(
        sequence in proptest::collection::vec(any::<bool>(), 0..48),
        initial in prop_oneof![
            Just(RingerMode::Normal),
            Just(RingerMode::Vibrate),
            Just(RingerMode::Silent),
        ]
    ) {
        let dispatcher = Dispatcher::new(
            Box::new(common::RecordingSink::new().0),
            Arc::new(NoopWakeLock),
        );
        let ringer = FakeRinger::new(initial);
        let mut monitor = FlipMonitor::new(false);

        for &event in &sequence {
            monitor.on_sensor_event(event, &ringer, &dispatcher);
        }
        monitor.on_sensor_event(false, &ringer, &dispatcher);

        prop_assert_eq!(ringer.mode().unwrap(), initial);
    }

    /// The machine's reported state always tracks the last distinct sensor
    /// value.
    #[test]
    fn state_tracks_last_distinct_event(
        sequence in proptest::collection::vec(any::<bool>(), 1..48)
    ) {
        let dispatcher = Dispatcher::new(
            Box::new(common::RecordingSink::new().0),
            Arc::new(NoopWakeLock),
        );
        let ringer = FakeRinger::new(RingerMode::Normal);
        let mut monitor = FlipMonitor::new(false);

        for &event in &sequence {
            monitor.on_sensor_event(event, &ringer, &dispatcher);
        }

        prop_assert_eq!(monitor.is_flipped(), *sequence.last().unwrap());
    }
}

#[test]
fn restores_snapshot_despite_external_change_while_flipped() {
    let dispatcher = Dispatcher::new(
        Box::new(common::RecordingSink::new().0),
        Arc::new(NoopWakeLock),
    );
    let ringer = FakeRinger::new(RingerMode::Vibrate);
    let mut monitor = FlipMonitor::new(false);

    monitor.on_sensor_event(true, &ringer, &dispatcher);
    assert_eq!(ringer.mode().unwrap(), RingerMode::Silent);

    // Someone toggles the ringer while the device lies face down
    ringer.external_change(RingerMode::Normal);

    monitor.on_sensor_event(false, &ringer, &dispatcher);

    // The captured snapshot wins over the live value
    assert_eq!(ringer.mode().unwrap(), RingerMode::Vibrate);
}

#[test]
fn flip_dispatch_takes_a_bounded_wake_lock() {
    let (sink, _log) = RecordingSink::new();
    let (wake, acquisitions) = CountingWakeLock::new();
    let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(wake));
    let ringer = FakeRinger::new(RingerMode::Normal);
    let mut monitor = FlipMonitor::new(false);

    monitor.on_sensor_event(true, &ringer, &dispatcher);
    drop(dispatcher);

    let acquisitions = acquisitions.lock().unwrap();
    assert_eq!(acquisitions.len(), 1);
    assert_eq!(acquisitions[0], glintd::constants::ANIMATION_WAKE_LOCK);
}
