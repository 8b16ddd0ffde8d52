// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Mutex;

use gw_core::FakeClock;

use super::*;

#[derive(Default)]
struct RecordingSink {
    samples: Mutex<Vec<HeartbeatSample>>,
}

impl HeartbeatSink for RecordingSink {
    fn publish(&self, sample: HeartbeatSample) {
        self.samples.lock().unwrap().push(sample);
    }
}

#[test]
fn publish_once_reports_active_and_max_slots_from_the_queue() {
    let queue = Arc::new(JobQueue::new(3));
    let sink = Arc::new(RecordingSink::default());
    let clock = FakeClock::new();
    clock.set_epoch_ms(42_000);
    let heartbeat = Heartbeat::new("runtime-a", queue, sink.clone(), clock, Duration::from_secs(30), Duration::from_secs(5));

    heartbeat.publish_once();

    let samples = sink.samples.lock().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].runtime_id, "runtime-a");
    assert_eq!(samples[0].state, "healthy");
    assert_eq!(samples[0].max_slots, 3);
    assert_eq!(samples[0].active_slots, 0);
    assert_eq!(samples[0].timestamp_ms, 42_000);
}

#[tokio::test]
async fn run_publishes_nothing_before_warmup_elapses_and_stops_on_shutdown() {
    let queue = Arc::new(JobQueue::new(1));
    let sink = Arc::new(RecordingSink::default());
    let heartbeat =
        Heartbeat::new("runtime-b", queue, sink.clone(), FakeClock::new(), Duration::from_millis(20), Duration::from_secs(60));

    let shutdown = tokio_util::sync::CancellationToken::new();
    shutdown.cancel();
    heartbeat.run(shutdown).await;

    assert!(sink.samples.lock().unwrap().is_empty());
}
