use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use telemetry_record::{SharedRecord, TelemetryRecord};

#[test]
fn readers_never_observe_a_mixed_record() {
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedRecord::new(dir.path().join("sensor_data"));
    let a = TelemetryRecord::new(400.0, 20.0, 30.0);
    let b = TelemetryRecord::new(1200.0, 26.5, 70.0);
    shared.store(&a).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let shared = shared.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..2_000 {
                let next = if i % 2 == 0 { b } else { a };
                shared.store(&next).unwrap();
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut reads = 0usize;
    while !done.load(Ordering::Acquire) {
        let seen = shared.load().unwrap();
        assert!(seen == a || seen == b, "torn read: {seen:?}");
        reads += 1;
    }
    writer.join().unwrap();
    assert!(reads > 0 || shared.load().is_ok());
}
