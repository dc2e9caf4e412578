use super::*;

fn snapshot(tick: u64) -> Snapshot {
    Snapshot {
        ticks: vec![tick],
        cores: vec![vec![tick as f64]],
    }
}

#[test]
fn null_display_accepts_everything() {
    let mut display = NullDisplay;
    assert!(display.render(&Snapshot::default()).is_ok());
    assert!(display.render(&snapshot(1)).is_ok());
}

#[test]
fn worker_draws_every_frame_it_accepts() {
    let display = MockDisplay::default();
    let probe = display.clone();
    let mut worker = RenderWorker::spawn(display).unwrap();

    for tick in 0..3 {
        worker.render(&snapshot(tick)).unwrap();
        // give the worker time to empty the mailbox.
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(worker.dropped(), 0);
    drop(worker);

    let ticks = probe
        .frames()
        .into_iter()
        .flat_map(|frame| frame.ticks)
        .collect::<Vec<_>>();
    assert_eq!(ticks, vec![0, 1, 2]);
}

#[test]
fn busy_worker_drops_frames() {
    let display = MockDisplay::default().with_delay(Duration::from_millis(100));
    let probe = display.clone();
    let mut worker = RenderWorker::spawn(display).unwrap();

    for tick in 0..10 {
        worker.render(&snapshot(tick)).unwrap();
    }
    let dropped = worker.dropped();
    assert!(dropped > 0);
    drop(worker);

    // the worker finishes what is in its mailbox before shutting down.
    assert_eq!(probe.frames().len() as u64, 10 - dropped);
    assert_eq!(probe.frames().first().map(|f| f.ticks.clone()), Some(vec![0]));
}

#[test]
fn worker_survives_a_failing_display() {
    let display = MockDisplay::default().fail_on(0);
    let probe = display.clone();
    let mut worker = RenderWorker::spawn(display).unwrap();

    worker.render(&snapshot(0)).unwrap();
    thread::sleep(Duration::from_millis(20));
    worker.render(&snapshot(1)).unwrap();
    drop(worker);

    let frames = probe.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].ticks, vec![1]);
}
