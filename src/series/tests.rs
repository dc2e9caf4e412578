use super::*;

/// appends each tick in `range`, each core reporting the tick index plus its own offset.
fn fill(store: &mut SeriesStore, range: std::ops::Range<u64>) {
    let cores = store.cores();
    for tick in range {
        let values = (0..cores).map(|c| (tick + c as u64) as f64).collect::<Vec<_>>();
        store.append(tick, &values).unwrap();
    }
}

#[test]
fn starts_empty() {
    let store = SeriesStore::new(4, 2);
    assert!(store.is_empty());
    assert_eq!(store.capacity(), 4);
    assert_eq!(store.cores(), 2);

    let snapshot = store.snapshot();
    assert!(snapshot.ticks.is_empty());
    assert_eq!(snapshot.cores, vec![Vec::<f64>::new(), Vec::new()]);
    assert_eq!(snapshot.span(), None);
    assert_eq!(snapshot.latest(), None);
}

#[test]
fn window_is_bounded() {
    let mut store = SeriesStore::new(5, 3);
    for tick in 0..20 {
        fill(&mut store, tick..tick + 1);
        let snapshot = store.snapshot();
        assert!(snapshot.ticks.len() <= 5);
        assert_eq!(snapshot.ticks.len(), (tick as usize + 1).min(5));
    }
}

#[test]
fn series_stay_aligned() {
    let mut store = SeriesStore::new(3, 4);
    for tick in 0..10 {
        fill(&mut store, tick..tick + 1);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.core_count(), 4);
        for series in &snapshot.cores {
            assert_eq!(series.len(), snapshot.ticks.len());
        }
    }
}

#[test]
fn oldest_tick_trails_by_capacity() {
    let mut store = SeriesStore::new(8, 1);
    fill(&mut store, 0..30);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.span(), Some((30 - 8, 29)));
    assert!(snapshot.ticks.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn capacity_of_one_keeps_the_newest() {
    let mut store = SeriesStore::new(1, 2);
    fill(&mut store, 0..3);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.ticks, vec![2]);
    assert_eq!(snapshot.cores, vec![vec![2.0], vec![3.0]]);
}

#[test]
fn wrong_cardinality_leaves_state_unchanged() {
    let mut store = SeriesStore::new(3, 2);
    fill(&mut store, 0..2);
    let before = store.snapshot();

    let err = store.append(2, &[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(
        err,
        CardinalityMismatch {
            expected: 2,
            actual: 3
        }
    );
    let err = store.append(2, &[]).unwrap_err();
    assert_eq!(err.actual, 0);

    assert_eq!(store.snapshot(), before);
}

#[test]
fn snapshot_is_detached() {
    let mut store = SeriesStore::new(2, 1);
    fill(&mut store, 0..1);
    let snapshot = store.snapshot();
    fill(&mut store, 1..3);

    assert_eq!(snapshot.ticks, vec![0]);
    assert_eq!(store.snapshot().ticks, vec![1, 2]);
}

#[test]
fn two_cores_three_wide() {
    let mut store = SeriesStore::new(3, 2);
    let observations = [[10.0, 20.0], [30.0, 40.0], [50.0, 60.0], [70.0, 80.0]];
    for (tick, values) in observations.iter().enumerate() {
        store.append(tick as u64, values).unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.ticks, vec![1, 2, 3]);
    assert_eq!(snapshot.cores[0], vec![30.0, 50.0, 70.0]);
    assert_eq!(snapshot.cores[1], vec![40.0, 60.0, 80.0]);
    assert_eq!(snapshot.latest(), Some(vec![70.0, 80.0]));
}

#[test]
#[should_panic(expected = "window capacity")]
fn zero_capacity_is_rejected() {
    let _ = SeriesStore::new(0, 1);
}
