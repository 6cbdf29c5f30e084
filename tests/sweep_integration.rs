//! Integration tests for sweep ordering
//!
//! These tests compose per-axis orderings the way an acquisition loop does
//! before iterating over its set-points.

use acqproc_rs::sweep::{
    linear_indices, sweep_order, RandomOrder, SnakeOrder, SweepError, SweepOrder, SweepOrderKind,
};

#[test]
fn test_snake_raster_scan() {
    // A 3x3 raster where every other row runs backwards.
    let order = sweep_order(&[3, 3], &[SweepOrderKind::Plain, SweepOrderKind::Snake]).unwrap();
    assert_eq!(order, [0, 1, 2, 5, 4, 3, 6, 7, 8]);
}

#[test]
fn test_snake_on_middle_axis() {
    let shape = [2, 2, 3];
    let order = SnakeOrder
        .reorder(&linear_indices(&shape).unwrap(), &shape, 1)
        .unwrap();
    assert_eq!(order, [0, 1, 2, 3, 4, 5, 9, 10, 11, 6, 7, 8]);
}

#[test]
fn test_random_outer_axis_shuffles_whole_rows() {
    let shape = [5, 4];
    let order = RandomOrder::seeded(42)
        .reorder(&linear_indices(&shape).unwrap(), &shape, 0)
        .unwrap();

    for row in order.chunks(4) {
        let start = row[0];
        assert_eq!(start % 4, 0);
        assert_eq!(row, [start, start + 1, start + 2, start + 3]);
    }
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, linear_indices(&shape).unwrap());
}

#[test]
fn test_seeded_sweep_is_reproducible() {
    let kinds = [
        SweepOrderKind::Random { seed: Some(1) },
        SweepOrderKind::Snake,
        SweepOrderKind::Random { seed: Some(2) },
    ];
    let a = sweep_order(&[3, 4, 5], &kinds).unwrap();
    let b = sweep_order(&[3, 4, 5], &kinds).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 60);
}

#[test]
fn test_reorder_errors() {
    let idx = linear_indices(&[2, 3]).unwrap();
    assert_eq!(
        SnakeOrder.reorder(&idx, &[2, 3], 3),
        Err(SweepError::AxisOutOfRange { axis: 3, ndim: 2 })
    );
    assert_eq!(
        SnakeOrder.reorder(&idx[..5], &[2, 3], 1),
        Err(SweepError::LengthMismatch {
            expected: 6,
            found: 5
        })
    );
}

#[test]
fn test_zero_length_axis() {
    let order = sweep_order(&[3, 0], &[SweepOrderKind::Snake, SweepOrderKind::Snake]).unwrap();
    assert!(order.is_empty());
}
