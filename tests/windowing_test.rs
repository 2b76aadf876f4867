//! End-to-end tests of the windowing engine over generated datasets.

use signal_playground::core::{
    compute_window, AxisKind, Series, WindowSize, WindowState, DEFAULT_SERIES,
};
use signal_playground::datasets::{DataSource, DatasetStore};

fn store() -> DatasetStore {
    DatasetStore::generate(Some(42)).expect("datasets should generate")
}

fn size(v: f64) -> WindowSize {
    WindowSize::new(v).unwrap()
}

/// 0.00, 0.01, ..., 9.99 like the accelerometer trace.
fn hundredths() -> Series {
    let axis: Vec<f64> = (0..1000).map(|i| i as f64 / 100.0).collect();
    let ch: Vec<f64> = axis.iter().map(|t| (t * 0.1).sin()).collect();
    Series::new(
        "accelerometer",
        AxisKind::Time,
        axis,
        [ch.clone(), ch.clone(), ch],
        ["X".to_string(), "Y".to_string(), "Z".to_string()],
    )
    .unwrap()
}

#[test]
fn test_default_window_starts_at_origin_for_every_dataset() {
    let store = store();
    for name in store.names() {
        let series = store.fetch(&name).unwrap();
        for w in [0.1, 0.5, 2.0, 50.0] {
            let window = compute_window(&series, size(w), None);
            assert_eq!(window.start(), 0, "{name}");
            assert!(
                window.axis().iter().all(|&v| v - series.origin() <= w),
                "{name} exceeded window {w}"
            );
        }
    }
}

#[test]
fn test_centered_window_spans_window_size() {
    let series = hundredths();
    // centers well inside [origin + half, last - half]
    for center in [1.0, 2.5, 5.0, 7.25, 9.0] {
        let window = compute_window(&series, size(1.0), Some(center));
        assert!(
            (window.span() - 1.0).abs() <= 0.01 + 1e-9,
            "span {} at center {center}",
            window.span()
        );
        let first = window.axis()[0];
        let last = *window.axis().last().unwrap();
        let mid = (first + last) / 2.0;
        assert!((mid - center).abs() <= 0.01 + 1e-9);
    }
}

#[test]
fn test_center_before_origin_never_goes_negative() {
    let series = hundredths();
    for center in [-0.1, -0.4, 0.0, 0.2] {
        let window = compute_window(&series, size(1.0), Some(center));
        assert_eq!(window.start(), 0);
        assert!(window.lower >= 0.0);
        assert!(window.axis().iter().all(|&t| t >= 0.0));
    }
}

#[test]
fn test_compute_window_is_pure() {
    let series = hundredths();
    let a = compute_window(&series, size(2.0), Some(3.3));
    let b = compute_window(&series, size(2.0), Some(3.3));
    assert_eq!((a.start(), a.end()), (b.start(), b.end()));
    assert_eq!(a.to_payload(), b.to_payload());
}

#[test]
fn test_growing_window_never_loses_points() {
    let store = store();
    let series = store.fetch("signal").unwrap();
    for center in [None, Some(0.0), Some(0.7), Some(1.9), Some(3.0)] {
        let mut previous = 0;
        for w in [0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 4.0] {
            let count = compute_window(&series, size(w), center).len();
            assert!(count >= previous, "center {center:?}, size {w}");
            previous = count;
        }
    }
}

#[test]
fn test_click_beyond_data_gives_empty_window() {
    let store = store();
    let series = store.fetch("signal").unwrap();
    let window = compute_window(&series, size(2.0), Some(10.0));
    assert!(window.is_empty());
    assert_eq!(window.to_payload().num_points, 0);
}

#[test]
fn test_full_interaction_sequence() {
    let store = store();

    let state = WindowState::new(size(2.0));
    let accel = store.fetch(&state.active_series).unwrap();
    let initial = state.window(&accel);
    assert_eq!(initial.lower, 0.0);
    assert_eq!(initial.upper, 2.0);
    assert!(initial.describe().starts_with("Default view:"));

    let state = state.on_click(1.2, "signal");
    assert_eq!(state.center, Some(1.2));

    let state = state.on_slider_change(size(3.0));
    assert_eq!(state.window_size.get(), 3.0);
    assert_eq!(state.center, Some(1.2));

    let state = state.on_click(7.0, "accelerometer");
    let window = state.window(&accel);
    assert!((window.lower - 5.5).abs() < 1e-9);
    assert!((window.upper - 8.5).abs() < 1e-9);

    let state = state.on_slider_change(size(1.5));
    let window = state.window(&accel);
    assert!((window.lower - 6.25).abs() < 1e-9);

    let state = state.on_reset();
    assert_eq!(state.active_series, DEFAULT_SERIES);
    assert_eq!(state.center, None);
    assert_eq!(state.window_size.get(), 1.5);
    let window = state.window(&accel);
    assert_eq!(window.lower, 0.0);
    assert!((window.upper - 1.5).abs() < 1e-9);
}

#[test]
fn test_switching_axis_kind_keeps_center() {
    let store = store();
    let state = WindowState::default().on_click(1.0, "signal").on_click(1.0, "fft");
    let fft = store.fetch(&state.active_series).unwrap();
    assert_eq!(fft.axis_kind(), AxisKind::Freq);

    // 1.0 is taken as 1 Hz on the frequency axis
    let window = state.window(&fft);
    assert_eq!(window.center, Some(1.0));
    assert!(window.axis().iter().all(|&f| f <= 1.25));
}

#[test]
fn test_slider_changes_preserve_state() {
    let mut state = WindowState::default().on_click(1.0, "signal");
    for w in [1.0, 2.0, 3.0, 1.5, 2.5] {
        state = state.on_slider_change(size(w));
        assert_eq!(state.center, Some(1.0));
        assert_eq!(state.active_series, "signal");
        assert_eq!(state.window_size.get(), w);
    }
}
