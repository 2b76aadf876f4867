//! Click/slider-driven time windowing over a sorted series axis.
//!
//! A window is a contiguous index range `[start, end)` of a [`Series`],
//! chosen either from the axis origin (no click yet) or centered on a
//! clicked axis value. Selection is done purely by boundary search on the
//! sorted axis; samples are never interpolated or resampled.
//!
//! The interactive state ([`WindowState`]) is an explicit value: every
//! transition consumes the old state and returns the new one, so the engine
//! itself holds nothing between calls.

use crate::core::error::WindowError;
use crate::core::series::{Series, SeriesData, CHANNEL_COUNT};
use serde::{Deserialize, Serialize};

/// Series shown before any click and after a reset.
pub const DEFAULT_SERIES: &str = "accelerometer";

/// Initial full width of the display window, in axis units.
pub const DEFAULT_WINDOW_SIZE: f64 = 0.5;

/// Full width of the display window. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WindowSize(f64);

impl WindowSize {
    /// Validate a raw slider value.
    pub fn new(value: f64) -> Result<Self, WindowError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(WindowError::InvalidArgument(format!(
                "window size must be a positive number, got {value}"
            )))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Half of the window width.
    pub fn half(&self) -> f64 {
        self.0 / 2.0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_SIZE)
    }
}

impl TryFrom<f64> for WindowSize {
    type Error = WindowError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowSize> for f64 {
    fn from(size: WindowSize) -> Self {
        size.0
    }
}

/// A contiguous selection out of a series.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    series: &'a Series,
    start: usize,
    /// Never below `start`, never above the series length.
    end: usize,
    /// Requested lower axis bound
    pub lower: f64,
    /// Requested upper axis bound
    pub upper: f64,
    /// Window size the selection was computed with
    pub window_size: WindowSize,
    /// Center the selection was computed with, if any
    pub center: Option<f64>,
}

impl<'a> Window<'a> {
    /// The series this window was cut from.
    pub fn series(&self) -> &'a Series {
        self.series
    }

    /// First included index.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last included index.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Axis values inside the window.
    pub fn axis(&self) -> &'a [f64] {
        &self.series.axis()[self.start..self.end]
    }

    /// Value channel `index` inside the window.
    pub fn channel(&self, index: usize) -> &'a [f64] {
        &self.series.channel(index)[self.start..self.end]
    }

    /// All three channels inside the window.
    pub fn channels(&self) -> [&'a [f64]; CHANNEL_COUNT] {
        [self.channel(0), self.channel(1), self.channel(2)]
    }

    /// Number of points in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Axis distance between the first and last point, 0 with fewer than two points.
    pub fn span(&self) -> f64 {
        match self.axis() {
            [first, .., last] => last - first,
            _ => 0.0,
        }
    }

    /// Status line for this window.
    pub fn describe(&self) -> String {
        describe_window(self.series.name(), self.window_size, self.center)
    }

    /// Owned JSON form of the window.
    pub fn to_payload(&self) -> WindowPayload {
        let [ch1, ch2, ch3] = self.channels();
        WindowPayload {
            series: self.series.name().to_string(),
            start_index: self.start,
            end_index: self.end,
            num_points: self.len(),
            min_axis: self.lower,
            max_axis: self.upper,
            description: self.describe(),
            data: SeriesData::new(
                self.series.axis_kind(),
                self.axis().to_vec(),
                [ch1.to_vec(), ch2.to_vec(), ch3.to_vec()],
            ),
            labels: self.series.labels().clone(),
        }
    }
}

/// Windowed data as served to the chart frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPayload {
    pub series: String,
    pub start_index: usize,
    pub end_index: usize,
    pub num_points: usize,
    pub min_axis: f64,
    pub max_axis: f64,
    pub description: String,
    pub data: SeriesData,
    pub labels: [String; CHANNEL_COUNT],
}

/// Select the window of `series` for the given size and optional center.
///
/// Without a center the window runs from the axis origin to
/// `origin + window_size`. With a center `c` it runs from
/// `max(origin, c - half)` to `c + half`. In both cases the start is the
/// first sample `>=` the lower bound and the end is the first sample `>`
/// the upper bound (or the series length). Centers before the origin clamp
/// to it; centers past the data give a short or empty trailing window.
pub fn compute_window(series: &Series, window_size: WindowSize, center: Option<f64>) -> Window<'_> {
    let axis = series.axis();
    let origin = series.origin();

    let (lower, upper) = match center {
        Some(c) => ((c - window_size.half()).max(origin), c + window_size.half()),
        None => (origin, origin + window_size.get()),
    };

    let start = match center {
        Some(_) => first_at_or_above(axis, lower),
        None => 0,
    };
    let end = first_above(axis, upper).max(start);

    Window {
        series,
        start,
        end,
        lower,
        upper,
        window_size,
        center,
    }
}

/// Human-readable status line for the window state.
///
/// Consumers match on the leading `Default view:` / `Windowed view:` words.
pub fn describe_window(series_name: &str, window_size: WindowSize, center: Option<f64>) -> String {
    match center {
        None => format!(
            "Default view: {series_name} from axis origin, window {:.1} wide",
            window_size.get()
        ),
        Some(c) => format!(
            "Windowed view: {series_name} centered at {c:.2} ± {:.1}",
            window_size.half()
        ),
    }
}

/// Index of the first value `>= bound`, or `axis.len()`.
fn first_at_or_above(axis: &[f64], bound: f64) -> usize {
    axis.partition_point(|&v| v < bound)
}

/// Index of the first value `> bound`, or `axis.len()`.
fn first_above(axis: &[f64], bound: f64) -> usize {
    axis.partition_point(|&v| v <= bound)
}

/// Per-session view state driven by clicks, the slider and reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    /// Series currently displayed
    pub active_series: String,
    /// Slider value
    pub window_size: WindowSize,
    /// Clicked axis value; `None` means anchored at the axis origin
    pub center: Option<f64>,
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new(WindowSize::default())
    }
}

impl WindowState {
    /// Fresh state on the default series with the given slider value.
    pub fn new(window_size: WindowSize) -> Self {
        Self {
            active_series: DEFAULT_SERIES.to_string(),
            window_size,
            center: None,
        }
    }

    /// Click at `axis_value` on `series_name`. The slider value is kept.
    ///
    /// Switching between a time-axis and a frequency-axis series carries the
    /// center over as a raw number; no unit conversion happens.
    pub fn on_click(self, axis_value: f64, series_name: impl Into<String>) -> Self {
        Self {
            active_series: series_name.into(),
            center: Some(axis_value),
            ..self
        }
    }

    /// Slider moved. Series and center are kept.
    pub fn on_slider_change(self, window_size: WindowSize) -> Self {
        Self {
            window_size,
            ..self
        }
    }

    /// Back to the default series, unwindowed. The slider value is kept.
    pub fn on_reset(self) -> Self {
        Self {
            active_series: DEFAULT_SERIES.to_string(),
            center: None,
            ..self
        }
    }

    /// Whether the view is still the un-clicked default.
    pub fn is_default_view(&self) -> bool {
        self.center.is_none()
    }

    /// Status line for this state.
    pub fn describe(&self) -> String {
        describe_window(&self.active_series, self.window_size, self.center)
    }

    /// Window of `series` for this state.
    pub fn window<'a>(&self, series: &'a Series) -> Window<'a> {
        compute_window(series, self.window_size, self.center)
    }
}
