//! Named three-channel datasets over a sorted time or frequency axis.
//!
//! A [`Series`] is validated once on construction and is treated as an
//! immutable snapshot afterwards. The JSON wire form ([`SeriesPayload`])
//! is the `{"data": {...}, "labels": [...]}` shape the chart frontend reads.

use crate::core::error::WindowError;
use serde::{Deserialize, Serialize};

/// Number of value channels carried by every series.
pub const CHANNEL_COUNT: usize = 3;

/// Which quantity the series axis measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Seconds since the start of the recording
    Time,
    /// Frequency bins in hertz
    Freq,
}

impl AxisKind {
    /// Key used for the axis array in the JSON payload.
    pub fn key(&self) -> &'static str {
        match self {
            AxisKind::Time => "time",
            AxisKind::Freq => "freq",
        }
    }

    /// Display unit for axis values.
    pub fn unit(&self) -> &'static str {
        match self {
            AxisKind::Time => "s",
            AxisKind::Freq => "Hz",
        }
    }
}

/// A named dataset: one sorted axis and three aligned value channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    axis_kind: AxisKind,
    axis: Vec<f64>,
    channels: [Vec<f64>; CHANNEL_COUNT],
    labels: [String; CHANNEL_COUNT],
    sample_rate: Option<u32>,
}

impl Series {
    /// Build a series, checking that all sequences are aligned and the axis
    /// is finite and ascending.
    pub fn new(
        name: impl Into<String>,
        axis_kind: AxisKind,
        axis: Vec<f64>,
        channels: [Vec<f64>; CHANNEL_COUNT],
        labels: [String; CHANNEL_COUNT],
    ) -> Result<Self, WindowError> {
        let name = name.into();

        if axis.is_empty() {
            return Err(WindowError::InvalidArgument(format!(
                "series '{name}' has an empty axis"
            )));
        }

        for (i, channel) in channels.iter().enumerate() {
            if channel.len() != axis.len() {
                return Err(WindowError::InvalidArgument(format!(
                    "series '{name}': ch{} has {} samples but the axis has {}",
                    i + 1,
                    channel.len(),
                    axis.len()
                )));
            }
        }

        if let Some(idx) = axis.iter().position(|v| !v.is_finite()) {
            return Err(WindowError::InvalidArgument(format!(
                "series '{name}': axis value at index {idx} is not finite"
            )));
        }

        if let Some(idx) = axis.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(WindowError::InvalidArgument(format!(
                "series '{name}': axis is not sorted at index {}",
                idx + 1
            )));
        }

        Ok(Self {
            name,
            axis_kind,
            axis,
            channels,
            labels,
            sample_rate: None,
        })
    }

    /// Attach the sample rate the series was generated at.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis_kind(&self) -> AxisKind {
        self.axis_kind
    }

    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    /// Value channel `index` (0-based, so `ch1` is index 0).
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }

    pub fn labels(&self) -> &[String; CHANNEL_COUNT] {
        &self.labels
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Number of samples on the axis.
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// First axis value, used as the default window anchor.
    pub fn origin(&self) -> f64 {
        self.axis[0]
    }

    /// Last axis value.
    pub fn last(&self) -> f64 {
        self.axis[self.axis.len() - 1]
    }

    /// Convert to the JSON wire form.
    pub fn to_payload(&self) -> SeriesPayload {
        SeriesPayload {
            data: SeriesData::new(
                self.axis_kind,
                self.axis.clone(),
                [
                    self.channels[0].clone(),
                    self.channels[1].clone(),
                    self.channels[2].clone(),
                ],
            ),
            labels: self.labels.clone(),
            sample_rate: self.sample_rate,
        }
    }

    /// Build a series from its JSON wire form, re-running validation.
    pub fn from_payload(
        name: impl Into<String>,
        payload: SeriesPayload,
    ) -> Result<Self, WindowError> {
        let SeriesPayload {
            data,
            labels,
            sample_rate,
        } = payload;
        let (axis_kind, axis) = match data.axis {
            AxisData::Time(values) => (AxisKind::Time, values),
            AxisData::Freq(values) => (AxisKind::Freq, values),
        };

        let series = Self::new(name, axis_kind, axis, [data.ch1, data.ch2, data.ch3], labels)?;
        Ok(match sample_rate {
            Some(rate) => series.with_sample_rate(rate),
            None => series,
        })
    }
}

/// Axis array, keyed `time` or `freq` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisData {
    #[serde(rename = "time")]
    Time(Vec<f64>),
    #[serde(rename = "freq")]
    Freq(Vec<f64>),
}

impl AxisData {
    pub fn values(&self) -> &[f64] {
        match self {
            AxisData::Time(values) | AxisData::Freq(values) => values,
        }
    }
}

/// The `data` object: one axis array plus `ch1`/`ch2`/`ch3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    #[serde(flatten)]
    pub axis: AxisData,
    pub ch1: Vec<f64>,
    pub ch2: Vec<f64>,
    pub ch3: Vec<f64>,
}

impl SeriesData {
    pub fn new(axis_kind: AxisKind, axis: Vec<f64>, channels: [Vec<f64>; CHANNEL_COUNT]) -> Self {
        let [ch1, ch2, ch3] = channels;
        let axis = match axis_kind {
            AxisKind::Time => AxisData::Time(axis),
            AxisKind::Freq => AxisData::Freq(axis),
        };
        Self {
            axis,
            ch1,
            ch2,
            ch3,
        }
    }
}

/// JSON payload served for each named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub data: SeriesData,
    pub labels: [String; CHANNEL_COUNT],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> [String; CHANNEL_COUNT] {
        ["a".to_string(), "b".to_string(), "c".to_string()]
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 0.1).collect()
    }

    #[test]
    fn test_series_accessors() {
        let axis = ramp(5);
        let series = Series::new(
            "ramp",
            AxisKind::Time,
            axis.clone(),
            [axis.clone(), axis.clone(), axis.clone()],
            labels(),
        )
        .unwrap()
        .with_sample_rate(10);

        assert_eq!(series.name(), "ramp");
        assert_eq!(series.len(), 5);
        assert_eq!(series.origin(), 0.0);
        assert!((series.last() - 0.4).abs() < 1e-12);
        assert_eq!(series.sample_rate(), Some(10));
        assert_eq!(series.channel(2), axis.as_slice());
    }

    #[test]
    fn test_rejects_misaligned_channels() {
        let err = Series::new(
            "bad",
            AxisKind::Time,
            ramp(4),
            [ramp(4), ramp(3), ramp(4)],
            labels(),
        )
        .unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(ref m) if m.contains("ch2")));
    }

    #[test]
    fn test_rejects_unsorted_and_empty_axis() {
        let axis = vec![0.0, 0.2, 0.1];
        let err = Series::new(
            "bad",
            AxisKind::Time,
            axis.clone(),
            [axis.clone(), axis.clone(), axis],
            labels(),
        )
        .unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));

        let err = Series::new(
            "empty",
            AxisKind::Freq,
            Vec::new(),
            [Vec::new(), Vec::new(), Vec::new()],
            labels(),
        )
        .unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));
    }

    #[test]
    fn test_accepts_repeated_axis_values() {
        let axis = vec![0.0, 0.0, 1.0];
        assert!(Series::new(
            "flat",
            AxisKind::Time,
            axis.clone(),
            [axis.clone(), axis.clone(), axis],
            labels(),
        )
        .is_ok());
    }

    #[test]
    fn test_payload_json_shape() {
        let axis = ramp(3);
        let series = Series::new(
            "spectrum",
            AxisKind::Freq,
            axis.clone(),
            [axis.clone(), axis.clone(), axis],
            labels(),
        )
        .unwrap();

        let json = serde_json::to_value(series.to_payload()).unwrap();
        assert!(json["data"]["freq"].is_array());
        assert!(json["data"].get("time").is_none());
        assert_eq!(json["data"]["ch1"].as_array().unwrap().len(), 3);
        assert_eq!(json["labels"][1], "b");
        assert!(json.get("sample_rate").is_none());
    }

    #[test]
    fn test_payload_parses_flat_json_shape() {
        let json = r#"{
            "data": {"time": [0.0, 0.5, 1.0], "ch1": [1, 2, 3], "ch2": [4, 5, 6], "ch3": [7, 8, 9]},
            "labels": ["Channel 1 (50Hz)", "Channel 2 (120Hz)", "Channel 3 (200Hz)"],
            "sample_rate": 1000
        }"#;
        let payload: SeriesPayload = serde_json::from_str(json).unwrap();
        let series = Series::from_payload("signal", payload).unwrap();

        assert_eq!(series.axis_kind(), AxisKind::Time);
        assert_eq!(series.len(), 3);
        assert_eq!(series.channel(1), &[4.0, 5.0, 6.0]);
        assert_eq!(series.sample_rate(), Some(1000));
    }
}
