//! Synthetic three-channel datasets served by the playground.
//!
//! Each dataset is generated once (seeded noise makes it reproducible) and
//! is immutable afterwards. Data sources hand them out as `Arc<Series>`.

pub mod dsp;
pub mod source;

pub use source::{DataSource, DatasetStore, JsonFileSource};

use crate::core::{AxisKind, Series, WindowError};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// The datasets the playground knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Composite sines in the time domain
    Signal,
    /// FFT magnitude of the composite sines
    Fft,
    /// Moving-average low-pass of noisy sines
    Filtering,
    /// Welch power spectral density
    Psd,
    /// Butterworth bandpass around 60 Hz
    Bandpass,
    /// Simulated 3D motion trace
    Accelerometer,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 6] = [
        DatasetKind::Signal,
        DatasetKind::Fft,
        DatasetKind::Filtering,
        DatasetKind::Psd,
        DatasetKind::Bandpass,
        DatasetKind::Accelerometer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Signal => "signal",
            DatasetKind::Fft => "fft",
            DatasetKind::Filtering => "filtering",
            DatasetKind::Psd => "psd",
            DatasetKind::Bandpass => "bandpass",
            DatasetKind::Accelerometer => "accelerometer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// Seeded Gaussian noise source shared by the generators.
pub struct Noise {
    rng: StdRng,
    normal: Normal,
}

impl Noise {
    /// Noise from a fixed seed, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Result<Self, WindowError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| WindowError::InvalidArgument(format!("noise distribution: {e}")))?;
        Ok(Self { rng, normal })
    }

    /// `n` standard-normal samples scaled by `std_dev`.
    fn samples(&mut self, n: usize, std_dev: f64) -> Vec<f64> {
        (0..n)
            .map(|_| std_dev * self.normal.sample(&mut self.rng))
            .collect()
    }
}

/// Sum of `amplitude * sin(2π f t)` terms plus noise at every instant.
fn mixture(t: &[f64], tones: &[(f64, f64)], noise: &mut Noise, noise_std: f64) -> Vec<f64> {
    let jitter = noise.samples(t.len(), noise_std);
    t.iter()
        .zip(jitter)
        .map(|(&t, n)| {
            tones
                .iter()
                .map(|&(amplitude, freq)| amplitude * (2.0 * PI * freq * t).sin())
                .sum::<f64>()
                + n
        })
        .collect()
}

fn labels(names: [&str; 3]) -> [String; 3] {
    names.map(str::to_string)
}

/// Tones of the composite signal used by both `signal` and `fft`.
const COMPOSITE_TONES: [&[(f64, f64)]; 3] = [
    &[(1.0, 50.0), (0.3, 150.0)],
    &[(0.8, 120.0), (0.4, 60.0)],
    &[(0.6, 200.0), (0.3, 100.0)],
];

/// Generate one dataset.
pub fn generate(kind: DatasetKind, noise: &mut Noise) -> Result<Series, WindowError> {
    let series = match kind {
        DatasetKind::Signal => signal(noise)?,
        DatasetKind::Fft => fft(noise)?,
        DatasetKind::Filtering => filtering(noise)?,
        DatasetKind::Psd => psd(noise)?,
        DatasetKind::Bandpass => bandpass(noise)?,
        DatasetKind::Accelerometer => accelerometer(noise)?,
    };
    tracing::debug!(dataset = kind.name(), points = series.len(), "generated dataset");
    Ok(series)
}

fn signal(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, n, step) = (1000, 2000, 2);
    let t = dsp::sample_times(n, rate as f64);
    let channels =
        COMPOSITE_TONES.map(|tones| dsp::decimate(&mixture(&t, tones, noise, 0.1), step));

    Series::new(
        "signal",
        AxisKind::Time,
        dsp::decimate(&t, step),
        channels,
        labels(["Channel 1 (50Hz)", "Channel 2 (120Hz)", "Channel 3 (200Hz)"]),
    )
    .map(|s| s.with_sample_rate(rate))
}

fn fft(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, n, step) = (1000, 2000, 5);
    let t = dsp::sample_times(n, rate as f64);
    let channels = COMPOSITE_TONES.map(|tones| {
        dsp::decimate(&dsp::fft_magnitude(&mixture(&t, tones, noise, 0.1)), step)
    });

    Series::new(
        "fft",
        AxisKind::Freq,
        dsp::decimate(&dsp::fft_frequencies(n, rate as f64), step),
        channels,
        labels(["FFT Ch1 (50Hz)", "FFT Ch2 (120Hz)", "FFT Ch3 (200Hz)"]),
    )
    .map(|s| s.with_sample_rate(rate))
}

fn filtering(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, n, step, taps) = (500, 500, 2, 15);
    let t = dsp::sample_times(n, rate as f64);
    let tones: [&[(f64, f64)]; 3] = [
        &[(1.0, 10.0), (0.5, 150.0)],
        &[(0.8, 15.0), (0.4, 120.0)],
        &[(0.6, 8.0), (0.3, 100.0)],
    ];
    let channels = tones.map(|tones| {
        dsp::decimate(
            &dsp::moving_average_same(&mixture(&t, tones, noise, 0.2), taps),
            step,
        )
    });

    Series::new(
        "filtering",
        AxisKind::Time,
        dsp::decimate(&t, step),
        channels,
        labels(["Filtered Ch1", "Filtered Ch2", "Filtered Ch3"]),
    )
    .map(|s| s.with_sample_rate(rate))
}

fn psd(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, n, nperseg) = (1000, 4000, 1024);
    let t = dsp::sample_times(n, rate as f64);
    let tones: [&[(f64, f64)]; 3] = [
        &[(2.0, 50.0), (1.0, 150.0)],
        &[(1.5, 120.0), (0.8, 60.0)],
        &[(1.0, 200.0), (0.6, 100.0)],
    ];

    let mut freqs = Vec::new();
    let channels = tones.map(|tones| {
        let (f, p) = dsp::welch_psd(&mixture(&t, tones, noise, 0.5), rate as f64, nperseg);
        freqs = f;
        p
    });

    Series::new(
        "psd",
        AxisKind::Freq,
        freqs,
        channels,
        labels(["PSD Ch1", "PSD Ch2", "PSD Ch3"]),
    )
    .map(|s| s.with_sample_rate(rate))
}

fn bandpass(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, n, step) = (1000, 1000, 2);
    let t = dsp::sample_times(n, rate as f64);
    let tones: [&[(f64, f64)]; 3] = [
        &[(1.0, 10.0), (1.0, 60.0), (1.0, 200.0)],
        &[(0.8, 15.0), (0.8, 65.0), (0.5, 180.0)],
        &[(0.6, 20.0), (0.7, 70.0), (0.4, 220.0)],
    ];
    let sections = dsp::butter_bandpass(4, 40.0, 80.0, rate as f64);
    let channels = tones.map(|tones| {
        dsp::decimate(&dsp::sosfilt(&sections, &mixture(&t, tones, noise, 0.2)), step)
    });

    Series::new(
        "bandpass",
        AxisKind::Time,
        dsp::decimate(&t, step),
        channels,
        labels(["Bandpass Ch1", "Bandpass Ch2", "Bandpass Ch3"]),
    )
    .map(|s| s.with_sample_rate(rate))
}

fn accelerometer(noise: &mut Noise) -> Result<Series, WindowError> {
    let (rate, duration) = (100, 10.0);
    let n = (rate as f64 * duration) as usize;
    let t = dsp::sample_times(n, rate as f64);

    let x = mixture(&t, &[(1.0, 0.5)], noise, 0.1);
    let drift: Vec<f64> = t.iter().map(|&t| 0.1 * t / duration).collect();
    let y: Vec<f64> = mixture(&t, &[], noise, 0.1)
        .iter()
        .zip(t.iter().zip(drift))
        .map(|(jitter, (&t, d))| (2.0 * PI * 0.5 * t).cos() + d + jitter)
        .collect();
    let z = mixture(&t, &[(0.5, 0.3), (0.2, 1.5)], noise, 0.1);

    Series::new(
        "accelerometer",
        AxisKind::Time,
        t,
        [x, y, z],
        labels(["X", "Y", "Z"]),
    )
    .map(|s| s.with_sample_rate(rate))
}
