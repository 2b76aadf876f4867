//! Numerical helpers used to build the synthetic datasets.
//!
//! These mirror the handful of NumPy/SciPy routines the playground needs:
//! an FFT magnitude spectrum, a same-length moving average, Welch's PSD
//! estimate and a Butterworth bandpass applied as second-order sections.

use biquad::{Biquad, Coefficients, DirectForm2Transposed};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// One second-order section: `[b0, b1, b2, a0, a1, a2]` with `a0 == 1`.
pub type Section = [f64; 6];

/// Sample instants `0, 1/fs, 2/fs, ...` for `n` samples.
pub fn sample_times(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 / sample_rate).collect()
}

/// Keep every `step`-th sample, starting with the first.
pub fn decimate(values: &[f64], step: usize) -> Vec<f64> {
    values.iter().step_by(step.max(1)).copied().collect()
}

/// Number of non-negative frequency bins for an `n`-point FFT.
fn non_negative_bins(n: usize) -> usize {
    (n + 1) / 2
}

/// Frequencies of the non-negative FFT bins.
pub fn fft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..non_negative_bins(n))
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}

/// Unnormalized magnitude of the non-negative FFT bins of a real signal.
pub fn fft_magnitude(signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(signal.len());

    let mut buffer: Vec<Complex64> = signal.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(non_negative_bins(signal.len()))
        .map(|c| c.norm())
        .collect()
}

/// Moving average of `width` taps with output aligned to the input
/// (NumPy `convolve(..., mode="same")` with a boxcar kernel). Samples
/// outside the signal count as zero.
pub fn moving_average_same(signal: &[f64], width: usize) -> Vec<f64> {
    if width == 0 {
        return signal.to_vec();
    }

    let offset = (width - 1) / 2;
    let n = signal.len() as isize;

    (0..signal.len())
        .map(|i| {
            let sum: f64 = (0..width)
                .map(|j| i as isize + offset as isize - j as isize)
                .filter(|&idx| idx >= 0 && idx < n)
                .map(|idx| signal[idx as usize])
                .sum();
            sum / width as f64
        })
        .collect()
}

/// Periodic Hann window of length `n`.
fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| 0.5 - 0.5 * (2.0 * PI * k as f64 / n as f64).cos())
        .collect()
}

/// Welch power spectral density estimate.
///
/// Hann window, 50% overlap, per-segment mean removal, one-sided density
/// scaling. Returns `(frequencies, psd)`. Signals shorter than `nperseg`
/// are treated as a single segment of their own length.
pub fn welch_psd(signal: &[f64], sample_rate: f64, nperseg: usize) -> (Vec<f64>, Vec<f64>) {
    let nperseg = nperseg.min(signal.len());
    if nperseg == 0 {
        return (Vec::new(), Vec::new());
    }

    let step = nperseg - nperseg / 2;
    let segments = (signal.len() - nperseg) / step + 1;
    let bins = nperseg / 2 + 1;

    let window = hann(nperseg);
    let scale = 1.0 / (sample_rate * window.iter().map(|w| w * w).sum::<f64>());

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);

    let mut psd = vec![0.0; bins];
    let mut buffer = vec![Complex64::new(0.0, 0.0); nperseg];

    for seg in 0..segments {
        let chunk = &signal[seg * step..seg * step + nperseg];
        let mean = chunk.iter().sum::<f64>() / nperseg as f64;

        for (slot, (&x, &w)) in buffer.iter_mut().zip(chunk.iter().zip(window.iter())) {
            *slot = Complex64::new((x - mean) * w, 0.0);
        }
        fft.process(&mut buffer);

        for (k, value) in psd.iter_mut().enumerate() {
            *value += buffer[k].norm_sqr() * scale;
        }
    }

    let nyquist_bin = if nperseg % 2 == 0 { Some(bins - 1) } else { None };
    for (k, value) in psd.iter_mut().enumerate() {
        *value /= segments as f64;
        if k != 0 && Some(k) != nyquist_bin {
            *value *= 2.0;
        }
    }

    let freqs = (0..bins)
        .map(|k| k as f64 * sample_rate / nperseg as f64)
        .collect();
    (freqs, psd)
}

/// Digital Butterworth bandpass of the given prototype `order`, as
/// `order` second-order sections (the filter order is `2 * order`).
///
/// Designed from the analog prototype by lowpass-to-bandpass transform
/// and a prewarped bilinear transform.
pub fn butter_bandpass(order: usize, low_hz: f64, high_hz: f64, sample_rate: f64) -> Vec<Section> {
    let fs2 = 2.0 * sample_rate;
    let w1 = fs2 * (PI * low_hz / sample_rate).tan();
    let w2 = fs2 * (PI * high_hz / sample_rate).tan();
    let bw = w2 - w1;
    let w0_sq = w1 * w2;

    // Analog lowpass prototype poles on the left half of the unit circle.
    let prototype = (0..order).map(|k| {
        let m = -(order as f64) + 1.0 + 2.0 * k as f64;
        -Complex64::from_polar(1.0, PI * m / (2.0 * order as f64))
    });

    let mut analog_poles = Vec::with_capacity(2 * order);
    for p in prototype {
        let half = p * (bw / 2.0);
        let root = (half * half - w0_sq).sqrt();
        analog_poles.push(half + root);
        analog_poles.push(half - root);
    }

    // Analog gain is bw^order with `order` zeros at s = 0, which map to z = 1.
    // The remaining `order` zeros at infinity map to z = -1.
    let fs2_c = Complex64::new(fs2, 0.0);
    let denom: Complex64 = analog_poles.iter().map(|&p| fs2_c - p).product();
    let numer = Complex64::new(bw.powi(order as i32) * fs2.powi(order as i32), 0.0);
    let gain = (numer / denom).re;

    let digital: Vec<Complex64> = analog_poles
        .iter()
        .map(|&p| (fs2_c + p) / (fs2_c - p))
        .collect();

    let mut denominators: Vec<[f64; 3]> = digital
        .iter()
        .filter(|p| p.im > 1e-12)
        .map(|p| [1.0, -2.0 * p.re, p.norm_sqr()])
        .collect();

    let mut real_poles: Vec<f64> = digital
        .iter()
        .filter(|p| p.im.abs() <= 1e-12)
        .map(|p| p.re)
        .collect();
    real_poles.sort_by(|a, b| a.total_cmp(b));
    for pair in real_poles.chunks(2) {
        match pair {
            [r1, r2] => denominators.push([1.0, -(r1 + r2), r1 * r2]),
            [r] => denominators.push([1.0, -r, 0.0]),
            _ => {}
        }
    }

    // Poles closest to the unit circle go last.
    denominators.sort_by(|a, b| a[2].total_cmp(&b[2]));

    denominators
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            let g = if i == 0 { gain } else { 1.0 };
            [g, 0.0, -g, a[0], a[1], a[2]]
        })
        .collect()
}

/// Run `signal` through a cascade of second-order sections
/// (transposed direct form II, zero initial state).
pub fn sosfilt(sections: &[Section], signal: &[f64]) -> Vec<f64> {
    let mut output = signal.to_vec();

    for s in sections {
        // Normalize so that a0 == 1.
        let coeffs = Coefficients {
            a1: s[4] / s[3],
            a2: s[5] / s[3],
            b0: s[0] / s[3],
            b1: s[1] / s[3],
            b2: s[2] / s[3],
        };
        let mut filter = DirectForm2Transposed::<f64>::new(coeffs);

        for sample in output.iter_mut() {
            *sample = filter.run(*sample);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        sample_times(n, sample_rate)
            .iter()
            .map(|t| (2.0 * PI * freq * t).sin())
            .collect()
    }

    fn rms(values: &[f64]) -> f64 {
        (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
    }

    fn argmax(values: &[f64]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_sample_times_and_decimate() {
        let t = sample_times(4, 2.0);
        assert_eq!(t, vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(decimate(&t, 2), vec![0.0, 1.0]);
        assert_eq!(decimate(&t, 0), t);
    }

    #[test]
    fn test_fft_peak_at_tone() {
        let signal = tone(50.0, 1000.0, 2000);
        let mags = fft_magnitude(&signal);
        let freqs = fft_frequencies(signal.len(), 1000.0);

        assert_eq!(mags.len(), 1000);
        assert_eq!(freqs.len(), 1000);
        assert!((freqs[argmax(&mags)] - 50.0).abs() < 1e-9);
        // a unit sine puts n/2 into its bin
        assert!((mags[argmax(&mags)] - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_fft_odd_length_bins() {
        assert_eq!(fft_frequencies(5, 5.0), vec![0.0, 1.0, 2.0]);
        assert_eq!(fft_magnitude(&[1.0; 5]).len(), 3);
        assert!(fft_magnitude(&[]).is_empty());
    }

    #[test]
    fn test_moving_average_same() {
        let out = moving_average_same(&[3.0, 3.0, 3.0, 3.0, 3.0], 3);
        // edges see one zero-padded sample
        assert_eq!(out, vec![2.0, 3.0, 3.0, 3.0, 2.0]);

        let out = moving_average_same(&[1.0, 2.0, 3.0], 1);
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_welch_peak_and_shape() {
        let signal = tone(50.0, 1000.0, 4000);
        let (freqs, psd) = welch_psd(&signal, 1000.0, 1024);

        assert_eq!(freqs.len(), 513);
        assert_eq!(psd.len(), 513);
        assert_eq!(freqs[512], 500.0);
        let peak = freqs[argmax(&psd)];
        assert!((peak - 50.0).abs() < 1000.0 / 1024.0);
    }

    #[test]
    fn test_welch_integrates_to_signal_power() {
        // A unit sine has power 0.5; the one-sided density must integrate to it.
        let signal = tone(62.5, 1000.0, 4096);
        let (freqs, psd) = welch_psd(&signal, 1000.0, 1024);
        let df = freqs[1] - freqs[0];
        let power: f64 = psd.iter().sum::<f64>() * df;
        assert!((power - 0.5).abs() < 0.01, "power = {power}");
    }

    #[test]
    fn test_welch_short_signal() {
        let (freqs, psd) = welch_psd(&[1.0, 2.0, 3.0, 4.0], 4.0, 1024);
        assert_eq!(freqs.len(), 3);
        assert_eq!(psd.len(), 3);
        assert!(welch_psd(&[], 4.0, 16).0.is_empty());
    }

    #[test]
    fn test_butter_bandpass_sections() {
        let sos = butter_bandpass(4, 40.0, 80.0, 1000.0);
        assert_eq!(sos.len(), 4);
        for s in &sos {
            assert_eq!(s[3], 1.0);
            // stable: |pole|^2 < 1
            assert!(s[5] < 1.0 && s[5] > 0.0);
        }
    }

    #[test]
    fn test_bandpass_passes_band_and_rejects_outside() {
        let sos = butter_bandpass(4, 40.0, 80.0, 1000.0);
        let settle = 300;

        let pass = sosfilt(&sos, &tone(60.0, 1000.0, 2000));
        let low = sosfilt(&sos, &tone(10.0, 1000.0, 2000));
        let high = sosfilt(&sos, &tone(200.0, 1000.0, 2000));

        let pass_rms = rms(&pass[settle..]);
        assert!((pass_rms - 1.0 / 2f64.sqrt()).abs() < 0.05, "pass rms = {pass_rms}");
        assert!(rms(&low[settle..]) < 0.01);
        assert!(rms(&high[settle..]) < 0.01);
    }

    #[test]
    fn test_sosfilt_identity_section() {
        let identity: Section = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let signal = vec![1.0, -2.0, 3.5];
        assert_eq!(sosfilt(&[identity], &signal), signal);
    }

    #[test]
    fn test_sosfilt_impulse_response() {
        // y[n] = x[n] + 0.5 x[n-1] - 0.25 y[n-1], with a0 = 2 normalized away
        let section: Section = [2.0, 1.0, 0.0, 2.0, 0.5, 0.0];
        let out = sosfilt(&[section], &[1.0, 0.0, 0.0]);
        assert_eq!(out, vec![1.0, 0.25, -0.0625]);

        // two sections cascade
        let out = sosfilt(&[section, section], &[1.0, 0.0]);
        assert_eq!(out, vec![1.0, 0.5]);
    }
}
