//! Dominant-frequency estimation over a decoded waveform.
//!
//! Short-time Fourier transform with Hann-windowed 2048-sample frames
//! at a 512-sample hop. The clip-level estimate is the frequency of the
//! single strongest spectral peak across all frames, refined by
//! parabolic interpolation over its neighboring bins. A clip whose
//! strongest peak is indistinguishable from silence estimates to `0.0`.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::EstimationError;

/// STFT frame length in samples.
const FFT_SIZE: usize = 2048;

/// Hop between successive frames in samples.
const HOP_SIZE: usize = 512;

/// Lower bound of the pitch search range in Hz. Excludes DC and rumble.
const FREQ_MIN_HZ: f64 = 20.0;

/// Upper bound of the pitch search range in Hz.
const FREQ_MAX_HZ: f64 = 4000.0;

/// Peak magnitudes at or below this are treated as silence.
const SILENCE_MAGNITUDE: f32 = 1e-6;

/// Estimate the dominant frequency of a mono clip in Hz.
///
/// Returns `0.0` when the clip carries no reliable pitch (silence or a
/// search range the sample rate cannot represent); callers map that to
/// a "no note detected" result rather than an error.
pub fn estimate_pitch(samples: &[f32], sample_rate: u32) -> Result<f64, EstimationError> {
    if samples.is_empty() {
        return Err(EstimationError::EmptySignal);
    }
    if sample_rate == 0 {
        return Err(EstimationError::InvalidSampleRate { rate: sample_rate });
    }

    let freq_resolution = sample_rate as f64 / FFT_SIZE as f64;
    let nyquist = FFT_SIZE / 2;
    let min_bin = ((FREQ_MIN_HZ / freq_resolution).ceil() as usize).max(1);
    let max_bin = ((FREQ_MAX_HZ / freq_resolution).floor() as usize).min(nyquist - 1);
    if min_bin > max_bin {
        return Ok(0.0);
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);

    let window: Vec<f32> = (0..FFT_SIZE)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos())
        })
        .collect();

    let mut best_magnitude: f32 = 0.0;
    // Winning bin plus the magnitudes around it, for interpolation
    let mut best_peak: Option<(usize, f32, f32, f32)> = None;

    let mut start = 0;
    loop {
        let end = samples.len().min(start + FFT_SIZE);
        let mut buffer: Vec<Complex<f32>> = samples[start..end]
            .iter()
            .zip(&window)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        buffer.resize(FFT_SIZE, Complex::new(0.0, 0.0));

        fft.process(&mut buffer);

        for i in min_bin..=max_bin {
            let magnitude = buffer[i].norm();
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best_peak = Some((i, buffer[i - 1].norm(), magnitude, buffer[i + 1].norm()));
            }
        }

        if start + FFT_SIZE >= samples.len() {
            break;
        }
        start += HOP_SIZE;
    }

    match best_peak {
        Some((bin, prev, peak, next)) if best_magnitude > SILENCE_MAGNITUDE => {
            Ok(refine_peak(bin, prev, peak, next) * freq_resolution)
        }
        _ => Ok(0.0),
    }
}

/// Parabolic interpolation of the peak position from the winning bin
/// and its two neighbors. Returns a fractional bin index.
fn refine_peak(bin: usize, prev: f32, peak: f32, next: f32) -> f64 {
    let denom = (prev - 2.0 * peak + next) as f64;
    let delta = if denom == 0.0 {
        0.0
    } else {
        (0.5 * (prev - next) as f64 / denom).clamp(-0.5, 0.5)
    };
    bin as f64 + delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f32, sample_rate: u32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin()
                        as f32
            })
            .collect()
    }

    #[test]
    fn estimates_concert_a() {
        let samples = sine(440.0, 0.5, 44100, 44100);
        let freq = estimate_pitch(&samples, 44100).unwrap();
        assert!((freq - 440.0).abs() < 5.0, "estimated {}", freq);
    }

    #[test]
    fn estimates_middle_c() {
        let samples = sine(261.63, 0.5, 44100, 44100);
        let freq = estimate_pitch(&samples, 44100).unwrap();
        assert!((freq - 261.63).abs() < 5.0, "estimated {}", freq);
    }

    #[test]
    fn estimates_low_e() {
        let samples = sine(82.41, 0.5, 44100, 44100);
        let freq = estimate_pitch(&samples, 44100).unwrap();
        assert!((freq - 82.41).abs() < 3.0, "estimated {}", freq);
    }

    #[test]
    fn estimates_at_reduced_sample_rates() {
        let samples = sine(200.0, 0.5, 8000, 8000);
        let freq = estimate_pitch(&samples, 8000).unwrap();
        assert!((freq - 200.0).abs() < 2.0, "estimated {}", freq);
    }

    #[test]
    fn short_clips_are_zero_padded() {
        let samples = sine(440.0, 0.5, 44100, 1000);
        let freq = estimate_pitch(&samples, 44100).unwrap();
        assert!((freq - 440.0).abs() < 15.0, "estimated {}", freq);
    }

    #[test]
    fn strongest_frame_wins() {
        // Quiet 220 Hz opening, loud 440 Hz ending: the clip-level
        // estimate follows the louder peak.
        let mut samples = sine(220.0, 0.05, 44100, 22050);
        samples.extend(sine(440.0, 0.8, 44100, 22050));
        let freq = estimate_pitch(&samples, 44100).unwrap();
        assert!((freq - 440.0).abs() < 5.0, "estimated {}", freq);
    }

    #[test]
    fn silence_estimates_to_zero() {
        let samples = vec![0.0f32; 44100];
        assert_eq!(estimate_pitch(&samples, 44100).unwrap(), 0.0);
    }

    #[test]
    fn empty_signal_is_an_error() {
        assert!(matches!(
            estimate_pitch(&[], 44100),
            Err(EstimationError::EmptySignal)
        ));
    }

    #[test]
    fn zero_sample_rate_is_an_error() {
        assert!(matches!(
            estimate_pitch(&[0.0; 16], 0),
            Err(EstimationError::InvalidSampleRate { rate: 0 })
        ));
    }
}
