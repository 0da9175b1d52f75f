//! MFCC feature extraction from PCM audio.
//!
//! Front-end for voice fingerprinting: pre-emphasis, Hann-windowed frames,
//! FFT power spectrum, mel filterbank, log, DCT-II. A clip is summarized
//! as one fixed-length vector by averaging coefficients across frames, so
//! the output dimension depends only on the configured coefficient count.

mod fft;
mod mel;

use crate::audio::wav;
use crate::config::FeatureConfig;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Trait for feature extractors.
///
/// This is the seam the flows are exercised through in tests; the production
/// implementation is [`MfccExtractor`].
pub trait FeatureExtractor {
    /// Extract one fixed-length feature vector from the audio file at `source`.
    fn extract(&self, source: &Path) -> Result<Vec<f32>>;
}

/// MFCC extractor configured once and reused across files
pub struct MfccExtractor {
    config: FeatureConfig,
}

impl MfccExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Compute the time-averaged MFCC vector of a mono clip.
    ///
    /// Frame geometry is derived from the clip's own sample rate, so clips
    /// of any rate or duration summarize to `num_coeffs` values.
    pub fn summarize(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let frames = self.frame_coefficients(samples, sample_rate)?;
        let count = frames.len() as f64;

        let mut mean = vec![0.0f64; self.config.num_coeffs];
        for frame in &frames {
            for (acc, &coeff) in mean.iter_mut().zip(frame) {
                *acc += coeff;
            }
        }

        Ok(mean.into_iter().map(|v| (v / count) as f32).collect())
    }

    /// Per-frame MFCCs as `[T][num_coeffs]`; `T >= 1` on success
    fn frame_coefficients(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Vec<f64>>> {
        let cfg = &self.config;
        let window_size = (sample_rate as u64 * cfg.window_ms as u64 / 1000) as usize;
        let hop_size = (sample_rate as u64 * cfg.hop_ms as u64 / 1000) as usize;

        if window_size == 0 || hop_size == 0 {
            bail!(
                "Analysis window of {} ms / {} ms hop is empty at {} Hz",
                cfg.window_ms,
                cfg.hop_ms,
                sample_rate
            );
        }
        if samples.len() < window_size {
            bail!(
                "Audio too short for analysis: {} samples, window needs {}",
                samples.len(),
                window_size
            );
        }

        let fft_size = window_size.next_power_of_two();
        let bins = fft_size / 2 + 1;
        let window = mel::hann_window(window_size);
        let bank = mel::filter_bank(
            cfg.num_filters,
            fft_size,
            sample_rate as f64,
            cfg.low_freq_hz,
            sample_rate as f64 / 2.0,
        );
        let dct = mel::dct_basis(cfg.num_coeffs, cfg.num_filters);

        let num_frames = (samples.len() - window_size) / hop_size + 1;
        let mut frames = Vec::with_capacity(num_frames);
        let mut real = vec![0.0f64; fft_size];
        let mut imag = vec![0.0f64; fft_size];

        for t in 0..num_frames {
            let start = t * hop_size;

            // Pre-emphasis + windowing
            for i in 0..window_size {
                let mut s = samples[start + i] as f64;
                if start + i > 0 {
                    s -= cfg.pre_emphasis * samples[start + i - 1] as f64;
                }
                real[i] = s * window[i];
            }
            for v in real[window_size..].iter_mut() {
                *v = 0.0;
            }
            for v in imag.iter_mut() {
                *v = 0.0;
            }

            fft::forward(&mut real, &mut imag);

            let power: Vec<f64> = (0..bins)
                .map(|i| real[i] * real[i] + imag[i] * imag[i])
                .collect();

            let log_mel: Vec<f64> = bank
                .iter()
                .map(|weights| {
                    let energy: f64 = weights.iter().zip(&power).map(|(w, p)| w * p).sum();
                    energy.max(1e-10).ln()
                })
                .collect();

            let coeffs: Vec<f64> = dct
                .iter()
                .map(|basis| basis.iter().zip(&log_mel).map(|(b, m)| b * m).sum())
                .collect();

            frames.push(coeffs);
        }

        Ok(frames)
    }
}

impl FeatureExtractor for MfccExtractor {
    fn extract(&self, source: &Path) -> Result<Vec<f32>> {
        let (samples, sample_rate) = wav::read_mono(source)
            .with_context(|| format!("Failed to load audio: {}", source.display()))?;
        self.summarize(&samples, sample_rate)
    }
}
