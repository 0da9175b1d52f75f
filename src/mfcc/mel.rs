//! Mel-scale filterbank, analysis window, and DCT basis.

use std::f64::consts::PI;

/// Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank as `[num_filters][fft_size / 2 + 1]` weights.
///
/// Triangles are anchored at mel-spaced edge frequencies in Hz and sampled
/// at each FFT bin's center frequency, so weights vary smoothly with the
/// FFT resolution instead of snapping to integer bins.
pub fn filter_bank(
    num_filters: usize,
    fft_size: usize,
    sample_rate: f64,
    low_hz: f64,
    high_hz: f64,
) -> Vec<Vec<f64>> {
    let bins = fft_size / 2 + 1;
    let low_mel = hz_to_mel(low_hz);
    let high_mel = hz_to_mel(high_hz);

    // num_filters + 2 edge frequencies, equally spaced on the mel scale
    let edges: Vec<f64> = (0..num_filters + 2)
        .map(|i| mel_to_hz(low_mel + (high_mel - low_mel) * i as f64 / (num_filters + 1) as f64))
        .collect();

    let hz_per_bin = sample_rate / fft_size as f64;
    let mut bank = Vec::with_capacity(num_filters);

    for m in 0..num_filters {
        let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
        let mut weights = vec![0.0f64; bins];

        for (k, w) in weights.iter_mut().enumerate() {
            let freq = k as f64 * hz_per_bin;
            if freq > left && freq < right {
                *w = if freq <= center {
                    (freq - left) / (center - left)
                } else {
                    (right - freq) / (right - center)
                };
            }
        }
        bank.push(weights);
    }

    bank
}

/// Orthonormal DCT-II basis as `[num_coeffs][num_inputs]`
pub fn dct_basis(num_coeffs: usize, num_inputs: usize) -> Vec<Vec<f64>> {
    let n = num_inputs as f64;
    (0..num_coeffs)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            (0..num_inputs)
                .map(|i| scale * (PI * k as f64 * (i as f64 + 0.5) / n).cos())
                .collect()
        })
        .collect()
}
