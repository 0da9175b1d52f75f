//! Iterative radix-2 FFT over split real/imaginary buffers.

use std::f64::consts::PI;

/// In-place forward FFT.
///
/// `real` and `imag` must share the same power-of-two length.
pub fn forward(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    debug_assert_eq!(n, imag.len());
    debug_assert!(n.is_power_of_two());
    if n <= 1 {
        return;
    }

    bit_reverse(real, imag);

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = -2.0 * PI / len as f64;

        for base in (0..n).step_by(len) {
            for k in 0..half {
                let (sin, cos) = (step * k as f64).sin_cos();
                let i = base + k;
                let j = i + half;

                let tr = cos * real[j] - sin * imag[j];
                let ti = cos * imag[j] + sin * real[j];
                real[j] = real[i] - tr;
                imag[j] = imag[i] - ti;
                real[i] += tr;
                imag[i] += ti;
            }
        }
        len *= 2;
    }
}

fn bit_reverse(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            real.swap(i, j);
            imag.swap(i, j);
        }
    }
}
