//! Binary annulus masks

use super::SpacingScheme;
use crate::fft2d::swap_quadrants;

/// Inner and outer frequency radius of band `j` out of `k`
pub(super) fn edges(scheme: SpacingScheme, j: usize, k: usize, fft_size: usize) -> (f64, f64) {
    let n = fft_size as f64;
    let half = (fft_size / 2) as f64;

    let low = if j == 0 {
        0.0
    } else {
        match scheme {
            SpacingScheme::PowerOf2 => 2f64.powi(j as i32 - 1),
            SpacingScheme::Linear => half * j as f64 / k as f64,
            SpacingScheme::Inverse => n * inverse_edge(j, k) as f64,
        }
    };

    let high = if j + 1 == k {
        2.0 * n
    } else {
        match scheme {
            SpacingScheme::PowerOf2 => 2f64.powi(j as i32),
            SpacingScheme::Linear => half * (j + 1) as f64 / k as f64,
            SpacingScheme::Inverse => n * inverse_edge(j + 1, k) as f64,
        }
    };

    (low, high)
}

// single precision keeps cells that sit exactly on an edge on the same side
fn inverse_edge(j: usize, k: usize) -> f32 {
    let k = k as f32;
    1.0 / (k + 1.0 - j as f32) - 1.0 / (k + 1.0)
}

/// Mask in natural layout, both edges inclusive
///
/// Power-of-2 band 0 passes only DC, every other Power-of-2 band blocks DC.
pub(super) fn mask(
    scheme: SpacingScheme,
    j: usize,
    low: f64,
    high: f64,
    fft_size: usize,
) -> Vec<f64> {
    let half = (fft_size / 2) as f64;
    let center = (fft_size / 2) * fft_size + fft_size / 2;
    let mut mask = vec![1.0; fft_size * fft_size];

    // built around the centre, then moved to natural layout
    for a in 0..fft_size {
        for b in 0..fft_size {
            let index = a * fft_size + b;
            let radius = (a as f64 - half).hypot(b as f64 - half);
            let outside = radius < low || radius > high;

            let blocked = match scheme {
                SpacingScheme::PowerOf2 if j == 0 => index != center,
                SpacingScheme::PowerOf2 => outside || index == center,
                SpacingScheme::Linear | SpacingScheme::Inverse => outside,
            };
            if blocked {
                mask[index] = 0.0;
            }
        }
    }

    swap_quadrants(&mut mask, fft_size);
    mask
}
