//! Difference-of-Gaussian masks
//!
//! The weight at frequency `(u, v)` is
//! `(1 - exp(-(u² + v²) L²)) * exp(-(u² + v²) S²)`, where `S` and `L` are the
//! inverse widths of the band. The first band has `S = 0` (no high cut) and
//! the last has `L = 2` (no low cut beyond DC). DC always passes.

use super::SpacingScheme;

/// `(S, L)` of band `j` out of `k`
pub(super) fn scales(scheme: SpacingScheme, j: usize, k: usize, fft_size: usize) -> (f64, f64) {
    let half = (fft_size / 2) as f64;
    let k = k as f64;

    let small = if j == 0 {
        0.0
    } else {
        let j = j as f64;
        match scheme {
            SpacingScheme::PowerOf2 => 2f64.powf(j - 1.0) / half,
            SpacingScheme::Linear => j / (2.0 * k),
            SpacingScheme::Inverse => 2.0 / (k + 1.0 - j),
        }
    };

    let large = if (j + 1) as f64 == k {
        2.0
    } else {
        let j = j as f64;
        match scheme {
            SpacingScheme::PowerOf2 => 2f64.powf(j) / half,
            SpacingScheme::Linear => (j + 1.0) / (2.0 * k),
            SpacingScheme::Inverse => 2.0 / (k - j),
        }
    };

    (small, large)
}

/// Mask in natural layout
pub(super) fn mask(small: f64, large: f64, fft_size: usize) -> Vec<f64> {
    let n = fft_size;
    let half = n / 2;
    let scale_small = small * small;
    let scale_large = large * large;
    let gauss = |i: usize, scale: f64| (-((i * i) as f64) * scale).exp();

    let mut mask = vec![1.0; n * n];
    let mut set = |y: usize, x: usize, w: f64| mask[y * n + x] *= w;

    for i in 1..half {
        let row_large = gauss(i, scale_large);
        let row_small = gauss(i, scale_small);
        for col in 1..half {
            let col_large = gauss(col, scale_large);
            let col_small = gauss(col, scale_small);
            let factor = (1.0 - row_large * col_large) * row_small * col_small;
            set(i, col, factor);
            set(n - i, col, factor);
            set(i, n - col, factor);
            set(n - i, n - col, factor);
        }
    }

    // Nyquist row and column meet the axes
    let mid_large = gauss(half, scale_large);
    let mid_small = gauss(half, scale_small);
    set(0, half, (1.0 - mid_large) * mid_small);
    set(half, 0, (1.0 - mid_large) * mid_small);
    set(
        half,
        half,
        (1.0 - mid_large * mid_large) * mid_small * mid_small,
    );

    // row 0 and the Nyquist row
    for col in 1..half {
        let col_large = gauss(col, scale_large);
        let col_small = gauss(col, scale_small);
        set(0, col, (1.0 - col_large) * col_small);
        set(0, n - col, (1.0 - col_large) * col_small);
        let factor = (1.0 - col_large * mid_large) * col_small * mid_small;
        set(half, col, factor);
        set(half, n - col, factor);
    }

    // column 0 and the Nyquist column
    for i in 1..half {
        let row_large = gauss(i, scale_large);
        let row_small = gauss(i, scale_small);
        set(i, 0, (1.0 - row_large) * row_small);
        set(n - i, 0, (1.0 - row_large) * row_small);
        let factor = (1.0 - mid_large * row_large) * mid_small * row_small;
        set(i, half, factor);
        set(n - i, half, factor);
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales() {
        assert_eq!(scales(SpacingScheme::Linear, 0, 4, 16), (0.0, 0.125));
        assert_eq!(scales(SpacingScheme::Linear, 3, 4, 16), (0.375, 2.0));
        assert_eq!(scales(SpacingScheme::PowerOf2, 2, 5, 16), (0.25, 0.5));
        assert_eq!(scales(SpacingScheme::Inverse, 1, 4, 16), (0.5, 2.0 / 3.0));
    }

    #[test]
    fn test_dc_passes() {
        for j in 0..4 {
            let (s, l) = scales(SpacingScheme::Linear, j, 4, 16);
            assert_eq!(mask(s, l, 16)[0], 1.0);
        }
    }

    #[test]
    fn test_first_band_is_low_pass_shaped() {
        // S = 0 leaves only the 1 - exp(-f² L²) rise
        let (s, l) = scales(SpacingScheme::Linear, 0, 4, 16);
        let mask = mask(s, l, 16);
        let expected = 1.0 - (-(3.0f64 * 3.0) * l * l).exp();
        assert!((mask[3] - expected).abs() < 1e-12);
        assert!(mask[1] < mask[3]);
    }

    #[test]
    fn test_weights_are_bounded() {
        for j in 0..5 {
            let (s, l) = scales(SpacingScheme::PowerOf2, j, 5, 16);
            for w in mask(s, l, 16) {
                assert!((0.0..=1.0).contains(&w));
            }
        }
    }

    #[test]
    fn test_nyquist_corner() {
        let (s, l) = scales(SpacingScheme::Linear, 1, 4, 8);
        let mask = mask(s, l, 8);
        let mid_large = (-16.0 * l * l).exp();
        let mid_small = (-16.0 * s * s).exp();
        let expected = (1.0 - mid_large * mid_large) * mid_small * mid_small;
        assert!((mask[4 * 8 + 4] - expected).abs() < 1e-12);
    }
}
