//! Zero-lag normalization shared by spatial and temporal curves

/// Zero-lag power below this fraction of the raw signal power counts as zero variance.
pub const ZERO_VARIANCE_RATIO: f64 = 1e-12;

/// Whether a zero-lag value carries no fluctuation relative to `reference_power`
pub fn is_zero_variance(zero_lag: f64, reference_power: f64) -> bool {
    if zero_lag.is_nan() {
        return false;
    }
    zero_lag == 0.0 || zero_lag.abs() <= ZERO_VARIANCE_RATIO * reference_power.abs()
}

/// Divide every value by the first one and return that first value.
///
/// A zero-variance signal is perfectly self-similar, every populated value
/// becomes 1.0. NaN entries (empty bins) are left untouched and a NaN zero-lag
/// value propagates to the whole curve.
pub fn normalize_to_zero_lag(values: &mut [f64], reference_power: f64) -> f64 {
    let Some(&zero_lag) = values.first() else {
        return f64::NAN;
    };

    if is_zero_variance(zero_lag, reference_power) {
        for v in values.iter_mut().filter(|v| !v.is_nan()) {
            *v = 1.0;
        }
    } else {
        for v in values.iter_mut() {
            *v /= zero_lag;
        }
    }

    zero_lag
}

/// Rescale a curve so its first value is exactly 1.0
///
/// Curves whose first value is zero or not finite are left as they are.
pub fn anchor_first(values: &mut [f64]) {
    let Some(&first) = values.first() else {
        return;
    };
    if first != 0.0 && first.is_finite() {
        for v in values.iter_mut() {
            *v /= first;
        }
    }
}

/// Elementwise mean of equally long curves, NaN in any input stays NaN
pub fn mean_curve(curves: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = curves.first() else {
        return Vec::new();
    };

    let mut mean = vec![0.0; first.len()];
    for curve in curves {
        for (m, v) in mean.iter_mut().zip(curve) {
            *m += v;
        }
    }
    let n = curves.len() as f64;
    mean.iter_mut().for_each(|m| *m /= n);
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_regular_curve() {
        let mut values = vec![4.0, 2.0, -1.0];
        let zero_lag = normalize_to_zero_lag(&mut values, 10.0);
        assert_eq!(zero_lag, 4.0);
        assert_eq!(values, vec![1.0, 0.5, -0.25]);
    }

    #[test]
    fn test_zero_variance_becomes_ones() {
        let mut values = vec![0.0, 0.0, f64::NAN, 0.0];
        normalize_to_zero_lag(&mut values, 100.0);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 1.0);
        assert!(values[2].is_nan());
        assert_eq!(values[3], 1.0);

        // rounding residue of a constant signal
        let mut values = vec![1e-30, -1e-31];
        normalize_to_zero_lag(&mut values, 0.01);
        assert_eq!(values, vec![1.0, 1.0]);
    }

    #[test]
    fn test_nan_zero_lag_propagates() {
        let mut values = vec![f64::NAN, 1.0];
        let zero_lag = normalize_to_zero_lag(&mut values, 1.0);
        assert!(zero_lag.is_nan());
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_anchor_first() {
        let mut values = vec![0.8, 0.4, f64::NAN];
        anchor_first(&mut values);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 0.5);
        assert!(values[2].is_nan());

        let mut values = vec![f64::NAN, 0.4];
        anchor_first(&mut values);
        assert_eq!(values[1], 0.4);
    }

    #[test]
    fn test_mean_curve() {
        let mean = mean_curve(&[vec![1.0, 2.0], vec![3.0, f64::NAN]]);
        assert_eq!(mean[0], 2.0);
        assert!(mean[1].is_nan());
        assert!(mean_curve(&[]).is_empty());
    }
}
