//! Temporal (lag) autocorrelation over a stack
//!
//! Every series contributes its mean-subtracted lag products to one shared
//! sum per lag, with a shared pair count. The sums are divided once at the end
//! and normalized by the lag-0 value: a pooled ACF, not an average of
//! per-series curves.

pub mod area;
pub mod pixel;

use crate::calibration::AxisScale;
use crate::curve::CurveSet;
use crate::frame::{Frame, Sequence};
use crate::normalize::normalize_to_zero_lag;
use crate::roi::Roi;
use rayon::prelude::*;

pub use area::area_acf;
pub use pixel::{pixel_acf, TemporalResult};

/// Number of lags evaluated for a sequence of `frames` frames
pub fn lag_count(frames: usize) -> usize {
    frames / 2
}

/// Pooled lag-product sums
#[derive(Debug, Clone, PartialEq)]
pub struct PooledLagAccumulator {
    sums: Vec<f64>,
    counts: Vec<usize>,
    power_sum: f64,
    samples: usize,
}

/// Normalized pooled ACF and its raw zero-lag value
#[derive(Debug, Clone, PartialEq)]
pub struct LagProfile {
    pub acf: Vec<f64>,
    pub zero_lag: f64,
}

impl PooledLagAccumulator {
    pub fn new(lags: usize) -> Self {
        Self {
            sums: vec![0.0; lags],
            counts: vec![0; lags],
            power_sum: 0.0,
            samples: 0,
        }
    }

    /// Accumulator for series `frames` samples long
    pub fn for_frames(frames: usize) -> Self {
        Self::new(lag_count(frames))
    }

    pub fn lags(&self) -> usize {
        self.sums.len()
    }

    /// Add one series, centred on its own mean
    pub fn add_series(&mut self, series: &[f64]) {
        let n = series.len();
        if n == 0 {
            return;
        }
        let mean = series.iter().sum::<f64>() / n as f64;

        for (lag, (sum, count)) in self.sums.iter_mut().zip(&mut self.counts).enumerate() {
            if lag >= n {
                break;
            }
            for t in 0..n - lag {
                *sum += (series[t] - mean) * (series[t + lag] - mean);
                *count += 1;
            }
        }

        self.power_sum += series.iter().map(|v| v * v).sum::<f64>();
        self.samples += n;
    }

    /// Divide by the pair counts and normalize by lag 0
    pub fn finish(self) -> LagProfile {
        let mut acf: Vec<f64> = self
            .sums
            .iter()
            .zip(&self.counts)
            .map(|(sum, count)| sum / *count as f64)
            .collect();

        let reference = if self.samples == 0 {
            0.0
        } else {
            self.power_sum / self.samples as f64
        };
        let zero_lag = normalize_to_zero_lag(&mut acf, reference);

        LagProfile { acf, zero_lag }
    }
}

/// Time series of one ROI position
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSeries {
    pub x: i64,
    pub y: i64,
    pub values: Vec<f64>,
}

impl PixelSeries {
    pub fn label(&self) -> String {
        format!("({};{})", self.x, self.y)
    }
}

/// Per-position series for every ROI member inside the frame
///
/// With `centered`, each frame's ROI mean is subtracted first.
pub fn pixel_series(sequence: &Sequence, roi: &Roi, centered: bool) -> Vec<PixelSeries> {
    let members: Vec<_> = roi
        .members()
        .into_iter()
        .filter(|p| {
            p.x >= 0
                && p.y >= 0
                && (p.x as usize) < sequence.width()
                && (p.y as usize) < sequence.height()
        })
        .collect();

    let rows: Vec<Vec<f64>> = sequence
        .frames()
        .par_iter()
        .map(|frame: &Frame| {
            let offset = if centered { frame.roi_mean(roi) } else { 0.0 };
            members
                .iter()
                .map(|p| frame.get(p.x, p.y).unwrap_or(f64::NAN) - offset)
                .collect()
        })
        .collect();

    members
        .iter()
        .enumerate()
        .map(|(k, p)| PixelSeries {
            x: p.x,
            y: p.y,
            values: rows.iter().map(|row| row[k]).collect(),
        })
        .collect()
}

/// Lag axis, `i * dt` when calibrated
pub fn lag_axis(lags: usize, time: &AxisScale) -> Vec<f64> {
    (0..lags).map(|i| time.apply(i as f64)).collect()
}

/// Frame axis of raw series, 1-based index or `i * dt`
pub fn frame_axis(frames: usize, time: &AxisScale) -> Vec<f64> {
    (0..frames)
        .map(|i| {
            if time.calibrated {
                time.apply(i as f64)
            } else {
                (i + 1) as f64
            }
        })
        .collect()
}

pub(crate) fn time_label(time: &AxisScale) -> String {
    format!("Time [{}]", time.unit)
}

/// Intensity series as a curve family over the frame axis
pub(crate) fn series_set(
    title: &str,
    y_label: &str,
    time: &AxisScale,
    frames: usize,
    series: impl IntoIterator<Item = (String, Vec<f64>)>,
) -> CurveSet {
    let mut set = CurveSet::new(title, time_label(time), y_label, frame_axis(frames, time));
    for (label, values) in series {
        set.push(label, values);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::roi::RoiShape;
    use std::f64::consts::PI;

    #[test]
    fn test_three_point_sine() {
        // sin(2 pi t / 3) for t = 0, 1, 2 has zero mean
        let series: Vec<f64> = (0..3).map(|t| (2.0 * PI * t as f64 / 3.0).sin()).collect();
        let mut acc = PooledLagAccumulator::new(2);
        acc.add_series(&series);
        let profile = acc.finish();

        assert!((profile.zero_lag - 0.5).abs() < 1e-12);
        assert!((profile.acf[0] - 1.0).abs() < 1e-12);
        // (s0 s1 + s1 s2) / 2 = -0.375, over 0.5
        assert!((profile.acf[1] + 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_pooling_weights_pairs() {
        let mut acc = PooledLagAccumulator::new(2);
        acc.add_series(&[1.0, -1.0, 1.0, -1.0]);
        acc.add_series(&[2.0, 2.0, -2.0, -2.0]);
        let profile = acc.finish();

        // lag 0: (4 + 16) / 8, lag 1: (-3 + 4) / 6
        assert!((profile.zero_lag - 2.5).abs() < 1e-12);
        assert!((profile.acf[1] - (1.0 / 6.0) / 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_is_all_ones() {
        let mut acc = PooledLagAccumulator::for_frames(6);
        acc.add_series(&[10.0; 6]);
        acc.add_series(&[3.0; 6]);
        let profile = acc.finish();
        assert_eq!(profile.acf, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_lag_count() {
        assert_eq!(lag_count(3), 1);
        assert_eq!(lag_count(10), 5);
        assert_eq!(PooledLagAccumulator::for_frames(7).lags(), 3);
    }

    #[test]
    fn test_pixel_series_extraction() {
        let frames = (0..3)
            .map(|t| Frame::from_fn(8, 8, |x, y| (x + 10 * y + 100 * t) as f64).unwrap())
            .collect();
        let sequence = Sequence::new(frames).unwrap();
        let roi = Roi::new(4.0, 4.0, 1.0, RoiShape::Square).unwrap();

        let series = pixel_series(&sequence, &roi, false);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].x, 3);
        assert_eq!(series[0].y, 3);
        assert_eq!(series[0].values, vec![33.0, 133.0, 233.0]);
        assert_eq!(series[0].label(), "(3;3)");

        let centered = pixel_series(&sequence, &roi, true);
        // ROI mean of frame 0 is (33 + 34 + 43 + 44) / 4
        assert!((centered[0].values[0] - (33.0 - 38.5)).abs() < 1e-12);
    }

    #[test]
    fn test_axes() {
        let raw = AxisScale {
            scale: 1.0,
            unit: "picture".to_string(),
            calibrated: false,
        };
        let seconds = AxisScale {
            scale: 0.5,
            unit: "s".to_string(),
            calibrated: true,
        };
        assert_eq!(lag_axis(3, &raw), vec![0.0, 1.0, 2.0]);
        assert_eq!(lag_axis(3, &seconds), vec![0.0, 0.5, 1.0]);
        assert_eq!(frame_axis(3, &raw), vec![1.0, 2.0, 3.0]);
        assert_eq!(frame_axis(3, &seconds), vec![0.0, 0.5, 1.0]);
    }
}
