//! Spatial autocorrelation through the power spectrum
//!
//! The ROI is mean-subtracted and centred in a zero-padded power-of-two
//! square, samples outside the ROI footprint stay at zero. The square is
//! twice the ROI transform size so that lags up to the diameter never wrap.
//! The inverse transform of the power spectrum gives the summed lag
//! products, which are divided by the number of overlapping pairs (the
//! autocorrelation of the footprint), scaled to the zero-lag variance and
//! binned around the buffer centre.

use crate::binning::RadialBinner;
use crate::error::AcfError;
use crate::fft2d::{swap_quadrants, Fft2d};
use crate::frame::Frame;
use crate::normalize::{anchor_first, is_zero_variance};
use crate::roi::Roi;
use crate::Result;

/// Planned transform for one ROI size
pub struct FourierAcf {
    fft: Fft2d,
}

impl FourierAcf {
    /// Plan for twice the smallest power-of-two square holding the ROI diameter
    pub fn new(roi: &Roi) -> Result<Self> {
        let size = 2 * roi.fft_size()?;
        log::debug!("FFT size {} for ROI radius {}", size, roi.radius);
        Ok(Self {
            fft: Fft2d::new(size)?,
        })
    }

    pub fn size(&self) -> usize {
        self.fft.size()
    }

    /// Binned ACF of `frame` inside `roi`, `y[0] == 1` unless bin 0 is empty
    pub fn profile(&self, frame: &Frame, roi: &Roi) -> Result<Vec<f64>> {
        let size = self.size();
        let (buffer, reference) = padded_roi(frame, roi, size)?;

        let mut acf = self.fft.autocorrelation(&buffer)?;
        let mut pairs = self.fft.autocorrelation(&padded_footprint(frame, roi, size))?;
        swap_quadrants(&mut acf, size);
        swap_quadrants(&mut pairs, size);

        let center = (size / 2) * size + size / 2;
        let zero_lag = acf[center];
        let variance = if is_zero_variance(zero_lag, reference) {
            None
        } else {
            Some(zero_lag / pairs[center].round())
        };

        for (value, &count) in acf.iter_mut().zip(&pairs) {
            let count = count.round();
            *value = match variance {
                _ if count < 1.0 => f64::NAN,
                Some(variance) => *value / count / variance,
                None => 1.0,
            };
        }

        let mut profile = bin_around_center(&acf, size, roi.radius);
        anchor_first(&mut profile);
        Ok(profile)
    }
}

/// Mean-subtracted ROI centred in a `size` x `size` zero buffer
///
/// Also returns the raw signal energy, used to detect a flat ROI.
pub fn padded_roi(frame: &Frame, roi: &Roi, size: usize) -> Result<(Vec<f64>, f64)> {
    let stats = frame.roi_statistics(roi);
    if stats.count == 0 {
        return Err(AcfError::InvalidRoi(format!("{} lies outside the frame", roi)));
    }

    let mut buffer = vec![0.0; size * size];
    for point in roi.members() {
        if let Some(value) = frame.get(point.x, point.y) {
            let (px, py) = roi.padded_position(&point, size);
            buffer[py * size + px] = value - stats.mean;
        }
    }

    Ok((buffer, stats.mean_square * stats.count as f64))
}

/// 1.0 where [`padded_roi`] places a sample, 0.0 elsewhere
fn padded_footprint(frame: &Frame, roi: &Roi, size: usize) -> Vec<f64> {
    let mut footprint = vec![0.0; size * size];
    for point in roi.members() {
        if frame.get(point.x, point.y).is_some() {
            let (px, py) = roi.padded_position(&point, size);
            footprint[py * size + px] = 1.0;
        }
    }
    footprint
}

/// Radial profile of a recentred grid within `radius` of its centre
///
/// The box `[N/2 - mR, N/2 + mR]` is scanned in unit steps, both ends included.
/// The centre cell and NaN cells are left out.
pub fn bin_around_center(grid: &[f64], size: usize, radius: f64) -> Vec<f64> {
    let binner = RadialBinner::new(radius);
    let mut acc = binner.accumulator();
    let half = (size / 2) as f64;
    let steps = (2.0 * radius).floor() as usize;

    for j in 0..=steps {
        let b = half - radius + j as f64;
        for i in 0..=steps {
            let a = half - radius + i as f64;
            if a < 0.0 || b < 0.0 || a >= size as f64 || b >= size as f64 {
                continue;
            }
            let distance = (a - half).hypot(b - half);
            let value = grid[b as usize * size + a as usize];
            if distance == 0.0 || value.is_nan() {
                continue;
            }
            acc.add_at(&binner, distance, value);
        }
    }

    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiShape;
    use std::f64::consts::PI;

    #[test]
    fn test_constant_frame_is_all_ones() {
        let frame = Frame::filled(64, 64, 10.0).unwrap();
        for shape in [RoiShape::Circle, RoiShape::Square] {
            let roi = Roi::new(32.0, 32.0, 16.0, shape).unwrap();
            let acf = FourierAcf::new(&roi).unwrap();
            assert_eq!(acf.size(), 64);
            let profile = acf.profile(&frame, &roi).unwrap();
            assert_eq!(profile.len(), 12);
            assert!(profile.iter().all(|&v| (v - 1.0).abs() < 1e-12));
        }
    }

    #[test]
    fn test_circle_footprint_is_masked() {
        let frame = Frame::from_fn(32, 32, |x, y| (x * y) as f64).unwrap();
        let roi = Roi::new(16.0, 16.0, 6.0, RoiShape::Circle).unwrap();
        let (buffer, _) = padded_roi(&frame, &roi, 16).unwrap();
        // corners of the bounding box lie outside the disk
        assert_eq!(buffer[2 * 16 + 2], 0.0);
        assert_ne!(buffer[8 * 16 + 8], 0.0);

        let square = Roi::new(16.0, 16.0, 6.0, RoiShape::Square).unwrap();
        let (buffer, _) = padded_roi(&frame, &square, 16).unwrap();
        assert_ne!(buffer[2 * 16 + 2], 0.0);
    }

    #[test]
    fn test_stripes_anticorrelate_at_half_period() {
        let frame = Frame::from_fn(64, 64, |x, _| (2.0 * PI * x as f64 / 8.0).cos()).unwrap();
        let roi = Roi::new(32.0, 32.0, 16.0, RoiShape::Circle).unwrap();
        let profile = FourierAcf::new(&roi).unwrap().profile(&frame, &roi).unwrap();
        assert_eq!(profile[0], 1.0);
        assert!(profile[2] < 0.0);
    }

    #[test]
    fn test_bin_around_center_includes_box_edges() {
        let size = 8;
        let grid: Vec<f64> = (0..size * size)
            .map(|i| {
                let (x, y) = ((i % size) as f64 - 4.0, (i / size) as f64 - 4.0);
                x.hypot(y)
            })
            .collect();
        let profile = bin_around_center(&grid, size, 4.0);
        assert_eq!(profile.len(), 3);
        // bin 2 holds radii in [4, 5.33)
        assert!(profile[2] >= 4.0 && profile[2] < 16.0 / 3.0);
    }

    #[test]
    fn test_bin_around_center_skips_zero_lag() {
        let size = 8;
        let mut grid = vec![0.5; size * size];
        grid[4 * size + 4] = 1.0e6;
        grid[4 * size + 5] = f64::NAN;
        let profile = bin_around_center(&grid, size, 4.0);
        assert_eq!(profile, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_pair_counts_follow_footprint() {
        let frame = Frame::filled(64, 64, 1.0).unwrap();
        let roi = Roi::new(32.0, 32.0, 16.0, RoiShape::Square).unwrap();
        let fourier = FourierAcf::new(&roi).unwrap();
        let size = fourier.size();
        let mut pairs = fourier
            .fft
            .autocorrelation(&padded_footprint(&frame, &roi, size))
            .unwrap();
        swap_quadrants(&mut pairs, size);

        // a 32 x 32 square shifted by (dx, 0) overlaps on (32 - dx) columns
        let center = (size / 2) * size + size / 2;
        assert!((pairs[center] - 1024.0).abs() < 1e-6);
        assert!((pairs[center + 8] - 768.0).abs() < 1e-6);
        assert!((pairs[center + 31] - 32.0).abs() < 1e-6);
    }
}
