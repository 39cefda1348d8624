//! Brute-force spatial autocorrelation
//!
//! Every pair `(p, q)` with `|p - c| + |q - p| <= mR` contributes
//! `(I(p) - mean) * (I(q) - mean)` to the bin of `|q - p|`. The support of
//! every pair stays inside the disk, whatever the ROI shape. Cost grows with
//! the fourth power of the radius.

use crate::binning::RadialBinner;
use crate::error::AcfError;
use crate::frame::Frame;
use crate::normalize::normalize_to_zero_lag;
use crate::roi::Roi;
use crate::Result;

/// Offsets `k - mR` for `k = 0..=floor(2 mR)`, the scan grid of one axis
fn grid_offsets(radius: f64) -> Vec<f64> {
    let steps = (2.0 * radius).floor() as usize;
    (0..=steps).map(|k| k as f64 - radius).collect()
}

/// Binned, zero-lag normalized ACF of `frame` inside `roi`
pub fn naive_profile(frame: &Frame, roi: &Roi) -> Result<Vec<f64>> {
    let stats = frame.roi_statistics(roi);
    if stats.count == 0 {
        return Err(AcfError::InvalidRoi(format!("{} lies outside the frame", roi)));
    }

    let mr = roi.radius;
    let binner = RadialBinner::new(mr);
    let mut acc = binner.accumulator();
    let offsets = grid_offsets(mr);
    let sample = |x: f64, y: f64| frame.get(x.floor() as i64, y.floor() as i64);

    for &oy in &offsets {
        for &ox in &offsets {
            let radius = ox.hypot(oy);
            if radius > mr {
                continue;
            }
            let px = roi.center_x + ox;
            let py = roi.center_y + oy;
            let Some(vp) = sample(px, py) else {
                continue;
            };
            let vp = vp - stats.mean;

            // |q - p| never exceeds what is left of the radius
            let reach = mr - radius;
            for &dy in offsets.iter().filter(|d| d.abs() <= reach) {
                for &dx in offsets.iter().filter(|d| d.abs() <= reach) {
                    let lag = dx.hypot(dy);
                    if radius + lag > mr {
                        continue;
                    }
                    let Some(bin) = binner.bin_index(lag) else {
                        continue;
                    };
                    if let Some(vq) = sample(px + dx, py + dy) {
                        acc.add(bin, vp * (vq - stats.mean));
                    }
                }
            }
        }
    }

    let mut profile = acc.finish();
    normalize_to_zero_lag(&mut profile, stats.mean_square);
    Ok(profile)
}
