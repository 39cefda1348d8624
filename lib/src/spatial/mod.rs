//! Spatial autocorrelation of one frame or of every frame of a stack

pub mod fourier;
pub mod naive;
pub mod stack;

use crate::binning::RadialBinner;
use crate::calibration::{AxisScale, Calibration};
use crate::curve::CurveSet;
use crate::frame::Frame;
use crate::params::AcfParams;
use crate::roi::Roi;
use crate::utils::axis_label;
use crate::Result;

pub use fourier::FourierAcf;
pub use naive::naive_profile;
pub use stack::stack_acf;

/// Bin radii scaled to the spatial calibration
pub fn radius_axis(roi: &Roi, space: &AxisScale) -> Vec<f64> {
    RadialBinner::new(roi.radius)
        .radii()
        .into_iter()
        .map(|r| space.apply(r))
        .collect()
}

/// Spatial ACF of a single frame
pub fn spatial_acf(
    frame: &Frame,
    roi: &Roi,
    calibration: &Calibration,
    params: &AcfParams,
) -> Result<CurveSet> {
    log::info!(
        "Spatial ACF ({}): ROI {}, {} bins",
        if params.use_fft { "FFT" } else { "exact" },
        roi,
        roi.bin_count()
    );

    let profile = if params.use_fft {
        FourierAcf::new(roi)?.profile(frame, roi)?
    } else {
        naive_profile(frame, roi)?
    };

    let mut warnings = Vec::new();
    let space = calibration.spatial_axis(params.use_spatial_calibration, &mut warnings);

    let mut set = CurveSet::new(
        "AutoCorrelation",
        axis_label("Radius", &space),
        "AutoCorrelation",
        radius_axis(roi, &space),
    );
    set.push("AutoCorrelation".to_string(), profile);
    set.warnings = warnings;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiShape;
    use std::f64::consts::PI;

    #[test]
    fn test_both_methods_agree_on_flat_frame() {
        let frame = Frame::filled(64, 64, 10.0).unwrap();
        let roi = Roi::new(32.0, 32.0, 16.0, RoiShape::Circle).unwrap();

        let fft = spatial_acf(&frame, &roi, &Calibration::default(), &AcfParams::default())
            .unwrap();
        let exact = spatial_acf(
            &frame,
            &roi,
            &Calibration::default(),
            &AcfParams {
                use_fft: false,
                ..AcfParams::default()
            },
        )
        .unwrap();

        assert_eq!(fft.bin_count(), 12);
        for (a, b) in fft.curves[0].y.iter().zip(&exact.curves[0].y) {
            assert!((a - 1.0).abs() < 1e-12);
            assert!((a - b).abs() < 1e-2);
        }
    }

    #[test]
    fn test_both_methods_agree_on_inner_bins() {
        // first half of the bins, where the exact scan still has many pairs
        let frames = [
            Frame::from_fn(64, 64, |x, _| (2.0 * PI * x as f64 / 8.0).cos()).unwrap(),
            Frame::from_fn(64, 64, |x, y| {
                (2.0 * PI * x as f64 / 10.0).cos() * (2.0 * PI * y as f64 / 14.0).cos()
            })
            .unwrap(),
        ];
        let roi = Roi::new(32.0, 32.0, 16.0, RoiShape::Circle).unwrap();

        for frame in &frames {
            let fft = FourierAcf::new(&roi).unwrap().profile(frame, &roi).unwrap();
            let exact = naive_profile(frame, &roi).unwrap();
            assert_eq!(fft.len(), 12);
            for k in 0..=6 {
                assert!(
                    (fft[k] - exact[k]).abs() < 0.1,
                    "bin {}: {} vs {}",
                    k,
                    fft[k],
                    exact[k]
                );
            }
        }
    }

    #[test]
    fn test_calibrated_radius_axis() {
        let frame = Frame::filled(32, 32, 1.0).unwrap();
        let roi = Roi::new(16.0, 16.0, 8.0, RoiShape::Circle).unwrap();
        let calibration = Calibration::spatial(0.25, "um");
        let set = spatial_acf(&frame, &roi, &calibration, &AcfParams::default()).unwrap();

        assert_eq!(set.x_label, "Radius [um]");
        assert_eq!(set.bin_count(), 6);
        assert!((set.x[5] - 2.0).abs() < 1e-12);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_uncalibrated_radius_axis() {
        let frame = Frame::filled(32, 32, 1.0).unwrap();
        let roi = Roi::new(16.0, 16.0, 8.0, RoiShape::Square).unwrap();
        let set = spatial_acf(&frame, &roi, &Calibration::default(), &AcfParams::default())
            .unwrap();
        assert_eq!(set.x_label, "Radius [pixels]");
        assert!((set.x[5] - 8.0).abs() < 1e-12);
        assert_eq!(set.warnings.len(), 1);
    }
}
