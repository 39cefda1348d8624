//! Temporal ACF of the mean intensity inside growing sub-ROIs

use super::pixel::TemporalResult;
use super::{lag_axis, lag_count, series_set, time_label, PooledLagAccumulator};
use crate::calibration::Calibration;
use crate::control::Control;
use crate::curve::CurveSet;
use crate::error::AcfError;
use crate::frame::Sequence;
use crate::params::AcfParams;
use crate::roi::Roi;
use crate::utils::format_with_unit;
use crate::Result;
use rayon::prelude::*;

/// One ACF curve per integer radius `r = 1..=floor(mR)`
///
/// Each curve is the lag autocorrelation of the ROI-mean time series of the
/// radius-`r` sub-ROI sharing the centre and shape of `roi`.
pub fn area_acf(
    sequence: &Sequence,
    roi: &Roi,
    calibration: &Calibration,
    params: &AcfParams,
    control: &Control,
) -> Result<TemporalResult> {
    sequence.require_stack("area temporal ACF")?;

    let radii = roi.radius.floor() as usize;
    if radii == 0 {
        return Err(AcfError::InvalidRoi(format!(
            "area ACF needs a radius of at least 1, got {}",
            roi.radius
        )));
    }

    let frames = sequence.len();
    log::info!(
        "Area temporal ACF: {} frames, {} radii, ROI {}",
        frames,
        radii,
        roi
    );

    let mut warnings = Vec::new();
    let time = calibration.time_axis(params.use_time_calibration, &mut warnings);
    let space = calibration.spatial_axis(params.use_spatial_calibration, &mut warnings);

    let mut acf = CurveSet::new(
        "Area AutoCorrelation",
        time_label(&time),
        "AutoCorrelation",
        lag_axis(lag_count(frames), &time),
    );
    let mut series = Vec::new();

    for r in 1..=radii {
        control.check()?;

        let sub_roi = roi.with_radius(r as f64)?;
        let means: Vec<f64> = sequence
            .frames()
            .par_iter()
            .map(|frame| frame.roi_mean(&sub_roi))
            .collect();

        let mut acc = PooledLagAccumulator::for_frames(frames);
        acc.add_series(&means);
        let profile = acc.finish();
        log::debug!("Radius {}: zero lag {}", r, profile.zero_lag);

        let label = if space.calibrated {
            format!("R = {}", format_with_unit(space.apply(r as f64), &space.unit))
        } else {
            format!("R = {} px", r)
        };
        acf.push(label.clone(), profile.acf);
        if params.collect_series {
            series.push((label, means));
        }

        control.report(r, radii);
    }

    acf.warnings = warnings.clone();
    let series = params.collect_series.then(|| {
        let mut set = series_set(
            "Area Intensities",
            "Area Average Intensity",
            &time,
            frames,
            series,
        );
        set.warnings = warnings;
        set
    });

    Ok(TemporalResult { acf, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::roi::RoiShape;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn flicker_stack() -> Sequence {
        let frames = (0..6)
            .map(|t| Frame::filled(20, 20, if t % 2 == 0 { 3.0 } else { 1.0 }).unwrap())
            .collect();
        Sequence::new(frames).unwrap()
    }

    #[test]
    fn test_one_curve_per_radius() {
        let roi = Roi::new(10.0, 10.0, 4.7, RoiShape::Circle).unwrap();
        let result = area_acf(
            &flicker_stack(),
            &roi,
            &Calibration::default(),
            &AcfParams::default(),
            &Control::default(),
        )
        .unwrap();

        assert_eq!(result.acf.len(), 4);
        assert_eq!(result.acf.curves[0].label, "R = 1 px");
        assert_eq!(result.acf.curves[3].label, "R = 4 px");
        for curve in &result.acf.curves {
            assert_eq!(curve.y.len(), 3);
            assert_eq!(curve.y[0], 1.0);
            assert!((curve.y[1] + 1.0).abs() < 1e-12);
            assert!((curve.y[2] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_calibrated_labels_and_series() {
        let roi = Roi::new(10.0, 10.0, 2.0, RoiShape::Square).unwrap();
        let calibration = Calibration::spatial(0.5, "um");
        let params = AcfParams {
            collect_series: true,
            ..AcfParams::default()
        };
        let result = area_acf(&flicker_stack(), &roi, &calibration, &params, &Control::default())
            .unwrap();

        assert_eq!(result.acf.curves[0].label, "R = 0.5000 um");
        assert_eq!(result.acf.curves[1].label, "R = 1 um");
        let series = result.series.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.curves[0].y, vec![3.0, 1.0, 3.0, 1.0, 3.0, 1.0]);
        assert_eq!(series.y_label, "Area Average Intensity");
    }

    #[test]
    fn test_progress_per_radius() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let control = Control::default().with_progress(move |_, total| {
            assert_eq!(total, 3);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let roi = Roi::new(10.0, 10.0, 3.0, RoiShape::Circle).unwrap();
        area_acf(
            &flicker_stack(),
            &roi,
            &Calibration::default(),
            &AcfParams::default(),
            &control,
        )
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_sub_pixel_radius_is_rejected() {
        let roi = Roi::new(10.0, 10.0, 0.5, RoiShape::Circle).unwrap();
        let err = area_acf(
            &flicker_stack(),
            &roi,
            &Calibration::default(),
            &AcfParams::default(),
            &Control::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcfError::InvalidRoi(_)));
    }
}
