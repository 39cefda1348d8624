//! Spatial ACF of every frame of a stack

use super::{naive_profile, radius_axis, FourierAcf};
use crate::calibration::{AxisScale, Calibration};
use crate::control::Control;
use crate::curve::CurveSet;
use crate::error::AcfError;
use crate::frame::Sequence;
use crate::params::{AcfParams, StackMode};
use crate::roi::Roi;
use crate::utils::{axis_label, format_with_unit};
use crate::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Heading of frame `index` (0-based): elapsed time or 1-based index
pub fn frame_label(index: usize, time: &AxisScale) -> String {
    if time.calibrated {
        format_with_unit(time.apply(index as f64), &time.unit)
    } else {
        (index + 1).to_string()
    }
}

/// One curve per frame, or their mean with [`StackMode::Mean`]
///
/// Stacks always go through the FFT, a single frame may use either method.
/// Frames are processed in parallel, each into its own slot.
pub fn stack_acf(
    sequence: &Sequence,
    roi: &Roi,
    calibration: &Calibration,
    params: &AcfParams,
    control: &Control,
) -> Result<CurveSet> {
    if !params.use_fft && sequence.is_stack() {
        return Err(AcfError::NonFftOnStack {
            frames: sequence.len(),
        });
    }

    let total = sequence.len();
    // the exact method only gets here with a single frame
    let fourier = if params.use_fft {
        Some(FourierAcf::new(roi)?)
    } else {
        None
    };
    log::info!(
        "Stack spatial ACF ({}): {} frames, ROI {}, mode {}",
        if params.use_fft { "FFT" } else { "exact" },
        total,
        roi,
        params.stack_mode
    );

    let done = AtomicUsize::new(0);
    let profiles = sequence
        .frames()
        .par_iter()
        .enumerate()
        .map(|(index, frame)| -> Result<Vec<f64>> {
            control.check()?;
            let profile = match &fourier {
                Some(fourier) => fourier.profile(frame, roi)?,
                None => naive_profile(frame, roi)?,
            };
            log::debug!("Frame {} of {} done", index + 1, total);
            control.report(done.fetch_add(1, Ordering::SeqCst) + 1, total);
            Ok(profile)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut warnings = Vec::new();
    let space = calibration.spatial_axis(params.use_spatial_calibration, &mut warnings);
    let time = calibration.time_axis(params.use_time_calibration, &mut warnings);

    let mut set = CurveSet::new(
        "AutoCorrelation",
        axis_label("Radius", &space),
        "AutoCorrelation",
        radius_axis(roi, &space),
    );
    for (index, profile) in profiles.into_iter().enumerate() {
        set.push(frame_label(index, &time), profile);
    }
    set.warnings = warnings;

    Ok(match params.stack_mode {
        StackMode::Mean => set.into_mean("Mean AutoCorrelation", "AutoCorrelation"),
        StackMode::All | StackMode::None => set,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CancelFlag;
    use crate::frame::Frame;
    use crate::roi::RoiShape;
    use std::f64::consts::PI;

    fn stripes(period: f64) -> Frame {
        Frame::from_fn(48, 48, |x, _| (2.0 * PI * x as f64 / period).cos()).unwrap()
    }

    fn mixed_stack() -> Sequence {
        Sequence::new(vec![
            Frame::filled(48, 48, 4.0).unwrap(),
            stripes(8.0),
            stripes(12.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_all_curves_in_frame_order() {
        let roi = Roi::new(24.0, 24.0, 12.0, RoiShape::Circle).unwrap();
        let params = AcfParams {
            stack_mode: StackMode::All,
            ..AcfParams::default()
        };
        let set = stack_acf(
            &mixed_stack(),
            &roi,
            &Calibration::default(),
            &params,
            &Control::default(),
        )
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.curves[0].label, "1");
        assert_eq!(set.curves[2].label, "3");
        assert!(set.curves[0].y.iter().all(|&v| v == 1.0));
        for curve in &set.curves {
            assert_eq!(curve.y[0], 1.0);
        }
        let (min, max) = set.extrema().unwrap();
        assert!(min < 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_mean_curve() {
        let roi = Roi::new(24.0, 24.0, 12.0, RoiShape::Circle).unwrap();
        let sequence = mixed_stack();
        let all = stack_acf(
            &sequence,
            &roi,
            &Calibration::default(),
            &AcfParams {
                stack_mode: StackMode::All,
                ..AcfParams::default()
            },
            &Control::default(),
        )
        .unwrap();
        let mean = stack_acf(
            &sequence,
            &roi,
            &Calibration::default(),
            &AcfParams {
                stack_mode: StackMode::Mean,
                ..AcfParams::default()
            },
            &Control::default(),
        )
        .unwrap();

        assert_eq!(mean.len(), 1);
        assert_eq!(mean.title, "Mean AutoCorrelation");
        for i in 0..mean.bin_count() {
            let expected = all.curves.iter().map(|c| c.y[i]).sum::<f64>() / 3.0;
            assert!((mean.curves[0].y[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_time_labels() {
        let time = AxisScale {
            scale: 0.5,
            unit: "s".to_string(),
            calibrated: true,
        };
        assert_eq!(frame_label(0, &time), "0 s");
        assert_eq!(frame_label(3, &time), "1.5000 s");
    }

    #[test]
    fn test_exact_method_rejected_on_stack() {
        let roi = Roi::new(24.0, 24.0, 12.0, RoiShape::Circle).unwrap();
        let params = AcfParams {
            use_fft: false,
            stack_mode: StackMode::All,
            ..AcfParams::default()
        };
        let err = stack_acf(
            &mixed_stack(),
            &roi,
            &Calibration::default(),
            &params,
            &Control::default(),
        )
        .unwrap_err();
        assert_eq!(err, AcfError::NonFftOnStack { frames: 3 });
    }

    #[test]
    fn test_single_frame_honours_exact_method() {
        let frame = crate::synthetic::speckle(64, 64, 4.0, 5).unwrap();
        let roi = Roi::new(32.0, 32.0, 16.0, RoiShape::Circle).unwrap();
        let exact = naive_profile(&frame, &roi).unwrap();
        let fourier = FourierAcf::new(&roi).unwrap().profile(&frame, &roi).unwrap();
        assert_ne!(exact, fourier);

        let sequence = Sequence::single(frame);
        for mode in [StackMode::All, StackMode::Mean] {
            let params = AcfParams {
                use_fft: false,
                stack_mode: mode,
                ..AcfParams::default()
            };
            let set = stack_acf(
                &sequence,
                &roi,
                &Calibration::default(),
                &params,
                &Control::default(),
            )
            .unwrap();
            assert_eq!(set.len(), 1);
            assert_eq!(set.curves[0].y, exact);
        }
    }

    #[test]
    fn test_cancelled_run() {
        let flag = CancelFlag::new();
        flag.cancel();
        let roi = Roi::new(24.0, 24.0, 12.0, RoiShape::Circle).unwrap();
        let err = stack_acf(
            &mixed_stack(),
            &roi,
            &Calibration::default(),
            &AcfParams::default(),
            &Control::new(flag),
        )
        .unwrap_err();
        assert_eq!(err, AcfError::Cancelled);
    }
}
