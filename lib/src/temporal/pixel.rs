//! Pooled lag autocorrelation over every pixel of the ROI

use super::{lag_axis, lag_count, pixel_series, series_set, time_label, PooledLagAccumulator};
use crate::calibration::Calibration;
use crate::control::Control;
use crate::curve::CurveSet;
use crate::frame::Sequence;
use crate::params::AcfParams;
use crate::roi::Roi;
use crate::Result;

/// ACF curve plus the optional raw series it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalResult {
    pub acf: CurveSet,
    pub series: Option<CurveSet>,
}

/// Temporal ACF of the pixel series inside `roi`
pub fn pixel_acf(
    sequence: &Sequence,
    roi: &Roi,
    calibration: &Calibration,
    params: &AcfParams,
    control: &Control,
) -> Result<TemporalResult> {
    sequence.require_stack("pixel temporal ACF")?;
    control.check()?;

    let frames = sequence.len();
    log::info!(
        "Pixel temporal ACF: {} frames, ROI {}, {} lags",
        frames,
        roi,
        lag_count(frames)
    );

    let series = pixel_series(sequence, roi, params.centered_intensity);
    log::debug!("Extracted {} pixel series", series.len());

    let mut acc = PooledLagAccumulator::for_frames(frames);
    for s in &series {
        acc.add_series(&s.values);
    }
    let profile = acc.finish();

    let mut warnings = Vec::new();
    let time = calibration.time_axis(params.use_time_calibration, &mut warnings);

    let mut acf = CurveSet::new(
        "Pixel AutoCorrelation",
        time_label(&time),
        "AutoCorrelation",
        lag_axis(lag_count(frames), &time),
    );
    acf.push("AutoCorrelation".to_string(), profile.acf);
    acf.warnings = warnings.clone();

    let series = params.collect_series.then(|| {
        let mut set = series_set(
            "Pixel Intensities",
            "Intensity",
            &time,
            frames,
            series.into_iter().map(|s| (s.label(), s.values)),
        );
        set.warnings = warnings;
        set
    });

    control.report(1, 1);
    Ok(TemporalResult { acf, series })
}
