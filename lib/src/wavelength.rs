//! Wavelength-resolved temporal ACF
//!
//! Each band of a [`FilterBank`] is applied to the spectrum of every frame.
//! The band-filtered ROI pixels form one series per pixel and the pooled lag
//! ACF of those series is the band's curve. Its raw zero-lag value is the
//! band amplitude.

use crate::bandpass::FilterBank;
use crate::calibration::Calibration;
use crate::control::Control;
use crate::curve::CurveSet;
use crate::error::AcfError;
use crate::fft2d::Fft2d;
use crate::frame::Sequence;
use crate::params::AcfParams;
use crate::roi::{Roi, ScanPoint};
use crate::spatial::fourier::padded_roi;
use crate::temporal::{lag_axis, lag_count, series_set, time_label, PooledLagAccumulator};
use crate::utils::format_with_unit;
use crate::Result;
use rayon::prelude::*;

/// Band-filtered frames of one band, `size` x `size` each
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredStack {
    pub band: usize,
    pub size: usize,
    pub frames: Vec<Vec<f64>>,
}

/// Everything produced by one wavelength run
#[derive(Debug, Clone)]
pub struct WavelengthResult {
    /// One lag curve per band
    pub acf: CurveSet,
    /// Zero-lag power per band over the band wavelength, band 0 omitted
    pub amplitude: CurveSet,
    /// Filtered pixel series of the display band
    pub series: Option<CurveSet>,
    pub filtered: Option<FilteredStack>,
    /// DC-centred masks, one per band
    pub masks: Option<Vec<Vec<f64>>>,
    pub bank: FilterBank,
}

/// Centre wavelength of band `j`, `(j + 0.5) * mR / K` in pixels
pub fn band_wavelength(j: usize, bands: usize, radius: f64) -> f64 {
    (j as f64 + 0.5) * radius / bands as f64
}

/// Run the filter bank over the stack
pub fn wavelength_acf(
    sequence: &Sequence,
    roi: &Roi,
    calibration: &Calibration,
    params: &AcfParams,
    control: &Control,
) -> Result<WavelengthResult> {
    sequence.require_stack("wavelength-resolved ACF")?;

    let size = roi.fft_size()?;
    let bank = FilterBank::new(size, params.spacing, params.requested_bands(), params.mask_mode())?
        .with_masks();
    let bands = bank.len();

    if let Some(band) = params.display_band {
        if band >= bands {
            return Err(AcfError::InvalidParameter(format!(
                "display band {} does not exist, the run has {} bands",
                band + 1,
                bands
            )));
        }
    }

    let frames = sequence.len();
    log::info!(
        "Wavelength ACF: {} frames, FFT size {}, {} {} bands ({} masks), ROI {}",
        frames,
        size,
        bands,
        bank.scheme(),
        bank.mode().name(),
        roi
    );

    let fft = Fft2d::new(size)?;
    let members = roi.members();
    let padded: Vec<Vec<f64>> = sequence
        .frames()
        .par_iter()
        .map(|frame| padded_roi(frame, roi, size).map(|(buffer, _)| buffer))
        .collect::<Result<Vec<_>>>()?;

    let mut warnings = Vec::new();
    let time = calibration.time_axis(params.use_time_calibration, &mut warnings);
    let space = calibration.spatial_axis(params.use_spatial_calibration, &mut warnings);

    let mut acf = CurveSet::new(
        "Wavelength AutoCorrelation",
        time_label(&time),
        "AutoCorrelation",
        lag_axis(lag_count(frames), &time),
    );
    let mut amplitudes = Vec::with_capacity(bands);
    let mut series = None;
    let mut filtered = None;

    for j in 0..bands {
        control.check()?;

        let keep_frames = params.display_band == Some(j);
        let outputs: Vec<(Vec<f64>, Option<Vec<f64>>)> = padded
            .par_iter()
            .map(|buffer| -> Result<(Vec<f64>, Option<Vec<f64>>)> {
                control.check()?;
                let image = filter_frame(&fft, &bank, j, buffer)?;
                let row = sample_members(&members, roi, &image, size);
                Ok((row, keep_frames.then_some(image)))
            })
            .collect::<Result<Vec<_>>>()?;

        let (rows, images): (Vec<Vec<f64>>, Vec<Option<Vec<f64>>>) = outputs.into_iter().unzip();

        let mut acc = PooledLagAccumulator::for_frames(frames);
        let mut pixel_values = Vec::with_capacity(members.len());
        for k in 0..members.len() {
            let values: Vec<f64> = rows.iter().map(|row| row[k]).collect();
            acc.add_series(&values);
            pixel_values.push(values);
        }
        let profile = acc.finish();
        log::debug!(
            "Band {} of {}: amplitude {}",
            j + 1,
            bands,
            profile.zero_lag
        );

        let wavelength = space.apply(band_wavelength(j, bands, roi.radius));
        acf.push(format_with_unit(wavelength, &space.unit), profile.acf);
        amplitudes.push(profile.zero_lag);

        if keep_frames {
            filtered = Some(FilteredStack {
                band: j,
                size,
                frames: images.into_iter().flatten().collect(),
            });
        }
        if params.collect_series && j == params.display_band.unwrap_or(0) {
            series = Some(series_set(
                "Filtered Pixel Intensities",
                "Intensity",
                &time,
                frames,
                members
                    .iter()
                    .zip(pixel_values)
                    .map(|(p, values)| (format!("({};{})", p.x, p.y), values)),
            ));
        }

        control.report(j + 1, bands);
    }

    let amplitude_x: Vec<f64> = (1..bands)
        .map(|j| space.apply(band_wavelength(j, bands, roi.radius)))
        .collect();
    let mut amplitude = CurveSet::new(
        "Amplitude",
        format!("Wavelength [{}]", space.unit),
        "Amplitude",
        amplitude_x,
    );
    amplitude.push("Amplitude".to_string(), amplitudes.into_iter().skip(1).collect());

    let masks = params
        .export_masks
        .then(|| (0..bands).map(|j| bank.centered_mask(j)).collect());

    acf.warnings = warnings.clone();
    amplitude.warnings = warnings.clone();
    if let Some(set) = series.as_mut() {
        set.warnings = warnings;
    }

    log::info!("Wavelength ACF finished over {} bands", bands);
    Ok(WavelengthResult {
        acf,
        amplitude,
        series,
        filtered,
        masks,
        bank,
    })
}

/// Forward transform, band mask, inverse transform
fn filter_frame(fft: &Fft2d, bank: &FilterBank, band: usize, buffer: &[f64]) -> Result<Vec<f64>> {
    let mut spectrum = fft.from_real(buffer)?;
    fft.forward(&mut spectrum)?;
    bank.apply(band, &mut spectrum)?;
    fft.inverse(&mut spectrum)?;
    Ok(spectrum.iter().map(|c| c.re).collect())
}

fn sample_members(members: &[ScanPoint], roi: &Roi, image: &[f64], size: usize) -> Vec<f64> {
    members
        .iter()
        .map(|p| {
            let (px, py) = roi.padded_position(p, size);
            image[py * size + px]
        })
        .collect()
}
