//! Autocorrelation engine
//!
//! Owns the sequence, ROI, calibration and parameter bundle and dispatches
//! every operation. Each call returns a fresh result by value; a failing call
//! leaves previously returned results and the engine state untouched.

use crate::bandpass::FilterBank;
use crate::calibration::Calibration;
use crate::control::{CancelFlag, Control};
use crate::curve::CurveSet;
use crate::error::AcfError;
use crate::frame::{Frame, Sequence};
use crate::params::{AcfParams, StackMode, TemporalMode};
use crate::roi::Roi;
use crate::spatial::{spatial_acf, stack_acf};
use crate::temporal::{area_acf, pixel_acf, TemporalResult};
use crate::wavelength::{wavelength_acf, WavelengthResult};
use crate::Result;

/// Engine state shared by every operation
#[derive(Debug, Default)]
pub struct AcfEngine {
    sequence: Option<Sequence>,
    roi: Option<Roi>,
    calibration: Calibration,
    params: AcfParams,
    current_frame: usize,
    control: Control,
}

impl AcfEngine {
    /// Create an engine with default parameters and no data
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom parameter bundle
    pub fn with_params(params: AcfParams) -> Result<Self> {
        Ok(Self {
            params: params.validated()?,
            ..Self::default()
        })
    }

    pub fn params(&self) -> &AcfParams {
        &self.params
    }

    pub fn set_params(&mut self, params: AcfParams) -> Result<()> {
        self.params = params.validated()?;
        if let Some(roi) = self.roi.as_mut() {
            roi.shape = self.params.roi_shape;
        }
        Ok(())
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    /// Replace the frames, the current frame goes back to the first
    pub fn load_sequence(&mut self, sequence: Sequence) {
        log::info!(
            "Loaded {} frame(s) of {}x{}",
            sequence.len(),
            sequence.width(),
            sequence.height()
        );
        self.sequence = Some(sequence);
        self.current_frame = 0;
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some()
    }

    /// Number of frames, 0 without data
    pub fn stack_size(&self) -> usize {
        self.sequence.as_ref().map_or(0, Sequence::len)
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn set_current_frame(&mut self, index: usize) -> Result<()> {
        let frames = self.stack_size();
        if index >= frames {
            return Err(AcfError::InvalidParameter(format!(
                "frame {} does not exist, the sequence has {} frame(s)",
                index + 1,
                frames
            )));
        }
        self.current_frame = index;
        Ok(())
    }

    /// Use explicit ROI geometry, its shape becomes the configured shape
    pub fn set_roi(&mut self, roi: Roi) {
        self.params.roi_shape = roi.shape;
        self.roi = Some(roi);
    }

    /// Fall back to the default ROI centred on the frame
    pub fn clear_roi(&mut self) {
        self.roi = None;
    }

    /// The ROI an operation would use now
    pub fn roi(&self) -> Result<Roi> {
        match self.roi {
            Some(roi) => Ok(roi),
            None => {
                let sequence = self.require_sequence()?;
                Roi::centered_on(sequence.width(), sequence.height(), self.params.roi_shape)
            }
        }
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        self.control.cancel_flag()
    }

    /// Install a `(done, total)` progress callback
    pub fn set_progress<F>(&mut self, progress: F)
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.control = Control::new(self.control.cancel_flag().clone()).with_progress(progress);
    }

    /// Drop the loaded frames and the explicit ROI
    pub fn clear(&mut self) {
        self.sequence = None;
        self.roi = None;
        self.current_frame = 0;
    }

    fn require_sequence(&self) -> Result<&Sequence> {
        self.sequence.as_ref().ok_or(AcfError::EmptySequence)
    }

    fn current(&self) -> Result<&Frame> {
        self.require_sequence()?
            .frame(self.current_frame)
            .ok_or_else(|| {
                AcfError::InvalidParameter(format!(
                    "current frame {} is out of range",
                    self.current_frame + 1
                ))
            })
    }

    fn begin(&self) -> &Control {
        self.control.cancel_flag().reset();
        &self.control
    }

    /// Spatial ACF of the current frame, or of the whole stack per the stack mode
    pub fn spatial(&self) -> Result<CurveSet> {
        let sequence = self.require_sequence()?;
        if !self.params.use_fft && sequence.is_stack() {
            return Err(AcfError::NonFftOnStack {
                frames: sequence.len(),
            });
        }

        let roi = self.roi()?;
        match self.params.stack_mode {
            StackMode::None => spatial_acf(self.current()?, &roi, &self.calibration, &self.params),
            StackMode::All | StackMode::Mean => stack_acf(
                sequence,
                &roi,
                &self.calibration,
                &self.params,
                self.begin(),
            ),
        }
    }

    /// Temporal ACF in the configured mode
    pub fn temporal(&self) -> Result<TemporalResult> {
        match self.params.temporal_mode {
            TemporalMode::Pixels => self.pixel_temporal(),
            TemporalMode::Area => self.area_temporal(),
        }
    }

    pub fn pixel_temporal(&self) -> Result<TemporalResult> {
        let sequence = self.require_sequence()?;
        pixel_acf(
            sequence,
            &self.roi()?,
            &self.calibration,
            &self.params,
            self.begin(),
        )
    }

    pub fn area_temporal(&self) -> Result<TemporalResult> {
        let sequence = self.require_sequence()?;
        area_acf(
            sequence,
            &self.roi()?,
            &self.calibration,
            &self.params,
            self.begin(),
        )
    }

    pub fn wavelength(&self) -> Result<WavelengthResult> {
        let sequence = self.require_sequence()?;
        wavelength_acf(
            sequence,
            &self.roi()?,
            &self.calibration,
            &self.params,
            self.begin(),
        )
    }

    /// Filter bank the wavelength run would use for the current ROI
    pub fn filter_bank(&self) -> Result<FilterBank> {
        let roi = self.roi()?;
        FilterBank::new(
            roi.fft_size()?,
            self.params.spacing,
            self.params.requested_bands(),
            self.params.mask_mode(),
        )
    }
}
