//! Parameter bundle handed to the engine

use crate::bandpass::{MaskMode, SpacingScheme};
use crate::error::AcfError;
use crate::roi::RoiShape;
use crate::Result;
use std::fmt;
use std::str::FromStr;

/// How a stack is reduced by the spatial operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMode {
    /// Only the current frame
    #[default]
    None,
    /// One curve per frame
    All,
    /// Elementwise mean of the per-frame curves
    Mean,
}

impl StackMode {
    pub fn all() -> &'static [StackMode] {
        &[StackMode::None, StackMode::All, StackMode::Mean]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StackMode::None => "none",
            StackMode::All => "all",
            StackMode::Mean => "mean",
        }
    }
}

impl fmt::Display for StackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StackMode {
    type Err = AcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "single" | "off" => Ok(StackMode::None),
            "all" => Ok(StackMode::All),
            "mean" | "average" => Ok(StackMode::Mean),
            _ => Err(AcfError::InvalidParameter(format!(
                "unknown stack mode '{}', expected none, all or mean",
                s
            ))),
        }
    }
}

/// Source of the temporal series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalMode {
    /// Pooled over every pixel of the ROI
    #[default]
    Pixels,
    /// One series per growing sub-ROI mean
    Area,
}

impl TemporalMode {
    pub fn name(&self) -> &'static str {
        match self {
            TemporalMode::Pixels => "pixels",
            TemporalMode::Area => "area",
        }
    }
}

impl FromStr for TemporalMode {
    type Err = AcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pixels" | "pixel" => Ok(TemporalMode::Pixels),
            "area" => Ok(TemporalMode::Area),
            _ => Err(AcfError::InvalidParameter(format!(
                "unknown temporal mode '{}', expected pixels or area",
                s
            ))),
        }
    }
}

/// Requested number of wavelength bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandResolution {
    Count(usize),
    /// Band width as a percentage of the spectrum
    StepPercent(f64),
}

impl Default for BandResolution {
    fn default() -> Self {
        BandResolution::Count(10)
    }
}

impl BandResolution {
    /// Band count before the spacing scheme gets a say
    pub fn band_count(&self) -> usize {
        match *self {
            BandResolution::Count(k) => k,
            BandResolution::StepPercent(p) => match p {
                p if p == 2.0 => 50,
                p if p == 4.0 => 25,
                p if p == 5.0 => 20,
                p if p == 10.0 => 10,
                p if p == 20.0 => 5,
                p if p == 25.0 => 4,
                p if p == 50.0 => 2,
                p => (100.0 / p).round().max(1.0) as usize,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            BandResolution::Count(0) => Err(AcfError::InvalidParameter(
                "band count must be at least 1".to_string(),
            )),
            BandResolution::StepPercent(p) if !(p > 0.0 && p <= 100.0) => {
                Err(AcfError::InvalidParameter(format!(
                    "band step must be in (0, 100] percent, got {}",
                    p
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Every switch of an autocorrelation run
#[derive(Debug, Clone, PartialEq)]
pub struct AcfParams {
    /// Wiener-Khinchin spatial ACF instead of the brute-force scan
    pub use_fft: bool,
    pub roi_shape: RoiShape,
    pub stack_mode: StackMode,
    pub temporal_mode: TemporalMode,
    pub spacing: SpacingScheme,
    pub resolution: BandResolution,
    pub smooth_bandpass: bool,
    pub use_spatial_calibration: bool,
    pub use_time_calibration: bool,
    /// Subtract each frame's ROI mean before building pixel series
    pub centered_intensity: bool,
    /// Also return the extracted intensity series
    pub collect_series: bool,
    /// Keep the filtered frames of this band
    pub display_band: Option<usize>,
    /// Keep the centred band masks
    pub export_masks: bool,
}

impl Default for AcfParams {
    fn default() -> Self {
        Self {
            use_fft: true,
            roi_shape: RoiShape::Circle,
            stack_mode: StackMode::None,
            temporal_mode: TemporalMode::Pixels,
            spacing: SpacingScheme::PowerOf2,
            resolution: BandResolution::default(),
            smooth_bandpass: false,
            use_spatial_calibration: true,
            use_time_calibration: true,
            centered_intensity: false,
            collect_series: false,
            display_band: None,
            export_masks: false,
        }
    }
}

impl AcfParams {
    /// Check the bundle, returns it unchanged when valid
    pub fn validated(self) -> Result<Self> {
        self.resolution.validate()?;
        Ok(self)
    }

    pub fn mask_mode(&self) -> MaskMode {
        if self.smooth_bandpass {
            MaskMode::Smooth
        } else {
            MaskMode::Hard
        }
    }

    /// Requested band count, Power-of-2 spacing overrides it later
    pub fn requested_bands(&self) -> usize {
        self.resolution.band_count()
    }
}

/// Ready-made parameter bundles
pub mod presets {
    use super::*;

    /// Preset information structure
    pub struct PresetInfo {
        pub id: usize,
        pub name: &'static str,
        pub description: &'static str,
        pub params: AcfParams,
    }

    /// FFT spatial ACF, single frame
    pub fn quick() -> AcfParams {
        AcfParams::default()
    }

    /// Brute-force spatial ACF, single image only
    pub fn exact_single_image() -> AcfParams {
        AcfParams {
            use_fft: false,
            ..AcfParams::default()
        }
    }

    /// Mean spatial ACF over every frame
    pub fn stack_mean() -> AcfParams {
        AcfParams {
            stack_mode: StackMode::Mean,
            ..AcfParams::default()
        }
    }

    /// Linear bands at 10 % steps with smooth masks
    pub fn wavelength_scan() -> AcfParams {
        AcfParams {
            spacing: SpacingScheme::Linear,
            resolution: BandResolution::StepPercent(10.0),
            smooth_bandpass: true,
            ..AcfParams::default()
        }
    }

    /// List all presets with detailed info
    pub fn list_presets() -> Vec<PresetInfo> {
        vec![
            PresetInfo {
                id: 0,
                name: "Quick",
                description: "FFT, single frame",
                params: quick(),
            },
            PresetInfo {
                id: 1,
                name: "Exact",
                description: "Brute-force scan, single image",
                params: exact_single_image(),
            },
            PresetInfo {
                id: 2,
                name: "Stack Mean",
                description: "FFT, mean curve over the stack",
                params: stack_mean(),
            },
            PresetInfo {
                id: 3,
                name: "Wavelength Scan",
                description: "Linear spacing, 10 bands, smooth masks",
                params: wavelength_scan(),
            },
        ]
    }

    /// Get preset by ID
    pub fn get_preset_by_id(id: usize) -> Option<AcfParams> {
        list_presets()
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.params)
    }
}
