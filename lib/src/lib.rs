//! Autocorrelation Library
//!
//! Spatial and temporal autocorrelation of the pixel intensities inside a
//! circular or square region of an image or image stack. Provides radial
//! spatial ACF (brute force or through the power spectrum), pooled lag ACF
//! over pixel and area series, and a wavelength-resolved ACF built on a bank
//! of radial bandpass filters.

pub mod bandpass;
pub mod binning;
pub mod calibration;
pub mod control;
pub mod curve;
pub mod engine;
pub mod error;
pub mod fft2d;
pub mod frame;
pub mod normalize;
pub mod params;
pub mod roi;
pub mod spatial;
pub mod synthetic;
pub mod temporal;
pub mod utils;
pub mod wavelength;

pub use bandpass::{FilterBand, FilterBank, MaskMode, SpacingScheme};
pub use calibration::Calibration;
pub use control::{CancelFlag, Control};
pub use curve::{CurveSet, RadialCurve};
pub use engine::AcfEngine;
pub use error::{AcfError, AcfWarning};
pub use frame::{Frame, Sequence};
pub use num_complex::Complex64;
pub use params::{AcfParams, BandResolution, StackMode, TemporalMode};
pub use roi::{Roi, RoiShape};
pub use rustfft; // Re-export rustfft for external use if needed
pub use temporal::TemporalResult;
pub use wavelength::WavelengthResult;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging when the `env_logger` feature is enabled.
pub fn init() {
    #[cfg(feature = "env_logger")]
    {
        let _ = env_logger::try_init();
    }
}

/// Result type for autocorrelation operations
pub type Result<T> = std::result::Result<T, AcfError>;
