//! Error and warning types shared by every autocorrelation operation

use thiserror::Error;

/// Conditions that abort a single requested operation.
///
/// A failed operation never mutates results returned by earlier calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcfError {
    /// Temporal and wavelength operations need at least two frames
    #[error("{operation} requires a stack, but the sequence has {frames} frame(s)")]
    StackRequired {
        operation: &'static str,
        frames: usize,
    },

    /// The brute-force spatial ACF is only offered for single images
    #[error("the non-FFT spatial ACF is not available for stacks ({frames} frames); enable FFT")]
    NonFftOnStack { frames: usize },

    #[error("the sequence contains no frames")]
    EmptySequence,

    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("invalid ROI: {0}")]
    InvalidRoi(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The padded transform would not fit in memory or in `usize`
    #[error("transform size {0} is too large")]
    TransformSize(usize),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Non-fatal conditions reported next to a result.
#[derive(Debug, Clone, PartialEq)]
pub enum AcfWarning {
    /// Horizontal and vertical pixel sizes differ; their average was used
    MismatchedPixelAspect { width: f64, height: f64, used: f64 },
    /// A calibration scalar was missing or zero, axis falls back to raw units
    CalibrationFallback { axis: &'static str, unit: String },
}

impl std::fmt::Display for AcfWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcfWarning::MismatchedPixelAspect {
                width,
                height,
                used,
            } => write!(
                f,
                "pixel width ({}) differs from pixel height ({}) in spatial calibration, average pixel length {} used instead",
                width, height, used
            ),
            AcfWarning::CalibrationFallback { axis, unit } => {
                write!(f, "{} axis is not calibrated, using {}", axis, unit)
            }
        }
    }
}
