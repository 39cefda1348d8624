//! Frame and sequence storage
//!
//! Frames are immutable grids of intensity samples held in double precision.
//! The engine only reads them: sample access, ROI statistics and ROI
//! extraction all go through the helpers in this module.

use crate::error::AcfError;
use crate::roi::{Roi, ScanPoint};
use crate::Result;

/// Immutable 2-D grid of intensity samples, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

/// Mean and mean square of the samples of an ROI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiStatistics {
    pub mean: f64,
    pub mean_square: f64,
    pub count: usize,
}

impl Frame {
    /// Create a frame from row-major samples
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AcfError::InvalidParameter(format!(
                "frame dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(AcfError::InvalidParameter(format!(
                "frame of {}x{} needs {} samples, got {}",
                width,
                height,
                width * height,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame where every sample has the same value
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self> {
        Self::new(width, height, vec![value; width * height])
    }

    /// Build a frame by evaluating `f(x, y)` at every sample
    pub fn from_fn<F: Fn(usize, usize) -> f64>(width: usize, height: usize, f: F) -> Result<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Convert single-precision samples (e.g. a decoded grayscale image)
    pub fn from_f32(width: usize, height: usize, data: &[f32]) -> Result<Self> {
        Self::new(width, height, data.iter().map(|&v| v as f64).collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sample at integer coordinates, `None` outside the frame
    pub fn get(&self, x: i64, y: i64) -> Option<f64> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize])
    }

    /// ROI members that fall inside the frame, with their samples
    pub fn roi_samples(&self, roi: &Roi) -> Vec<(ScanPoint, f64)> {
        roi.members()
            .into_iter()
            .filter_map(|p| self.get(p.x, p.y).map(|v| (p, v)))
            .collect()
    }

    /// Mean and mean square of the samples covered by the ROI
    pub fn roi_statistics(&self, roi: &Roi) -> RoiStatistics {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut count = 0usize;

        for (_, v) in self.roi_samples(roi) {
            sum += v;
            sum_sq += v * v;
            count += 1;
        }

        if count == 0 {
            return RoiStatistics {
                mean: f64::NAN,
                mean_square: f64::NAN,
                count,
            };
        }

        RoiStatistics {
            mean: sum / count as f64,
            mean_square: sum_sq / count as f64,
            count,
        }
    }

    /// Mean intensity inside the ROI
    pub fn roi_mean(&self, roi: &Roi) -> f64 {
        self.roi_statistics(roi).mean
    }
}

/// Ordered list of frames sharing the same dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    frames: Vec<Frame>,
}

impl Sequence {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let first = frames.first().ok_or(AcfError::EmptySequence)?;
        let (width, height) = (first.width, first.height);

        for (index, frame) in frames.iter().enumerate() {
            if frame.width != width || frame.height != height {
                return Err(AcfError::DimensionMismatch {
                    index,
                    width: frame.width,
                    height: frame.height,
                    expected_width: width,
                    expected_height: height,
                });
            }
        }

        Ok(Self { frames })
    }

    /// Sequence holding one still image
    pub fn single(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false, a sequence holds at least one frame
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_stack(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn width(&self) -> usize {
        self.frames[0].width
    }

    pub fn height(&self) -> usize {
        self.frames[0].height
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Fail fast when an operation needs several frames
    pub fn require_stack(&self, operation: &'static str) -> Result<()> {
        if self.is_stack() {
            Ok(())
        } else {
            Err(AcfError::StackRequired {
                operation,
                frames: self.len(),
            })
        }
    }
}
