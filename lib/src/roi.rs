//! Region of interest geometry
//!
//! The ROI is supplied by the caller as a centre, a radius and a shape. All
//! operations walk the ROI through the same scan so that pixel membership is
//! identical for means, crops, series extraction and filtered read-back.

use crate::error::AcfError;
use crate::Result;
use std::fmt;
use std::str::FromStr;

/// Largest padded transform side accepted by the engine.
pub const MAX_FFT_SIZE: usize = 1 << 14;

/// Shape of the region over which the ACF is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoiShape {
    /// Disk of the given radius (default)
    #[default]
    Circle,
    /// Axis-aligned square of side `2 * radius`
    Square,
}

impl fmt::Display for RoiShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RoiShape {
    type Err = AcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "circle" | "disk" | "oval" => Ok(RoiShape::Circle),
            "square" | "rect" => Ok(RoiShape::Square),
            _ => Err(AcfError::InvalidParameter(format!(
                "unknown ROI shape '{}', expected circle or square",
                s
            ))),
        }
    }
}

impl RoiShape {
    pub fn all() -> &'static [RoiShape] {
        &[RoiShape::Circle, RoiShape::Square]
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoiShape::Circle => "Circle",
            RoiShape::Square => "Square",
        }
    }
}

/// One visited position of an ROI scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPoint {
    /// Column offset inside the ROI bounding box
    pub offset_x: usize,
    /// Row offset inside the ROI bounding box
    pub offset_y: usize,
    /// Frame column of the sample
    pub x: i64,
    /// Frame row of the sample
    pub y: i64,
    /// Distance from the ROI centre
    pub radius: f64,
    /// Whether the position belongs to the ROI for its shape
    pub inside: bool,
}

/// Circular or square region of interest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roi {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub shape: RoiShape,
}

impl Roi {
    /// Create a new ROI, a negative radius is replaced by its absolute value
    pub fn new(center_x: f64, center_y: f64, radius: f64, shape: RoiShape) -> Result<Self> {
        let radius = radius.abs();
        if !center_x.is_finite() || !center_y.is_finite() || !radius.is_finite() {
            return Err(AcfError::InvalidRoi(format!(
                "non-finite geometry ({}, {}) r={}",
                center_x, center_y, radius
            )));
        }
        if radius <= 0.0 {
            return Err(AcfError::InvalidRoi("radius must be positive".to_string()));
        }

        Ok(Self {
            center_x,
            center_y,
            radius,
            shape,
        })
    }

    /// ROI centred on a frame, used when the caller supplies no geometry
    pub fn centered_on(width: usize, height: usize, shape: RoiShape) -> Result<Self> {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        Self::new(cx, cy, (cx + cy) / 2.0, shape)
    }

    /// ROI inscribed in a bounding rectangle
    pub fn from_bounds(x: f64, y: f64, width: f64, height: f64, shape: RoiShape) -> Result<Self> {
        Self::new(
            x + width / 2.0,
            y + height / 2.0,
            (width + height) / 4.0,
            shape,
        )
    }

    /// Same centre and shape with another radius
    pub fn with_radius(&self, radius: f64) -> Result<Self> {
        Self::new(self.center_x, self.center_y, radius, self.shape)
    }

    /// Side of the scanned bounding box in samples
    pub fn span(&self) -> usize {
        (2.0 * self.radius).ceil() as usize
    }

    /// Number of radial bins, a fixed density of 0.75 bins per pixel of radius
    pub fn bin_count(&self) -> usize {
        (3.0 * self.radius / 4.0).floor() as usize
    }

    /// Smallest power-of-two side (at least 2) holding the ROI diameter
    pub fn fft_size(&self) -> Result<usize> {
        let min_size = 2.0 * self.radius;
        let mut size = 2usize;
        while (size as f64) < min_size {
            if size >= MAX_FFT_SIZE {
                return Err(AcfError::TransformSize(size * 2));
            }
            size *= 2;
        }
        Ok(size)
    }

    /// Visit the bounding box row by row
    pub fn scan(&self) -> Vec<ScanPoint> {
        let span = self.span();
        let x_min = self.center_x - self.radius;
        let y_min = self.center_y - self.radius;
        let mut points = Vec::with_capacity(span * span);

        for b in 0..span {
            for a in 0..span {
                let fx = x_min + a as f64;
                let fy = y_min + b as f64;
                let radius = (fx - self.center_x).hypot(fy - self.center_y);
                points.push(ScanPoint {
                    offset_x: a,
                    offset_y: b,
                    x: fx.floor() as i64,
                    y: fy.floor() as i64,
                    radius,
                    inside: self.shape == RoiShape::Square || radius <= self.radius,
                });
            }
        }

        points
    }

    /// Only the positions belonging to the ROI
    pub fn members(&self) -> Vec<ScanPoint> {
        self.scan().into_iter().filter(|p| p.inside).collect()
    }

    /// Position of a scan point once the ROI is centred in a padded square of side `size`
    pub fn padded_position(&self, point: &ScanPoint, size: usize) -> (usize, usize) {
        let origin = (size / 2) as f64 - self.radius;
        let px = (origin + point.offset_x as f64).floor().max(0.0) as usize;
        let py = (origin + point.offset_y as f64).floor().max(0.0) as usize;
        (px.min(size - 1), py.min(size - 1))
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({}, {}) with size = {}",
            self.shape, self.center_x, self.center_y, self.radius
        )
    }
}
