//! Spatial and temporal calibration of a sequence
//!
//! Missing or zero calibration scalars are not errors: the axis silently
//! falls back to pixel or frame-index units and the fallback is reported as a
//! warning next to the result.

use crate::error::AcfWarning;

pub const PIXEL_UNIT: &str = "pixels";
pub const FRAME_UNIT: &str = "picture";

/// Calibration scalars provided by the image host
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub pixel_width: Option<f64>,
    pub pixel_height: Option<f64>,
    pub frame_interval: Option<f64>,
    pub spatial_unit: String,
    pub time_unit: String,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: None,
            pixel_height: None,
            frame_interval: None,
            spatial_unit: PIXEL_UNIT.to_string(),
            time_unit: FRAME_UNIT.to_string(),
        }
    }
}

/// Resolved scale and unit of one plot axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    pub scale: f64,
    pub unit: String,
    pub calibrated: bool,
}

impl AxisScale {
    fn raw(unit: &str) -> Self {
        Self {
            scale: 1.0,
            unit: unit.to_string(),
            calibrated: false,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl Calibration {
    /// Square pixels of `pixel_size` in `unit`
    pub fn spatial(pixel_size: f64, unit: &str) -> Self {
        Self {
            pixel_width: Some(pixel_size),
            pixel_height: Some(pixel_size),
            spatial_unit: unit.to_string(),
            ..Self::default()
        }
    }

    /// Builder style frame interval
    pub fn with_frame_interval(mut self, interval: f64, unit: &str) -> Self {
        self.frame_interval = Some(interval);
        self.time_unit = unit.to_string();
        self
    }

    /// Builder style pixel aspect
    pub fn with_pixel_size(mut self, width: f64, height: f64, unit: &str) -> Self {
        self.pixel_width = Some(width);
        self.pixel_height = Some(height);
        self.spatial_unit = unit.to_string();
        self
    }

    /// Scale of the radius axis
    ///
    /// Unequal pixel width and height are replaced by their average.
    pub fn spatial_axis(&self, enabled: bool, warnings: &mut Vec<AcfWarning>) -> AxisScale {
        if !enabled {
            return AxisScale::raw(PIXEL_UNIT);
        }

        let width = usable(self.pixel_width);
        let height = usable(self.pixel_height);
        let unit_is_pixel = self.spatial_unit.is_empty()
            || self.spatial_unit.eq_ignore_ascii_case("pixel")
            || self.spatial_unit.eq_ignore_ascii_case(PIXEL_UNIT);

        let scale = match (width, height) {
            (Some(w), Some(h)) if w != h => {
                let used = (w + h) / 2.0;
                log::warn!(
                    "Pixel width {} differs from pixel height {}, using average {}",
                    w,
                    h,
                    used
                );
                warnings.push(AcfWarning::MismatchedPixelAspect {
                    width: w,
                    height: h,
                    used,
                });
                Some(used)
            }
            (Some(w), _) => Some(w),
            (None, Some(h)) => Some(h),
            (None, None) => None,
        };

        match scale {
            Some(scale) if !unit_is_pixel => AxisScale {
                scale,
                unit: self.spatial_unit.clone(),
                calibrated: true,
            },
            _ => {
                log::debug!("No spatial calibration, radius expressed in pixels");
                warnings.push(AcfWarning::CalibrationFallback {
                    axis: "spatial",
                    unit: PIXEL_UNIT.to_string(),
                });
                AxisScale::raw(PIXEL_UNIT)
            }
        }
    }

    /// Scale of the lag/time axis
    pub fn time_axis(&self, enabled: bool, warnings: &mut Vec<AcfWarning>) -> AxisScale {
        if !enabled {
            return AxisScale::raw(FRAME_UNIT);
        }

        match usable(self.frame_interval) {
            Some(interval) => AxisScale {
                scale: interval,
                unit: self.time_unit.clone(),
                calibrated: true,
            },
            None => {
                log::debug!("No frame interval, time expressed in frames");
                warnings.push(AcfWarning::CalibrationFallback {
                    axis: "time",
                    unit: FRAME_UNIT.to_string(),
                });
                AxisScale::raw(FRAME_UNIT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_fallback() {
        let cal = Calibration::default();
        let mut warnings = Vec::new();

        let spatial = cal.spatial_axis(true, &mut warnings);
        assert_eq!(spatial.scale, 1.0);
        assert_eq!(spatial.unit, PIXEL_UNIT);
        assert!(!spatial.calibrated);

        let time = cal.time_axis(true, &mut warnings);
        assert_eq!(time.unit, FRAME_UNIT);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_disabled_axes_do_not_warn() {
        let cal = Calibration::spatial(0.5, "um").with_frame_interval(2.0, "s");
        let mut warnings = Vec::new();
        assert_eq!(cal.spatial_axis(false, &mut warnings).scale, 1.0);
        assert_eq!(cal.time_axis(false, &mut warnings).scale, 1.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_zero_interval_is_fallback() {
        let cal = Calibration::default().with_frame_interval(0.0, "s");
        let mut warnings = Vec::new();
        let time = cal.time_axis(true, &mut warnings);
        assert_eq!(time.scale, 1.0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_mismatched_pixel_aspect() {
        let cal = Calibration::default().with_pixel_size(1.0, 3.0, "um");
        let mut warnings = Vec::new();
        let spatial = cal.spatial_axis(true, &mut warnings);
        assert_eq!(spatial.scale, 2.0);
        assert_eq!(spatial.unit, "um");
        assert_eq!(
            warnings,
            vec![AcfWarning::MismatchedPixelAspect {
                width: 1.0,
                height: 3.0,
                used: 2.0
            }]
        );
    }

    #[test]
    fn test_pixel_unit_is_not_calibrated() {
        let cal = Calibration::spatial(1.0, "pixel");
        let mut warnings = Vec::new();
        assert!(!cal.spatial_axis(true, &mut warnings).calibrated);
    }
}
