//! Render masks and filtered frames to image files

use super::FilterBank;
use crate::error::AcfError;
use crate::Result;
use ::image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;

/// Color map used to render a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Black to white between the grid extrema
    #[default]
    Grayscale,
    /// Blue through white to red, zero is white
    ///
    /// Suited to bandpass-filtered frames, whose values are signed.
    Diverging,
}

impl ColorMap {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMap::Grayscale => "grayscale",
            ColorMap::Diverging => "diverging",
        }
    }

    /// Position in `[0, 1]` of a missing value
    fn blank(&self) -> f64 {
        match self {
            ColorMap::Grayscale => 0.0,
            ColorMap::Diverging => 0.5,
        }
    }

    /// Range mapped onto `[0, 1]`, symmetric around zero for the diverging map
    fn bounds(&self, values: &[f64]) -> (f64, f64) {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        match self {
            ColorMap::Grayscale => finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            }),
            ColorMap::Diverging => {
                let reach = finite.fold(0.0, |m: f64, v| m.max(v.abs()));
                (-reach, reach)
            }
        }
    }
}

/// Color of a position in `[0, 1]`
fn shade(position: f64, colormap: ColorMap) -> Rgb<u8> {
    let v = position.clamp(0.0, 1.0);

    match colormap {
        ColorMap::Grayscale => {
            let gray = (v * 255.0) as u8;
            Rgb([gray, gray, gray])
        }
        ColorMap::Diverging => {
            let signed = 2.0 * v - 1.0;
            let fade = ((1.0 - signed.abs()) * 255.0).round() as u8;
            if signed < 0.0 {
                Rgb([fade, fade, 255])
            } else {
                Rgb([255, fade, fade])
            }
        }
    }
}

/// Render a row-major grid stretched over [`ColorMap`] bounds, NaN cells blank
pub fn grid_to_image(values: &[f64], width: usize, height: usize, colormap: ColorMap) -> RgbImage {
    let mut img = ImageBuffer::new(width as u32, height as u32);
    let (low, high) = colormap.bounds(values);
    let range = high - low;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let value = values
            .get(y as usize * width + x as usize)
            .copied()
            .unwrap_or(f64::NAN);
        let position = if !value.is_finite() {
            colormap.blank()
        } else if range > 0.0 {
            (value - low) / range
        } else {
            match colormap {
                // flat grid, all-pass masks render white
                ColorMap::Grayscale if value > 0.0 => 1.0,
                _ => colormap.blank(),
            }
        };
        *pixel = shade(position, colormap);
    }

    img
}

/// Mask of band `j`, DC at the centre
pub fn mask_image(bank: &FilterBank, j: usize, colormap: ColorMap) -> RgbImage {
    let size = bank.fft_size();
    grid_to_image(&bank.centered_mask(j), size, size, colormap)
}

/// Save the mask of band `j` to an image file
pub fn save_mask<P: AsRef<Path>>(
    bank: &FilterBank,
    j: usize,
    path: P,
    colormap: ColorMap,
) -> Result<()> {
    if j >= bank.len() {
        return Err(AcfError::InvalidParameter(format!(
            "band {} does not exist, the bank has {} bands",
            j,
            bank.len()
        )));
    }
    mask_image(bank, j, colormap)
        .save(path)
        .map_err(|e| AcfError::Io(format!("Failed to save filter image: {}", e)))
}

/// Save a row-major grid to an image file
pub fn save_grid<P: AsRef<Path>>(
    values: &[f64],
    width: usize,
    height: usize,
    path: P,
    colormap: ColorMap,
) -> Result<()> {
    grid_to_image(values, width, height, colormap)
        .save(path)
        .map_err(|e| AcfError::Io(format!("Failed to save image: {}", e)))
}
