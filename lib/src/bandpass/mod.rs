//! Radial bandpass filter bank
//!
//! Builds `K` frequency-domain masks over a square spectrum of side
//! `fft_size`. Masks are stored in natural FFT layout (DC at index 0) and are
//! applied by elementwise multiplication before the inverse transform.

mod hard;
mod smooth;

#[cfg(not(target_arch = "wasm32"))]
#[cfg(feature = "image")]
pub mod image;

use crate::error::AcfError;
use crate::fft2d::swap_quadrants;
use crate::Result;
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// How band edges are spread over the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacingScheme {
    /// Octave bands, the band count follows from the FFT size
    #[default]
    PowerOf2,
    /// Evenly spaced edges over `[0, fft_size / 2]`
    Linear,
    /// Edges at `fft_size * (1/(K+1-j) - 1/(K+1))`, finer at high frequency
    Inverse,
}

impl fmt::Display for SpacingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SpacingScheme {
    type Err = AcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "powerof2" | "pow2" | "octave" => Ok(SpacingScheme::PowerOf2),
            "linear" | "lin" => Ok(SpacingScheme::Linear),
            "inverse" | "inv" => Ok(SpacingScheme::Inverse),
            _ => Err(AcfError::InvalidParameter(format!(
                "unknown spacing scheme '{}', expected pow2, linear or inverse",
                s
            ))),
        }
    }
}

impl SpacingScheme {
    pub fn all() -> &'static [SpacingScheme] {
        &[
            SpacingScheme::PowerOf2,
            SpacingScheme::Linear,
            SpacingScheme::Inverse,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpacingScheme::PowerOf2 => "Power of 2",
            SpacingScheme::Linear => "Linear",
            SpacingScheme::Inverse => "Inverse",
        }
    }

    /// Effective band count, Power-of-2 ignores the request
    pub fn band_count(&self, requested: usize, fft_size: usize) -> usize {
        match self {
            SpacingScheme::PowerOf2 => fft_size.next_power_of_two().trailing_zeros() as usize + 1,
            SpacingScheme::Linear | SpacingScheme::Inverse => requested,
        }
    }
}

/// Shape of the band edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// Binary annulus (default)
    #[default]
    Hard,
    /// Difference of Gaussians
    Smooth,
}

impl MaskMode {
    pub fn name(&self) -> &'static str {
        match self {
            MaskMode::Hard => "Hard",
            MaskMode::Smooth => "Smooth",
        }
    }
}

/// One band of the bank
///
/// In hard mode the cutoffs are frequency radii of the annulus. In smooth
/// mode they are the inverse widths of the low-pass and high-pass Gaussians.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBand {
    pub index: usize,
    pub low_cutoff: f64,
    pub high_cutoff: f64,
    pub mask: Option<Vec<f64>>,
}

/// Ordered bands over one spectrum size
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    fft_size: usize,
    scheme: SpacingScheme,
    mode: MaskMode,
    bands: Vec<FilterBand>,
}

impl FilterBank {
    /// Compute band edges, masks are synthesised on demand
    pub fn new(
        fft_size: usize,
        scheme: SpacingScheme,
        requested_bands: usize,
        mode: MaskMode,
    ) -> Result<Self> {
        if !fft_size.is_power_of_two() || fft_size < 2 {
            return Err(AcfError::InvalidParameter(format!(
                "spectrum size must be a power of 2, got {}",
                fft_size
            )));
        }

        let count = scheme.band_count(requested_bands, fft_size);
        if count == 0 {
            return Err(AcfError::InvalidParameter(
                "at least one band is required".to_string(),
            ));
        }
        if count != requested_bands {
            log::debug!(
                "{} spacing uses {} bands instead of the requested {}",
                scheme,
                count,
                requested_bands
            );
        }

        let bands = (0..count)
            .map(|index| {
                let (low_cutoff, high_cutoff) = match mode {
                    MaskMode::Hard => hard::edges(scheme, index, count, fft_size),
                    MaskMode::Smooth => smooth::scales(scheme, index, count, fft_size),
                };
                FilterBand {
                    index,
                    low_cutoff,
                    high_cutoff,
                    mask: None,
                }
            })
            .collect();

        Ok(Self {
            fft_size,
            scheme,
            mode,
            bands,
        })
    }

    /// Synthesise and keep every mask
    pub fn with_masks(mut self) -> Self {
        for j in 0..self.bands.len() {
            let mask = self.synthesize(j);
            self.bands[j].mask = Some(mask);
        }
        self
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn scheme(&self) -> SpacingScheme {
        self.scheme
    }

    pub fn mode(&self) -> MaskMode {
        self.mode
    }

    pub fn bands(&self) -> &[FilterBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Mask of band `j` in natural FFT layout
    pub fn mask(&self, j: usize) -> Vec<f64> {
        match self.bands.get(j).and_then(|b| b.mask.as_ref()) {
            Some(mask) => mask.clone(),
            None => self.synthesize(j),
        }
    }

    /// Mask of band `j` with DC moved to the centre, for display
    pub fn centered_mask(&self, j: usize) -> Vec<f64> {
        let mut mask = self.mask(j);
        swap_quadrants(&mut mask, self.fft_size);
        mask
    }

    /// Multiply a natural-layout spectrum by the mask of band `j`
    pub fn apply(&self, j: usize, spectrum: &mut [Complex64]) -> Result<()> {
        if spectrum.len() != self.fft_size * self.fft_size {
            return Err(AcfError::InvalidParameter(format!(
                "spectrum has {} samples, expected {}",
                spectrum.len(),
                self.fft_size * self.fft_size
            )));
        }

        let owned;
        let mask = match self.bands.get(j).and_then(|b| b.mask.as_ref()) {
            Some(mask) => mask,
            None => {
                owned = self.synthesize(j);
                &owned
            }
        };

        for (c, w) in spectrum.iter_mut().zip(mask) {
            *c *= *w;
        }
        Ok(())
    }

    fn synthesize(&self, j: usize) -> Vec<f64> {
        let band = &self.bands[j];
        match self.mode {
            MaskMode::Hard => hard::mask(
                self.scheme,
                j,
                band.low_cutoff,
                band.high_cutoff,
                self.fft_size,
            ),
            MaskMode::Smooth => smooth::mask(band.low_cutoff, band.high_cutoff, self.fft_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::{Roi, RoiShape};

    #[test]
    fn test_power_of_two_band_count_is_forced() {
        for (fft_size, expected) in [(4, 3), (16, 5), (32, 6), (256, 9)] {
            let bank = FilterBank::new(fft_size, SpacingScheme::PowerOf2, 25, MaskMode::Hard)
                .unwrap();
            assert_eq!(bank.len(), expected);
        }

        let bank = FilterBank::new(32, SpacingScheme::Linear, 10, MaskMode::Hard).unwrap();
        assert_eq!(bank.len(), 10);
    }

    #[test]
    fn test_unit_radius_roi_gets_two_octaves() {
        let roi = Roi::new(4.0, 4.0, 1.0, RoiShape::Circle).unwrap();
        let size = roi.fft_size().unwrap();
        assert_eq!(size, 2);

        let bank = FilterBank::new(size, SpacingScheme::PowerOf2, 25, MaskMode::Hard).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.mask(0), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(bank.mask(1), vec![0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_invalid_bank() {
        assert!(FilterBank::new(30, SpacingScheme::Linear, 4, MaskMode::Hard).is_err());
        assert!(FilterBank::new(32, SpacingScheme::Linear, 0, MaskMode::Hard).is_err());
    }

    #[test]
    fn test_persisted_masks_match_on_demand() {
        let bank = FilterBank::new(16, SpacingScheme::Inverse, 4, MaskMode::Smooth).unwrap();
        let persisted = bank.clone().with_masks();
        for j in 0..bank.len() {
            assert_eq!(bank.mask(j), persisted.mask(j));
            assert!(persisted.bands()[j].mask.is_some());
        }
    }

    #[test]
    fn test_apply_scales_spectrum() {
        let bank = FilterBank::new(8, SpacingScheme::Linear, 2, MaskMode::Hard).unwrap();
        let mut spectrum = vec![Complex64::new(1.0, 1.0); 64];
        bank.apply(1, &mut spectrum).unwrap();
        let mask = bank.mask(1);
        for (c, w) in spectrum.iter().zip(&mask) {
            assert_eq!(c.re, *w);
            assert_eq!(c.im, *w);
        }
        assert!(bank.apply(1, &mut vec![Complex64::new(0.0, 0.0); 10]).is_err());
    }

    #[test]
    fn test_masks_are_point_symmetric() {
        for mode in [MaskMode::Hard, MaskMode::Smooth] {
            for &scheme in SpacingScheme::all() {
                let bank = FilterBank::new(16, scheme, 4, mode).unwrap();
                for j in 0..bank.len() {
                    let mask = bank.mask(j);
                    for y in 0..16 {
                        for x in 0..16 {
                            let mirrored = ((16 - y) % 16) * 16 + (16 - x) % 16;
                            assert_eq!(mask[y * 16 + x], mask[mirrored]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(
            "power-of-2".parse::<SpacingScheme>().unwrap(),
            SpacingScheme::PowerOf2
        );
        assert_eq!(
            "Linear".parse::<SpacingScheme>().unwrap(),
            SpacingScheme::Linear
        );
        assert!("log".parse::<SpacingScheme>().is_err());
    }
}
