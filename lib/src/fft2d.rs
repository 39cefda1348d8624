//! Square 2-D Fourier transform
//!
//! Thin row/column wrapper around `rustfft`. Buffers are row-major
//! `size * size` grids of complex samples.

use crate::error::AcfError;
use crate::Result;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward and inverse plans for one square size
pub struct Fft2d {
    size: usize,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    /// Plan transforms for a `size` x `size` grid, size must be a power of 2
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() || size < 2 {
            return Err(AcfError::InvalidParameter(format!(
                "FFT size must be a power of 2 and at least 2, got {}",
                size
            )));
        }
        size.checked_mul(size)
            .ok_or(AcfError::TransformSize(size))?;

        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let fft_inverse = planner.plan_fft_inverse(size);

        Ok(Self {
            size,
            fft_forward,
            fft_inverse,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Lift real samples into a complex grid
    pub fn from_real(&self, values: &[f64]) -> Result<Vec<Complex64>> {
        self.check_len(values.len())?;
        Ok(values.iter().map(|&v| Complex64::new(v, 0.0)).collect())
    }

    /// Forward transform in place
    pub fn forward(&self, grid: &mut [Complex64]) -> Result<()> {
        self.check_len(grid.len())?;
        self.process(grid, &self.fft_forward);
        Ok(())
    }

    /// Inverse transform in place, scaled so that `inverse(forward(x)) == x`
    pub fn inverse(&self, grid: &mut [Complex64]) -> Result<()> {
        self.check_len(grid.len())?;
        self.process(grid, &self.fft_inverse);

        let scale = 1.0 / (self.size * self.size) as f64;
        for c in grid.iter_mut() {
            *c *= scale;
        }
        Ok(())
    }

    /// Autocorrelation of a real grid through its power spectrum
    ///
    /// Returns the circular ACF with zero lag at index 0.
    pub fn autocorrelation(&self, values: &[f64]) -> Result<Vec<f64>> {
        let mut grid = self.from_real(values)?;
        self.forward(&mut grid)?;
        conjugate_multiply(&mut grid);
        self.inverse(&mut grid)?;
        Ok(grid.iter().map(|c| c.re).collect())
    }

    fn process(&self, grid: &mut [Complex64], fft: &Arc<dyn Fft<f64>>) {
        // rows, then columns through a transpose
        fft.process(grid);
        transpose(grid, self.size);
        fft.process(grid);
        transpose(grid, self.size);
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.size * self.size {
            return Err(AcfError::InvalidParameter(format!(
                "grid has {} samples, expected {}",
                len,
                self.size * self.size
            )));
        }
        Ok(())
    }
}

/// Multiply every coefficient by its own conjugate (power spectrum)
pub fn conjugate_multiply(grid: &mut [Complex64]) {
    for c in grid.iter_mut() {
        *c = Complex64::new(c.norm_sqr(), 0.0);
    }
}

/// Swap diagonal quadrants so that index 0 moves to the grid centre
pub fn swap_quadrants<T>(grid: &mut [T], size: usize) {
    let half = size / 2;
    for y in 0..half {
        for x in 0..size {
            let x2 = (x + half) % size;
            grid.swap(y * size + x, (y + half) * size + x2);
        }
    }
}

fn transpose<T>(grid: &mut [T], size: usize) {
    for y in 0..size {
        for x in (y + 1)..size {
            grid.swap(y * size + x, x * size + y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_validation() {
        assert!(Fft2d::new(8).is_ok());
        assert!(Fft2d::new(12).is_err());
        assert!(Fft2d::new(1).is_err());
    }

    #[test]
    fn test_round_trip() {
        let fft = Fft2d::new(8).unwrap();
        let values: Vec<f64> = (0..64).map(|i| ((i * 7) % 11) as f64 - 3.0).collect();
        let mut grid = fft.from_real(&values).unwrap();
        fft.forward(&mut grid).unwrap();
        fft.inverse(&mut grid).unwrap();

        for (c, v) in grid.iter().zip(&values) {
            assert!((c.re - v).abs() < 1e-10);
            assert!(c.im.abs() < 1e-10);
        }
    }

    #[test]
    fn test_dc_coefficient() {
        let fft = Fft2d::new(4).unwrap();
        let mut grid = fft.from_real(&[2.0; 16]).unwrap();
        fft.forward(&mut grid).unwrap();
        assert!((grid[0].re - 32.0).abs() < 1e-12);
        assert!(grid[1..].iter().all(|c| c.norm() < 1e-12));
    }

    #[test]
    fn test_autocorrelation_zero_lag_is_energy() {
        let fft = Fft2d::new(8).unwrap();
        let mut values = vec![0.0; 64];
        values[9] = 1.0;
        values[10] = -2.0;
        let acf = fft.autocorrelation(&values).unwrap();
        assert!((acf[0] - 5.0).abs() < 1e-10);
        // lag (1, 0) pairs the two samples
        assert!((acf[1] + 2.0).abs() < 1e-10);
        assert!((acf[7] + 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_swap_quadrants() {
        let mut grid: Vec<usize> = (0..16).collect();
        swap_quadrants(&mut grid, 4);
        assert_eq!(grid[2 * 4 + 2], 0);
        assert_eq!(grid[0], 10);
        swap_quadrants(&mut grid, 4);
        assert_eq!(grid, (0..16).collect::<Vec<_>>());
    }
}
