//! Synthetic frames and stacks
//!
//! Seeded patterns with known correlation properties, used by the CLI
//! `synth` command and by tests.

use crate::frame::{Frame, Sequence};
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Uniform frame
pub fn constant(width: usize, height: usize, value: f64) -> Result<Frame> {
    Frame::filled(width, height, value)
}

/// `frames` copies of a uniform frame
pub fn constant_stack(width: usize, height: usize, value: f64, frames: usize) -> Result<Sequence> {
    Sequence::new(
        (0..frames)
            .map(|_| constant(width, height, value))
            .collect::<Result<Vec<_>>>()?,
    )
}

/// Every pixel follows `offset + amplitude * sin(2 pi t / period)`
pub fn sine_stack(
    width: usize,
    height: usize,
    frames: usize,
    period: f64,
    offset: f64,
    amplitude: f64,
) -> Result<Sequence> {
    Sequence::new(
        (0..frames)
            .map(|t| {
                let value = offset + amplitude * (2.0 * PI * t as f64 / period).sin();
                Frame::filled(width, height, value)
            })
            .collect::<Result<Vec<_>>>()?,
    )
}

/// Cosine stripes along x with the given period in pixels
pub fn stripes(width: usize, height: usize, period: f64) -> Result<Frame> {
    Frame::from_fn(width, height, |x, _| (2.0 * PI * x as f64 / period).cos())
}

/// Uniform noise in `[0, amplitude)`
pub fn noise(width: usize, height: usize, amplitude: f64, seed: u64) -> Result<Frame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height)
        .map(|_| rng.random::<f64>() * amplitude)
        .collect();
    Frame::new(width, height, data)
}

/// Randomly placed Gaussian grains
#[derive(Debug, Clone)]
pub struct Speckle {
    grains: Vec<(f64, f64, f64)>,
    sigma: f64,
}

impl Speckle {
    /// About one grain per `grain x grain` pixels over a `width x height` field
    pub fn new(width: usize, height: usize, grain: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grain = grain.max(1.0);
        let count = ((width * height) as f64 / (grain * grain)).ceil().max(1.0) as usize;
        let grains = (0..count)
            .map(|_| {
                (
                    rng.random::<f64>() * width as f64,
                    rng.random::<f64>() * height as f64,
                    0.5 + rng.random::<f64>(),
                )
            })
            .collect();

        Self {
            grains,
            sigma: grain / 2.0,
        }
    }

    pub fn grain_count(&self) -> usize {
        self.grains.len()
    }

    /// Field value at `(x, y)`
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let reach = 3.0 * self.sigma;
        let denom = 2.0 * self.sigma * self.sigma;
        self.grains
            .iter()
            .filter(|(gx, gy, _)| (gx - x).abs() <= reach && (gy - y).abs() <= reach)
            .map(|(gx, gy, a)| a * (-((gx - x).powi(2) + (gy - y).powi(2)) / denom).exp())
            .sum()
    }

    pub fn render(&self, width: usize, height: usize, dx: f64, dy: f64) -> Result<Frame> {
        Frame::from_fn(width, height, |x, y| self.sample(x as f64 + dx, y as f64 + dy))
    }
}

/// Single speckle frame
pub fn speckle(width: usize, height: usize, grain: f64, seed: u64) -> Result<Frame> {
    Speckle::new(width, height, grain, seed).render(width, height, 0.0, 0.0)
}

/// Speckle field drifting by `drift` pixels per frame along x
pub fn drifting_speckle(
    width: usize,
    height: usize,
    frames: usize,
    grain: f64,
    drift: f64,
    seed: u64,
) -> Result<Sequence> {
    let field_width = width + (drift.abs() * frames as f64).ceil() as usize;
    let field = Speckle::new(field_width, height, grain, seed);
    Sequence::new(
        (0..frames)
            .map(|t| field.render(width, height, drift.abs() * t as f64, 0.0))
            .collect::<Result<Vec<_>>>()?,
    )
}
