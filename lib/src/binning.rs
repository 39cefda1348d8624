//! Radial binning of isotropic quantities
//!
//! A radius `R` inside a maximum radius `mR` is mapped to
//! `floor(R / mR * n_bins)`. Index 0 is folded into index 1 before the
//! decrement, so the innermost strip and the first annulus share bin 0.
//! Indices past the last bin are rejected.

/// Number of bins used for a maximum radius, 0.75 bins per pixel of radius
pub fn bin_count(max_radius: f64) -> usize {
    (3.0 * max_radius / 4.0).floor() as usize
}

/// Maps radii to bin indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBinner {
    max_radius: f64,
    bins: usize,
}

impl RadialBinner {
    pub fn new(max_radius: f64) -> Self {
        Self {
            max_radius,
            bins: bin_count(max_radius),
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Bin receiving a sample at distance `radius`, `None` when rejected
    pub fn bin_index(&self, radius: f64) -> Option<usize> {
        if self.bins == 0 || !radius.is_finite() || radius < 0.0 {
            return None;
        }

        let mut bin = ((radius / self.max_radius) * self.bins as f64).floor() as usize;
        if bin == 0 {
            bin = 1;
        }
        let bin = bin - 1;

        (bin < self.bins).then_some(bin)
    }

    /// Bin for an offset `(dx, dy)` from the centre
    pub fn bin_for_offset(&self, dx: f64, dy: f64) -> Option<usize> {
        self.bin_index(dx.hypot(dy))
    }

    /// Abscissa of each bin: its outer radius `mR * (k + 1) / n_bins`
    pub fn radii(&self) -> Vec<f64> {
        (0..self.bins)
            .map(|k| self.max_radius * (k + 1) as f64 / self.bins as f64)
            .collect()
    }

    /// Zeroed accumulator for one scan
    pub fn accumulator(&self) -> Accumulator {
        Accumulator::new(self.bins)
    }
}

/// Per-bin running sums and sample counts
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl Accumulator {
    pub fn new(bins: usize) -> Self {
        Self {
            sums: vec![0.0; bins],
            counts: vec![0; bins],
        }
    }

    pub fn add(&mut self, bin: usize, value: f64) {
        self.sums[bin] += value;
        self.counts[bin] += 1;
    }

    /// Bin `value` at `radius`, returns whether the sample was kept
    pub fn add_at(&mut self, binner: &RadialBinner, radius: f64, value: f64) -> bool {
        match binner.bin_index(radius) {
            Some(bin) => {
                self.add(bin, value);
                true
            }
            None => false,
        }
    }

    /// Fold a partial accumulator built over disjoint samples
    pub fn merge(&mut self, other: &Accumulator) {
        for (s, o) in self.sums.iter_mut().zip(&other.sums) {
            *s += o;
        }
        for (c, o) in self.counts.iter_mut().zip(&other.counts) {
            *c += o;
        }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Mean per bin, NaN where no sample was accumulated
    pub fn finish(self) -> Vec<f64> {
        self.sums
            .into_iter()
            .zip(self.counts)
            .map(|(sum, count)| sum / count as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_count() {
        assert_eq!(bin_count(16.0), 12);
        assert_eq!(bin_count(10.0), 7);
        assert_eq!(bin_count(1.0), 0);
    }

    #[test]
    fn test_innermost_strip_merges_into_first_bin() {
        let binner = RadialBinner::new(16.0);
        let width = 16.0 / 12.0;

        assert_eq!(binner.bin_index(0.0), Some(0));
        assert_eq!(binner.bin_index(0.5 * width), Some(0));
        assert_eq!(binner.bin_index(1.5 * width), Some(0));
        assert_eq!(binner.bin_index(2.5 * width), Some(1));
        assert_eq!(binner.bin_index(12.5 * width), Some(11));
        assert_eq!(binner.bin_index(13.5 * width), None);
        assert_eq!(binner.bin_index(f64::NAN), None);
    }

    #[test]
    fn test_empty_bin_is_nan() {
        let binner = RadialBinner::new(8.0);
        let mut acc = binner.accumulator();
        assert!(acc.add_at(&binner, 0.0, 2.0));
        assert!(acc.add_at(&binner, 1.0, 4.0));
        assert!(!acc.add_at(&binner, 100.0, 1.0));

        let means = acc.finish();
        assert_eq!(means.len(), 6);
        assert_eq!(means[0], 3.0);
        assert!(means[5].is_nan());
    }

    #[test]
    fn test_merge_partial_sums() {
        let binner = RadialBinner::new(8.0);
        let mut a = binner.accumulator();
        let mut b = binner.accumulator();
        a.add(2, 1.0);
        b.add(2, 3.0);
        b.add(3, 5.0);
        a.merge(&b);
        assert_eq!(a.counts()[2], 2);
        let means = a.finish();
        assert_eq!(means[2], 2.0);
        assert_eq!(means[3], 5.0);
    }

    #[test]
    fn test_radii_axis() {
        let binner = RadialBinner::new(8.0);
        let radii = binner.radii();
        assert_eq!(radii.len(), 6);
        assert!((radii[0] - 8.0 / 6.0).abs() < 1e-12);
        assert!((radii[5] - 8.0).abs() < 1e-12);
    }
}
