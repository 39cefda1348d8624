//! Result curves handed to plotting and export collaborators

use crate::error::AcfWarning;
use crate::normalize::mean_curve;

/// Single curve over a monotonically increasing axis
#[derive(Debug, Clone, PartialEq)]
pub struct RadialCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl RadialCurve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// One labelled y-array of a [`CurveSet`]
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub y: Vec<f64>,
}

/// Family of curves sharing one x axis
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSet {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub curves: Vec<Curve>,
    pub warnings: Vec<AcfWarning>,
}

impl CurveSet {
    pub fn new(title: &str, x_label: String, y_label: &str, x: Vec<f64>) -> Self {
        Self {
            title: title.to_string(),
            x_label,
            y_label: y_label.to_string(),
            x,
            curves: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, label: String, y: Vec<f64>) {
        debug_assert_eq!(y.len(), self.x.len());
        self.curves.push(Curve { label, y });
    }

    /// Number of points per curve
    pub fn bin_count(&self) -> usize {
        self.x.len()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// The `index`-th curve as a standalone [`RadialCurve`]
    pub fn curve(&self, index: usize) -> Option<RadialCurve> {
        self.curves
            .get(index)
            .map(|c| RadialCurve::new(self.x.clone(), c.y.clone()))
    }

    pub fn x_value(&self, index: usize) -> Option<f64> {
        self.x.get(index).copied()
    }

    pub fn y_value(&self, curve: usize, index: usize) -> Option<f64> {
        self.curves.get(curve).and_then(|c| c.y.get(index)).copied()
    }

    /// Shared (min, max) over every curve, ignoring NaN
    pub fn extrema(&self) -> Option<(f64, f64)> {
        let mut min_val = f64::INFINITY;
        let mut max_val = f64::NEG_INFINITY;

        for v in self.curves.iter().flat_map(|c| c.y.iter()) {
            if v.is_finite() {
                min_val = min_val.min(*v);
                max_val = max_val.max(*v);
            }
        }

        (min_val <= max_val).then_some((min_val, max_val))
    }

    /// Collapse every curve into their elementwise mean
    pub fn into_mean(self, title: &str, label: &str) -> Self {
        let ys: Vec<Vec<f64>> = self.curves.iter().map(|c| c.y.clone()).collect();
        let mean = mean_curve(&ys);
        let mut set = CurveSet {
            title: title.to_string(),
            curves: Vec::new(),
            ..self
        };
        set.push(label.to_string(), mean);
        set
    }

    /// Curves in single precision, the legacy hand-off format
    pub fn to_f32(&self) -> (Vec<f32>, Vec<Vec<f32>>) {
        let x = self.x.iter().map(|&v| v as f32).collect();
        let ys = self
            .curves
            .iter()
            .map(|c| c.y.iter().map(|&v| v as f32).collect())
            .collect();
        (x, ys)
    }

    /// Tab separated table with one heading line
    pub fn to_table(&self) -> String {
        let mut table = String::new();
        table.push_str(&self.x_label);
        for curve in &self.curves {
            table.push('\t');
            table.push_str(&curve.label);
        }
        table.push('\n');

        for (i, x) in self.x.iter().enumerate() {
            table.push_str(&format!("{}", x));
            for curve in &self.curves {
                table.push('\t');
                table.push_str(&format!("{}", curve.y[i]));
            }
            table.push('\n');
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> CurveSet {
        let mut set = CurveSet::new(
            "AutoCorrelation",
            "Radius [pixels]".to_string(),
            "AutoCorrelation",
            vec![1.0, 2.0, 3.0],
        );
        set.push("1".to_string(), vec![1.0, 0.5, f64::NAN]);
        set.push("2".to_string(), vec![1.0, -0.5, 0.0]);
        set
    }

    #[test]
    fn test_extrema_ignore_nan() {
        assert_eq!(sample_set().extrema(), Some((-0.5, 1.0)));

        let empty = CurveSet::new("t", "x".to_string(), "y", vec![]);
        assert_eq!(empty.extrema(), None);
    }

    #[test]
    fn test_mean_reduction() {
        let mean = sample_set().into_mean("Mean", "AutoCorrelation");
        assert_eq!(mean.len(), 1);
        assert_eq!(mean.title, "Mean");
        assert_eq!(mean.curves[0].y[0], 1.0);
        assert_eq!(mean.curves[0].y[1], 0.0);
        assert!(mean.curves[0].y[2].is_nan());
    }

    #[test]
    fn test_accessors() {
        let set = sample_set();
        assert_eq!(set.bin_count(), 3);
        assert_eq!(set.x_value(2), Some(3.0));
        assert_eq!(set.y_value(1, 1), Some(-0.5));
        assert_eq!(set.y_value(5, 0), None);
        assert_eq!(set.curve(0).unwrap().len(), 3);
    }

    #[test]
    fn test_table_export() {
        let table = sample_set().to_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Radius [pixels]\t1\t2");
        assert_eq!(lines[1], "1\t1\t1");
        assert_eq!(lines[3], "3\tNaN\t0");
    }

    #[test]
    fn test_single_precision_handoff() {
        let (x, ys) = sample_set().to_f32();
        assert_eq!(x, vec![1.0f32, 2.0, 3.0]);
        assert_eq!(ys[1][1], -0.5f32);
    }
}
