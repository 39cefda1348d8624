//! Formatting helpers for curve labels and console output

use crate::calibration::AxisScale;

/// Decimal digits used to print `n1` (and a neighbouring value `n2`)
///
/// Integers print without decimals. Otherwise the smaller of the two values,
/// or their difference when that is smaller still, picks 3 to 7 digits.
pub fn digits_for(n1: f64, n2: f64) -> usize {
    if n1.round() == n1 && n2.round() == n2 {
        return 0;
    }

    let n1 = n1.abs();
    let n2 = n2.abs();
    let mut n = if n1 < n2 && n1 > 0.0 { n1 } else { n2 };
    let diff = (n2 - n1).abs();
    if diff > 0.0 && diff < n {
        n = diff;
    }

    match n {
        n if n < 0.0001 => 7,
        n if n < 0.001 => 6,
        n if n < 0.01 => 5,
        n if n < 10.0 => 4,
        _ => 3,
    }
}

/// Print a value with [`digits_for`] decimals
pub fn format_value(value: f64) -> String {
    format!("{:.*}", digits_for(value, value), value)
}

/// Value followed by its unit, e.g. `1.5000 um`
pub fn format_with_unit(value: f64, unit: &str) -> String {
    format!("{} {}", format_value(value), unit)
}

/// Axis heading such as `Radius [um]`
pub fn axis_label(name: &str, axis: &AxisScale) -> String {
    format!("{} [{}]", name, axis.unit)
}

/// Format a time value for display
pub fn format_time(time_sec: f64) -> String {
    if time_sec >= 60.0 {
        let minutes = (time_sec / 60.0).floor();
        let seconds = time_sec % 60.0;
        format!("{:.0}m {:.1}s", minutes, seconds)
    } else {
        format!("{:.2}s", time_sec)
    }
}
