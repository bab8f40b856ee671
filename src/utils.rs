//! Utility functions on sampled grids.
use itertools::Itertools;

use crate::error::DecodingError;

/// Returns evenly spaced values in the half-open interval `[start, stop)`.
///
/// The number of points is `ceil((stop - start) / step)` and the i-th point is `start + i * step`,
/// so accumulated rounding never adds a point past `stop`.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::utils::arange;
///
/// assert_eq!(arange(0.0, 1.0, 0.25).unwrap(), vec![0.0, 0.25, 0.5, 0.75]);
/// assert!(arange(1.0, 0.0, 0.25).unwrap().is_empty());
/// assert!(arange(0.0, 1.0, 0.0).is_err());
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, DecodingError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(DecodingError::InvalidParameter(format!(
            "The step must be positive and finite, got {}",
            step
        )));
    }
    if !(start.is_finite() && stop.is_finite()) {
        return Err(DecodingError::InvalidParameter(format!(
            "The bounds must be finite, got [{}, {})",
            start, stop
        )));
    }

    let num = ((stop - start) / step).ceil().max(0.0) as usize;
    Ok((0..num).map(|i| start + i as f64 * step).collect())
}

/// Returns the consecutive differences of a sequence.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next - prev)
        .collect()
}

/// Returns the position of the first maximum, if any.
/// NaN values are never selected unless every value is NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            None => best = Some((i, value)),
            Some((_, max)) if value > max || (max.is_nan() && !value.is_nan()) => {
                best = Some((i, value))
            }
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}
