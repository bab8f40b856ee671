//! Gaussian kernels and the smoothed densities built from them.
use std::f64::consts::PI;

use crate::error::DecodingError;

/// Returns the normal density with mean `mu` and standard deviation `sig` at `x`.
pub fn gaussian_pdf(x: f64, mu: f64, sig: f64) -> f64 {
    1.0 / ((2.0 * PI).sqrt() * sig) * (-((x - mu) / sig).powi(2) / 2.0).exp()
}

/// Returns the normal density with mean `mu` and standard deviation `sig` at every point of `x`.
/// The spread must be positive.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::kernel::gaussian;
///
/// let values = gaussian(&[-1.0, 0.0, 1.0], 0.0, 1.0);
/// assert!(values[1] > values[0]);
/// assert_eq!(values[0], values[2]);
/// ```
pub fn gaussian(x: &[f64], mu: f64, sig: f64) -> Vec<f64> {
    x.iter().map(|&xi| gaussian_pdf(xi, mu, sig)).collect()
}

/// Returns the sum of gaussians of spread `sig` centered at every one of `centers`, evaluated on `grid`.
/// The function returns an error if there are no centers to superpose.
pub fn kernel_density(grid: &[f64], centers: &[f64], sig: f64) -> Result<Vec<f64>, DecodingError> {
    if centers.is_empty() {
        return Err(DecodingError::InvalidParameter(
            "At least one center is required to build a density".to_string(),
        ));
    }

    let mut density = vec![0.0; grid.len()];
    for &mu in centers {
        for (acc, &x) in density.iter_mut().zip(grid) {
            *acc += gaussian_pdf(x, mu, sig);
        }
    }
    Ok(density)
}

/// Normalize a density in place so that it sums to one.
/// The function returns an error if the total mass is not positive, e.g., when every kernel underflowed.
pub fn normalize(density: &mut [f64]) -> Result<(), DecodingError> {
    let total: f64 = density.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(DecodingError::InvalidParameter(format!(
            "Cannot normalize a density of total mass {}",
            total
        )));
    }
    density.iter_mut().for_each(|d| *d /= total);
    Ok(())
}
