//! Discriminability of sweep levels from their inferred measures.
use itertools::Itertools;
use log::warn;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::inference::Inference;
use crate::levels::InferredMeasure;
use crate::roc::roc_auc;

/// Replace every non-finite measure by zero, then keep only the finite ones.
fn sanitize(measures: &[f64]) -> Vec<f64> {
    measures
        .iter()
        .map(|&m| if m.is_finite() { m } else { 0.0 })
        .filter(|m| m.is_finite())
        .collect()
}

/// Returns the ROC-AUC of separating the measures `d1`, obtained for the true value `a`, from the
/// measures `d2`, obtained for the true value `b`.
///
/// The measures are ordered so that the ones of the lower true value are the negatives, which makes
/// the score symmetric in its arguments. Non-finite measures count as zero.
/// If the AUC can't be computed, e.g., because one side is empty, the score falls back to 0.0.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::discrimination::discriminate;
///
/// assert_eq!(discriminate(&[0.0, 0.0, 0.0], &[10.0, 10.0, 10.0], 0.0, 1.0), 1.0);
/// assert_eq!(discriminate(&[10.0, 10.0, 10.0], &[0.0, 0.0, 0.0], 1.0, 0.0), 1.0);
/// assert_eq!(discriminate(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0], 0.0, 1.0), 0.5);
/// ```
pub fn discriminate(d1: &[f64], d2: &[f64], a: f64, b: f64) -> f64 {
    let (d1, d2) = if a > b { (d2, d1) } else { (d1, d2) };

    let d1 = sanitize(d1);
    let d2 = sanitize(d2);

    let labels: Vec<bool> = std::iter::repeat(false)
        .take(d1.len())
        .chain(std::iter::repeat(true).take(d2.len()))
        .collect();
    let scores: Vec<f64> = d1.into_iter().chain(d2).collect();

    match roc_auc(&labels, &scores) {
        Ok(auc) => auc,
        Err(e) => {
            warn!("Discrimination between {} and {} failed: {}", a, b, e);
            0.0
        }
    }
}

/// Same as [`discriminate`] with inferred measures, undefined inferences count as zero.
pub fn discriminate_inferences(d1: &[Inference], d2: &[Inference], a: f64, b: f64) -> f64 {
    let d1: Vec<f64> = d1.iter().map(|m| m.to_f64()).collect();
    let d2: Vec<f64> = d2.iter().map(|m| m.to_f64()).collect();
    discriminate(&d1, &d2, a, b)
}

/// The pairwise discriminability of all levels of a sweep.
///
/// The matrices follow the meshgrid convention: row `i` corresponds to `levels[i]` on the y-axis and
/// column `j` to `levels[j]` on the x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminabilityGrid {
    /// The sweep levels.
    pub levels: Vec<f64>,
    /// The x-coordinates, `xx[(i, j)] = levels[j]`.
    pub xx: DMatrix<f64>,
    /// The y-coordinates, `yy[(i, j)] = levels[i]`.
    pub yy: DMatrix<f64>,
    /// The scores, `zz[(i, j)]` discriminates `levels[j]` against `levels[i]`.
    pub zz: DMatrix<f64>,
}

impl DiscriminabilityGrid {
    /// Returns the number of levels along each axis.
    pub fn size(&self) -> usize {
        self.levels.len()
    }

    /// Returns the score of the pair of levels `(x, y)`, if both are part of the grid.
    pub fn score(&self, x: f64, y: f64) -> Option<f64> {
        let j = self.levels.iter().position(|&l| l == x)?;
        let i = self.levels.iter().position(|&l| l == y)?;
        Some(self.zz[(i, j)])
    }
}

/// Compute the discriminability of every (ordered) pair of levels, self-pairs included.
pub fn discrimination_combinations(inferred: &InferredMeasure) -> DiscriminabilityGrid {
    let levels = inferred.levels();
    let n = levels.len();

    let measures: Vec<Vec<f64>> = inferred
        .iter()
        .map(|(_, values)| values.iter().map(|m| m.to_f64()).collect())
        .collect();

    let cells: Vec<(usize, usize)> = (0..n).cartesian_product(0..n).collect();
    let scores: Vec<f64> = cells
        .par_iter()
        .map(|&(i, j)| discriminate(&measures[j], &measures[i], levels[j], levels[i]))
        .collect();

    DiscriminabilityGrid {
        xx: DMatrix::from_fn(n, n, |_, j| levels[j]),
        yy: DMatrix::from_fn(n, n, |i, _| levels[i]),
        zz: DMatrix::from_row_slice(n, n, &scores),
        levels,
    }
}
