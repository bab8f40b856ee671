//! Receiver operating characteristic of a binary scoring.
use itertools::Itertools;

use crate::error::DecodingError;

/// A ROC curve, i.e., false and true positive rates at every decision threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    /// The false positive rates, non-decreasing.
    pub fpr: Vec<f64>,
    /// The true positive rates, non-decreasing.
    pub tpr: Vec<f64>,
    /// The decreasing thresholds, the first one being infinite.
    pub thresholds: Vec<f64>,
}

/// Compute the ROC curve of scores against binary labels, where `true` marks the positive class.
///
/// Equal scores share a single threshold and collinear intermediate points are dropped.
/// The function returns an error if the lengths don't match or if one of the classes is absent.
pub fn roc_curve(labels: &[bool], scores: &[f64]) -> Result<RocCurve, DecodingError> {
    if labels.len() != scores.len() {
        return Err(DecodingError::IncompatibleLengths {
            expected: labels.len(),
            found: scores.len(),
        });
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(DecodingError::InvalidParameter(
            "Scores must not contain NaN".to_string(),
        ));
    }

    let num_pos = labels.iter().filter(|&&l| l).count();
    let num_neg = labels.len() - num_pos;
    if num_pos == 0 {
        return Err(DecodingError::UndefinedMetric(
            "No positive samples, the true positive rate is meaningless".to_string(),
        ));
    }
    if num_neg == 0 {
        return Err(DecodingError::UndefinedMetric(
            "No negative samples, the false positive rate is meaningless".to_string(),
        ));
    }

    // sort by decreasing score
    let order: Vec<usize> = (0..scores.len())
        .sorted_by(|&i, &j| scores[j].total_cmp(&scores[i]))
        .collect();

    // cumulated true and false positives at the last position of every distinct score
    let mut tps: Vec<f64> = vec![];
    let mut fps: Vec<f64> = vec![];
    let mut thresholds: Vec<f64> = vec![];
    let mut tp = 0.0;
    for (k, &i) in order.iter().enumerate() {
        if labels[i] {
            tp += 1.0;
        }
        let is_last = order.get(k + 1).map_or(true, |&j| scores[j] != scores[i]);
        if is_last {
            tps.push(tp);
            fps.push((k + 1) as f64 - tp);
            thresholds.push(scores[i]);
        }
    }

    // drop the points lying on a straight line between their neighbors
    if tps.len() > 2 {
        let keep: Vec<usize> = std::iter::once(0)
            .chain((1..tps.len() - 1).filter(|&k| {
                fps[k - 1] - 2.0 * fps[k] + fps[k + 1] != 0.0
                    || tps[k - 1] - 2.0 * tps[k] + tps[k + 1] != 0.0
            }))
            .chain(std::iter::once(tps.len() - 1))
            .collect();
        tps = keep.iter().map(|&k| tps[k]).collect();
        fps = keep.iter().map(|&k| fps[k]).collect();
        thresholds = keep.iter().map(|&k| thresholds[k]).collect();
    }

    let fpr = std::iter::once(0.0)
        .chain(fps.iter().map(|fp| fp / num_neg as f64))
        .collect();
    let tpr = std::iter::once(0.0)
        .chain(tps.iter().map(|tp| tp / num_pos as f64))
        .collect();
    let thresholds = std::iter::once(f64::INFINITY).chain(thresholds).collect();

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}

/// Compute the area under a curve with the trapezoidal rule.
///
/// The abscissa must be monotonic; a decreasing abscissa is integrated backwards.
/// The function returns an error for fewer than two points or a non-monotonic abscissa.
pub fn auc(x: &[f64], y: &[f64]) -> Result<f64, DecodingError> {
    if x.len() != y.len() {
        return Err(DecodingError::IncompatibleLengths {
            expected: x.len(),
            found: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(DecodingError::InvalidParameter(format!(
            "At least 2 points are needed to compute the area under a curve, got {}",
            x.len()
        )));
    }

    let dx: Vec<f64> = x.iter().tuple_windows().map(|(a, b)| b - a).collect();
    let direction = if dx.iter().any(|&d| d < 0.0) {
        if dx.iter().all(|&d| d <= 0.0) {
            -1.0
        } else {
            return Err(DecodingError::InvalidParameter(
                "The abscissa is neither increasing nor decreasing".to_string(),
            ));
        }
    } else {
        1.0
    };

    let area: f64 = dx
        .iter()
        .zip(y.iter().tuple_windows())
        .map(|(d, (y0, y1))| d * (y0 + y1) / 2.0)
        .sum();
    Ok(direction * area)
}

/// Compute the area under the ROC curve of scores against binary labels.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Result<f64, DecodingError> {
    let curve = roc_curve(labels, scores)?;
    auc(&curve.fpr, &curve.tpr)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_roc_curve() {
        let labels = [false, false, true, true];
        let scores = [0.1, 0.4, 0.35, 0.8];
        let curve = roc_curve(&labels, &scores).unwrap();

        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(curve.thresholds, vec![f64::INFINITY, 0.8, 0.4, 0.35, 0.1]);
    }

    #[test]
    fn test_roc_curve_drops_collinear_points() {
        // all positives first, the intermediate thresholds lie on the axes
        let labels = [true, true, true, false, false, false];
        let scores = [6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let curve = roc_curve(&labels, &scores).unwrap();

        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0 / 3.0, 1.0, 1.0]);
        assert_eq!(curve.thresholds, vec![f64::INFINITY, 6.0, 4.0, 1.0]);
    }

    #[test]
    fn test_roc_curve_ties() {
        let labels = [false, false, true, true];
        let scores = [1.0, 1.0, 1.0, 1.0];
        let curve = roc_curve(&labels, &scores).unwrap();

        assert_eq!(curve.fpr, vec![0.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0]);
    }

    #[test]
    fn test_roc_curve_errors() {
        assert!(matches!(
            roc_curve(&[true, true], &[0.0, 1.0]),
            Err(DecodingError::UndefinedMetric(_))
        ));
        assert!(matches!(
            roc_curve(&[false], &[0.0]),
            Err(DecodingError::UndefinedMetric(_))
        ));
        assert!(matches!(
            roc_curve(&[], &[]),
            Err(DecodingError::UndefinedMetric(_))
        ));
        assert_eq!(
            roc_curve(&[true, false], &[0.0]),
            Err(DecodingError::IncompatibleLengths {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_auc() {
        assert_relative_eq!(auc(&[0.0, 1.0], &[0.0, 1.0]).unwrap(), 0.5);
        assert_relative_eq!(auc(&[0.0, 0.5, 1.0], &[1.0, 1.0, 1.0]).unwrap(), 1.0);
        assert_relative_eq!(auc(&[1.0, 0.5, 0.0], &[1.0, 1.0, 0.0]).unwrap(), 0.75);

        assert!(auc(&[0.0, 1.0, 0.5], &[0.0, 1.0, 1.0]).is_err());
        assert!(auc(&[0.0], &[0.0]).is_err());
    }

    #[test]
    fn test_roc_auc() {
        let labels = [false, false, true, true];
        assert_relative_eq!(roc_auc(&labels, &[0.1, 0.4, 0.35, 0.8]).unwrap(), 0.75);
        assert_relative_eq!(roc_auc(&labels, &[0.0, 0.0, 10.0, 10.0]).unwrap(), 1.0);
        assert_relative_eq!(roc_auc(&labels, &[10.0, 10.0, 0.0, 0.0]).unwrap(), 0.0);
    }
}
