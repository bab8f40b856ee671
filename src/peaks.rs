//! Peak detection on sampled signals.
//!
//! A peak is a sample (or the midpoint of a flat plateau) whose direct neighbors are both lower.
//! Its prominence is the height above the higher of the two minima found by walking away from the
//! peak, on each side, until a higher sample or the signal border is reached.

/// Returns the positions of all local maxima of the signal.
/// Plateaus are reported by their midpoint (rounded down); border samples are never peaks.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }
            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                maxima.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Returns the prominence of the sample at position `peak`.
pub fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &value in x[..=peak].iter().rev() {
        if value > height {
            break;
        }
        left_min = left_min.min(value);
    }

    let mut right_min = height;
    for &value in x[peak..].iter() {
        if value > height {
            break;
        }
        right_min = right_min.min(value);
    }

    height - left_min.max(right_min)
}

/// Returns the positions of the peaks whose prominence is at least `min_prominence`.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::peaks::find_peaks;
///
/// let x = [0.0, 2.0, 1.0, 1.5, 1.0, 3.0, 3.0, 0.0];
/// assert_eq!(find_peaks(&x, 0.0), vec![1, 3, 5]);
/// assert_eq!(find_peaks(&x, 1.0), vec![1, 5]);
/// ```
pub fn find_peaks(x: &[f64], min_prominence: f64) -> Vec<usize> {
    local_maxima(x)
        .into_iter()
        .filter(|&peak| prominence(x, peak) >= min_prominence)
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_local_maxima() {
        assert_eq!(local_maxima(&[0.0, 1.0, 0.0, 2.0, 0.0]), vec![1, 3]);

        // borders are not peaks
        assert_eq!(local_maxima(&[3.0, 1.0, 0.0, 2.0]), Vec::<usize>::new());

        // plateau midpoint, rounded down
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 1.0, 1.0, 0.0]), vec![2]);

        // a plateau running into the border is not a peak
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0]), Vec::<usize>::new());

        // a shoulder is not a peak
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 2.0, 0.0]), vec![3]);

        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_prominence() {
        let x = [0.0, 2.0, 1.0, 1.5, 1.0, 3.0, 0.5];
        assert_relative_eq!(prominence(&x, 1), 1.0);
        assert_relative_eq!(prominence(&x, 3), 0.5);
        assert_relative_eq!(prominence(&x, 5), 2.5);
    }

    #[test]
    fn test_find_peaks() {
        let x = [0.0, 2.0, 1.0, 1.5, 1.0, 3.0, 0.5];
        assert_eq!(find_peaks(&x, 0.0), vec![1, 3, 5]);
        assert_eq!(find_peaks(&x, 0.5), vec![1, 3, 5]);
        assert_eq!(find_peaks(&x, 0.6), vec![1, 5]);
        assert_eq!(find_peaks(&x, 10.0), Vec::<usize>::new());
    }
}
