//! Module implementing the concept of a spike train.

use serde::{Deserialize, Serialize};

use crate::error::DecodingError;
use crate::utils::diff;

/// Represents the firing times of a single simulated unit.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeTrain {
    /// The index of the unit producing the spikes.
    id: usize,
    /// The (sorted) firing times of the unit.
    times: Vec<f64>,
}

impl SpikeTrain {
    /// Create a spike train with the specified parameters.
    /// If necessary, the firing times are sorted.
    /// The function returns an error for non-finite firing times.
    pub fn build(id: usize, times: &[f64]) -> Result<Self, DecodingError> {
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(DecodingError::InvalidSpikeTimes(format!(
                "Unit {} has a non-finite firing time {}",
                id, t
            )));
        }

        let mut times = times.to_vec();
        times.sort_by(|t1, t2| t1.total_cmp(t2));

        Ok(SpikeTrain { id, times })
    }

    /// Create a spike train from firing times that are known to be finite and sorted.
    pub(crate) fn from_sorted(id: usize, times: Vec<f64>) -> Self {
        debug_assert!(times.windows(2).all(|ts| ts[0] <= ts[1]));
        SpikeTrain { id, times }
    }

    /// Returns the index of the unit associated with the spike train.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the firing times of the spike train.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns the number of spikes in the train.
    pub fn num_spikes(&self) -> usize {
        self.times.len()
    }

    /// Returns the inter-spike intervals of the train.
    pub fn isi(&self) -> Vec<f64> {
        diff(&self.times)
    }

    /// Returns the firing times rescaled by `factor`, e.g., 1e3 to go from seconds to milliseconds.
    pub fn scaled_times(&self, factor: f64) -> Vec<f64> {
        self.times.iter().map(|t| t * factor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_train_build() {
        // Test valid spike trains with sorted firing times
        let spike_train = SpikeTrain::build(0, &[0.0, 2.0, 5.0]).unwrap();
        assert_eq!(spike_train.times(), &[0.0, 2.0, 5.0]);

        // Test valid spike trains with unsorted firing times
        let spike_train = SpikeTrain::build(3, &[0.0, 5.0, 2.0, 2.0]).unwrap();
        assert_eq!(spike_train.times(), &[0.0, 2.0, 2.0, 5.0]);
        assert_eq!(spike_train.id(), 3);

        // Test empty spike train
        let spike_train = SpikeTrain::build(0, &[]).unwrap();
        assert_eq!(spike_train.times(), &[] as &[f64]);
        assert_eq!(spike_train.num_spikes(), 0);

        // Test invalid spike train (NaN values)
        assert!(matches!(
            SpikeTrain::build(0, &[0.0, 5.0, f64::NAN]),
            Err(DecodingError::InvalidSpikeTimes(_))
        ));
        assert!(matches!(
            SpikeTrain::build(0, &[f64::INFINITY]),
            Err(DecodingError::InvalidSpikeTimes(_))
        ));
    }

    #[test]
    fn test_spike_train_isi() {
        let spike_train = SpikeTrain::build(0, &[0.5, 1.5, 4.0]).unwrap();
        assert_eq!(spike_train.isi(), vec![1.0, 2.5]);
        assert_eq!(spike_train.scaled_times(1e3), vec![500.0, 1500.0, 4000.0]);

        let spike_train = SpikeTrain::build(0, &[0.5]).unwrap();
        assert!(spike_train.isi().is_empty());
    }
}
