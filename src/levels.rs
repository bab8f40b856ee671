//! Collections indexed by sweep level.
use serde::{Deserialize, Serialize};

use crate::inference::Inference;
use crate::spike_train::SpikeTrain;

/// An insertion-ordered map from sweep level to value.
/// Levels are unique: inserting an existing level replaces its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLevelMap<T>")]
pub struct LevelMap<T> {
    entries: Vec<(f64, T)>,
}

/// The serialized layout of a [`LevelMap`], whose levels might repeat.
#[derive(Deserialize)]
struct RawLevelMap<T> {
    entries: Vec<(f64, T)>,
}

impl<T> From<RawLevelMap<T>> for LevelMap<T> {
    fn from(raw: RawLevelMap<T>) -> Self {
        raw.entries.into_iter().collect()
    }
}

/// The spike trains recorded at every level of a sweep, one per unit.
pub type TrialResult = LevelMap<Vec<SpikeTrain>>;

/// The inferred stimulus parameter at every level of a sweep, one per unit.
pub type InferredMeasure = LevelMap<Vec<Inference>>;

impl<T> Default for LevelMap<T> {
    fn default() -> Self {
        LevelMap { entries: vec![] }
    }
}

impl<T> LevelMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value at the given level, returning the previous value if the level was already present.
    pub fn insert(&mut self, level: f64, value: T) -> Option<T> {
        match self.entries.iter_mut().find(|(l, _)| *l == level) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.entries.push((level, value));
                None
            }
        }
    }

    /// Returns the value at the given level, if any.
    pub fn get(&self, level: f64) -> Option<&T> {
        self.entries
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, value)| value)
    }

    /// Returns the levels in insertion order.
    pub fn levels(&self) -> Vec<f64> {
        self.entries.iter().map(|(level, _)| *level).collect()
    }

    /// Returns an iterator over the (level, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.entries.iter().map(|(level, value)| (*level, value))
    }

    /// Returns the number of levels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(f64, T)> for LevelMap<T> {
    fn from_iter<I: IntoIterator<Item = (f64, T)>>(iter: I) -> Self {
        let mut map = LevelMap::new();
        for (level, value) in iter {
            map.insert(level, value);
        }
        map
    }
}
