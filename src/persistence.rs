//! Saving and loading of sweep results.
//!
//! A record is the pair (spike trains, inferred measure) of a sweep, written as JSON to
//! `{dir}/{sim_name}_{suffix}.json`, where the suffix is `A` for amplitude sweeps and `f` for
//! frequency sweeps.
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::DecodingError;
use crate::levels::{InferredMeasure, TrialResult};

/// The default directory holding the records.
pub const SAVE_DIR: &str = "save_data";

/// The kind of sweep a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimType {
    Amplitude,
    Frequency,
}

impl SimType {
    /// Returns the file name suffix of the sweep kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            SimType::Amplitude => "A",
            SimType::Frequency => "f",
        }
    }
}

/// Returns the path of the record of a simulation.
pub fn record_path<P: AsRef<Path>>(dir: P, sim_name: &str, sim_type: SimType) -> PathBuf {
    dir.as_ref()
        .join(format!("{}_{}.json", sim_name, sim_type.suffix()))
}

/// Save a set of results, creating the directory if necessary.
pub fn save<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
    sim_type: SimType,
    spike_trains: &TrialResult,
    inferred: &InferredMeasure,
) -> Result<PathBuf, DecodingError> {
    fs::create_dir_all(dir.as_ref()).map_err(|e| DecodingError::IOError(e.to_string()))?;

    let path = record_path(dir, sim_name, sim_type);
    let file = File::create(&path).map_err(|e| DecodingError::IOError(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &(spike_trains, inferred))
        .map_err(|e| DecodingError::IOError(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| DecodingError::IOError(e.to_string()))?;
    Ok(path)
}

/// Load the results of a simulation.
pub fn load<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
    sim_type: SimType,
) -> Result<(TrialResult, InferredMeasure), DecodingError> {
    let file = File::open(record_path(dir, sim_name, sim_type))
        .map_err(|e| DecodingError::IOError(e.to_string()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| DecodingError::IOError(e.to_string()))
}

/// Save the results of an amplitude sweep.
pub fn save_amplitude<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
    spike_trains: &TrialResult,
    inferred_amplitudes: &InferredMeasure,
) -> Result<PathBuf, DecodingError> {
    save(dir, sim_name, SimType::Amplitude, spike_trains, inferred_amplitudes)
}

/// Save the results of a frequency sweep.
pub fn save_frequency<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
    spike_trains: &TrialResult,
    inferred_frequencies: &InferredMeasure,
) -> Result<PathBuf, DecodingError> {
    save(dir, sim_name, SimType::Frequency, spike_trains, inferred_frequencies)
}

/// Load the results of an amplitude sweep.
pub fn load_amplitude<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
) -> Result<(TrialResult, InferredMeasure), DecodingError> {
    load(dir, sim_name, SimType::Amplitude)
}

/// Load the results of a frequency sweep.
pub fn load_frequency<P: AsRef<Path>>(
    dir: P,
    sim_name: &str,
) -> Result<(TrialResult, InferredMeasure), DecodingError> {
    load(dir, sim_name, SimType::Frequency)
}
