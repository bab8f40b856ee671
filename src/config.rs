//! Experiment configuration, read from a JSON file.
//!
//! ```json
//! {
//!     "sim_name": "sine_100",
//!     "seed": 42,
//!     "population": { "num_neurons": 100, "waveform": "sine" },
//!     "amplitude": { "a0": 10.0, "a1": 60.0, "res": 10.0 },
//!     "frequency": {
//!         "f0": 100.0, "f1": 400.0, "res": 50.0,
//!         "inference": { "t1": 0.6, "t2": 0.3, "res": 0.25, "prom": 0.002, "time_step": 0.05 }
//!     }
//! }
//! ```
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::DecodingError;
use crate::persistence::SAVE_DIR;
use crate::population::PopulationParams;
use crate::sweep::{AmplitudeSweep, FrequencySweep};

fn default_save_dir() -> PathBuf {
    PathBuf::from(SAVE_DIR)
}

/// The description of a full experiment: a population and the sweeps to run on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// The name under which the results are saved.
    pub sim_name: String,
    /// The seed of the nuisance parameter draws.
    #[serde(default)]
    pub seed: u64,
    /// The directory where the results are saved.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    pub population: PopulationParams,
    #[serde(default)]
    pub amplitude: Option<AmplitudeSweep>,
    #[serde(default)]
    pub frequency: Option<FrequencySweep>,
}

impl ExperimentConfig {
    /// Load a configuration from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, DecodingError> {
        let file = File::open(path).map_err(|e| DecodingError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        let config: ExperimentConfig =
            serde_json::from_reader(reader).map_err(|e| DecodingError::IOError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DecodingError> {
        let file = File::create(path).map_err(|e| DecodingError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| DecodingError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| DecodingError::IOError(e.to_string()))
    }

    /// Check the parts of the configuration that the sweeps can't check themselves.
    pub fn validate(&self) -> Result<(), DecodingError> {
        if self.sim_name.is_empty() {
            return Err(DecodingError::InvalidParameter(
                "The simulation name must not be empty".to_string(),
            ));
        }
        if self.sim_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(DecodingError::InvalidParameter(format!(
                "The simulation name '{}' must not contain path separators",
                self.sim_name
            )));
        }
        if self.amplitude.is_none() && self.frequency.is_none() {
            return Err(DecodingError::InvalidParameter(
                "At least one sweep must be configured".to_string(),
            ));
        }
        if let Some(params) = self.frequency.as_ref().and_then(|sweep| sweep.inference.as_ref()) {
            params.validate()?;
        }
        Ok(())
    }
}
