//! Parameter sweeps of a stimulated model.
//!
//! A sweep stores the initial state of the model once, then for every level restores it, sets the
//! swept stimulus parameter, draws the complementary nuisance parameter at random, runs the model and
//! infers the swept parameter back from every recorded spike train.
use log::info;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DecodingError;
use crate::inference::{infer_amplitude, infer_frequency, FrequencyInferenceParams, Inference};
use crate::levels::{InferredMeasure, TrialResult};
use crate::spike_train::SpikeTrain;
use crate::utils::arange;

/// The tag of the state stored before sweeping.
pub const INITIAL_STATE: &str = "initial";

/// Conversion factor from the model time unit (s) to the inference time unit (ms).
const MS_PER_S: f64 = 1e3;

/// A simulated population of units driven by a periodic stimulus.
pub trait Model {
    /// Returns the number of simulated units.
    fn num_neurons(&self) -> usize;

    /// Snapshot the whole dynamical state under the given tag.
    fn store(&mut self, tag: &str);

    /// Roll the dynamical state back to the snapshot with the given tag.
    fn restore(&mut self, tag: &str) -> Result<(), DecodingError>;

    /// Advance the simulation by `duration` seconds.
    fn run(&mut self, duration: f64) -> Result<(), DecodingError>;

    /// Set the stimulus amplitude of every unit.
    fn set_stimulus_current(&mut self, amplitudes: &[f64]) -> Result<(), DecodingError>;

    /// Set the stimulus frequency (in Hz) of every unit.
    fn set_frequency(&mut self, frequencies: &[f64]) -> Result<(), DecodingError>;

    /// Returns the spike trains recorded since the last restore, ordered by unit, with times in seconds.
    fn spike_trains(&self) -> Vec<SpikeTrain>;
}

/// How the nuisance parameter is drawn at every level of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NuisanceSampling {
    /// One independent draw per unit.
    #[default]
    PerUnit,
    /// A single draw shared by all units.
    PerRun,
}

impl NuisanceSampling {
    /// Draw `num_neurons` nuisance values uniformly in `[low, high)`.
    fn sample<R: Rng>(
        &self,
        low: f64,
        high: f64,
        num_neurons: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, DecodingError> {
        check_nuisance_range(low, high)?;

        let dist = Uniform::new(low, high);
        Ok(match self {
            NuisanceSampling::PerUnit => (0..num_neurons).map(|_| dist.sample(rng)).collect(),
            NuisanceSampling::PerRun => vec![dist.sample(rng); num_neurons],
        })
    }
}

fn default_f0() -> f64 {
    100.0
}
fn default_f1() -> f64 {
    600.0
}
fn default_a0() -> f64 {
    50.0
}
fn default_a1() -> f64 {
    100.0
}
fn default_t_max() -> f64 {
    10.0
}
fn default_unit() -> f64 {
    1.0
}

/// Settings of an amplitude discrimination sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSweep {
    /// The lowest amplitude.
    pub a0: f64,
    /// The highest amplitude (included).
    pub a1: f64,
    /// The amplitude step.
    pub res: f64,
    /// The scale applied to every amplitude before stimulating the model.
    #[serde(default = "default_unit")]
    pub unit: f64,
    /// The lowest nuisance frequency (in Hz).
    #[serde(default = "default_f0")]
    pub f0: f64,
    /// The highest nuisance frequency (in Hz, excluded).
    #[serde(default = "default_f1")]
    pub f1: f64,
    /// The duration of every run (in s).
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    #[serde(default)]
    pub nuisance: NuisanceSampling,
}

impl AmplitudeSweep {
    /// Create an amplitude sweep over `[a0, a1]` with the default nuisance range and duration.
    pub fn new(a0: f64, a1: f64, res: f64) -> Self {
        AmplitudeSweep {
            a0,
            a1,
            res,
            unit: default_unit(),
            f0: default_f0(),
            f1: default_f1(),
            t_max: default_t_max(),
            nuisance: NuisanceSampling::default(),
        }
    }
}

/// Settings of a frequency discrimination sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencySweep {
    /// The lowest frequency (in Hz).
    pub f0: f64,
    /// The highest frequency (in Hz, included).
    pub f1: f64,
    /// The frequency step (in Hz).
    pub res: f64,
    /// The scale applied to every nuisance amplitude before stimulating the model.
    #[serde(default = "default_unit")]
    pub unit: f64,
    /// The lowest nuisance amplitude.
    #[serde(default = "default_a0")]
    pub a0: f64,
    /// The highest nuisance amplitude (excluded).
    #[serde(default = "default_a1")]
    pub a1: f64,
    /// The duration of every run (in s).
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    #[serde(default)]
    pub nuisance: NuisanceSampling,
    /// The tuning of the frequency inference; without it, no inference is done.
    #[serde(default)]
    pub inference: Option<FrequencyInferenceParams>,
}

impl FrequencySweep {
    /// Create a frequency sweep over `[f0, f1]` with the default nuisance range and duration, without inference.
    pub fn new(f0: f64, f1: f64, res: f64) -> Self {
        FrequencySweep {
            f0,
            f1,
            res,
            unit: default_unit(),
            a0: default_a0(),
            a1: default_a1(),
            t_max: default_t_max(),
            nuisance: NuisanceSampling::default(),
            inference: None,
        }
    }

    /// Enable the frequency inference with the given spreads and prominence, and the sweep bin widths.
    pub fn with_inference(mut self, t1: f64, t2: f64, prom: f64) -> Self {
        self.inference = Some(FrequencyInferenceParams {
            t1,
            t2,
            prom,
            res: 0.25,
            time_step: 0.05,
        });
        self
    }
}

/// Returns the levels `x0, x0 + res, ...` up to `x1` included.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::sweep::create_param_range;
///
/// assert_eq!(create_param_range(0.0, 1.0, 0.5).unwrap(), vec![0.0, 0.5, 1.0]);
/// ```
pub fn create_param_range(x0: f64, x1: f64, res: f64) -> Result<Vec<f64>, DecodingError> {
    arange(x0, x1 + res, res)
}

fn check_duration(t_max: f64) -> Result<(), DecodingError> {
    if !(t_max.is_finite() && t_max > 0.0) {
        return Err(DecodingError::InvalidParameter(format!(
            "The run duration must be positive and finite, got {}",
            t_max
        )));
    }
    Ok(())
}

fn check_nuisance_range(low: f64, high: f64) -> Result<(), DecodingError> {
    if !(low.is_finite() && high.is_finite() && low < high) {
        return Err(DecodingError::InvalidParameter(format!(
            "The nuisance range [{}, {}) must be finite and non-empty",
            low, high
        )));
    }
    Ok(())
}

/// Run an amplitude sweep and infer the amplitude (spike count) of every unit at every level.
pub fn evaluate_amplitude_discrimination<M: Model, R: Rng>(
    model: &mut M,
    sweep: &AmplitudeSweep,
    rng: &mut R,
) -> Result<(TrialResult, InferredMeasure), DecodingError> {
    let trial_amplitudes = create_param_range(sweep.a0, sweep.a1, sweep.res)?;
    check_duration(sweep.t_max)?;
    check_nuisance_range(sweep.f0, sweep.f1)?;

    let num_neurons = model.num_neurons();
    model.store(INITIAL_STATE);

    let mut spike_trains = TrialResult::new();
    let mut inferred_amplitudes = InferredMeasure::new();

    for (k, &amplitude) in trial_amplitudes.iter().enumerate() {
        model.restore(INITIAL_STATE)?;
        model.set_stimulus_current(&vec![amplitude * sweep.unit; num_neurons])?;
        model.set_frequency(&sweep.nuisance.sample(sweep.f0, sweep.f1, num_neurons, rng)?)?;

        model.run(sweep.t_max)?;
        let trains = model.spike_trains();

        let inferred: Vec<Inference> = trains
            .iter()
            .map(|train| Inference::Value(infer_amplitude(train.times()) as f64))
            .collect();
        info!(
            "Amplitude level {}/{} ({}): {} spikes in total",
            k + 1,
            trial_amplitudes.len(),
            amplitude,
            trains.iter().map(|train| train.num_spikes()).sum::<usize>()
        );

        spike_trains.insert(amplitude, trains);
        inferred_amplitudes.insert(amplitude, inferred);
    }

    Ok((spike_trains, inferred_amplitudes))
}

/// Run a frequency sweep and, if the sweep carries inference parameters, infer the frequency of every
/// unit at every level. Otherwise, the returned measure is empty.
pub fn evaluate_frequency_discrimination<M: Model, R: Rng>(
    model: &mut M,
    sweep: &FrequencySweep,
    rng: &mut R,
) -> Result<(TrialResult, InferredMeasure), DecodingError> {
    let trial_frequencies = create_param_range(sweep.f0, sweep.f1, sweep.res)?;
    check_duration(sweep.t_max)?;
    check_nuisance_range(sweep.a0, sweep.a1)?;
    if let Some(params) = &sweep.inference {
        params.validate()?;
    }

    let num_neurons = model.num_neurons();
    model.store(INITIAL_STATE);

    let mut spike_trains = TrialResult::new();
    let mut inferred_frequencies = InferredMeasure::new();

    for (k, &frequency) in trial_frequencies.iter().enumerate() {
        model.restore(INITIAL_STATE)?;
        model.set_frequency(&vec![frequency; num_neurons])?;
        let amplitudes: Vec<f64> = sweep
            .nuisance
            .sample(sweep.a0, sweep.a1, num_neurons, rng)?
            .into_iter()
            .map(|a| a * sweep.unit)
            .collect();
        model.set_stimulus_current(&amplitudes)?;

        model.run(sweep.t_max)?;
        let trains = model.spike_trains();

        if let Some(params) = &sweep.inference {
            let inferred: Vec<Inference> = trains
                .par_iter()
                .map(|train| infer_frequency(&train.scaled_times(MS_PER_S), params))
                .collect();
            info!(
                "Frequency level {}/{} ({} Hz): {} of {} units decoded",
                k + 1,
                trial_frequencies.len(),
                frequency,
                inferred.iter().filter(|m| !m.is_undefined()).count(),
                inferred.len()
            );
            inferred_frequencies.insert(frequency, inferred);
        } else {
            info!(
                "Frequency level {}/{} ({} Hz): done",
                k + 1,
                trial_frequencies.len(),
                frequency
            );
        }

        spike_trains.insert(frequency, trains);
    }

    Ok((spike_trains, inferred_frequencies))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const SEED: u64 = 42;

    /// A model firing one spike per unit of stimulus amplitude, spread evenly over the run,
    /// and recording every call it receives. A phase-locked model instead fires on the stimulus
    /// cycles, skipping them in a repeating 1, 2, 3 pattern.
    #[derive(Default)]
    struct FakeModel {
        num_neurons: usize,
        phase_locked: bool,
        amplitudes: Vec<f64>,
        frequencies: Vec<f64>,
        trains: Vec<SpikeTrain>,
        stored: HashMap<String, Vec<SpikeTrain>>,
        calls: Vec<String>,
    }

    impl FakeModel {
        fn new(num_neurons: usize) -> Self {
            FakeModel {
                num_neurons,
                trains: (0..num_neurons)
                    .map(|id| SpikeTrain::build(id, &[]).unwrap())
                    .collect(),
                ..Default::default()
            }
        }

        fn phase_locked(num_neurons: usize) -> Self {
            FakeModel {
                phase_locked: true,
                ..FakeModel::new(num_neurons)
            }
        }

        fn locked_times(frequency: f64, duration: f64) -> Vec<f64> {
            let period = 1.0 / frequency;
            let mut times = vec![];
            let mut t = 0.0;
            for n in 0.. {
                t += period * ((n % 3) + 1) as f64;
                if t >= duration {
                    break;
                }
                times.push(t);
            }
            times
        }
    }

    impl Model for FakeModel {
        fn num_neurons(&self) -> usize {
            self.num_neurons
        }

        fn store(&mut self, tag: &str) {
            self.calls.push(format!("store {}", tag));
            self.stored.insert(tag.to_string(), self.trains.clone());
        }

        fn restore(&mut self, tag: &str) -> Result<(), DecodingError> {
            self.calls.push(format!("restore {}", tag));
            self.trains = self
                .stored
                .get(tag)
                .cloned()
                .ok_or_else(|| DecodingError::SnapshotNotFound(tag.to_string()))?;
            Ok(())
        }

        fn run(&mut self, duration: f64) -> Result<(), DecodingError> {
            self.calls.push("run".to_string());
            if self.phase_locked {
                self.trains = self
                    .frequencies
                    .iter()
                    .enumerate()
                    .map(|(id, &f)| {
                        SpikeTrain::build(id, &FakeModel::locked_times(f, duration)).unwrap()
                    })
                    .collect();
                return Ok(());
            }
            self.trains = self
                .amplitudes
                .iter()
                .enumerate()
                .map(|(id, &a)| {
                    let n = a.round() as usize;
                    let times: Vec<f64> = (0..n).map(|k| k as f64 * duration / n as f64).collect();
                    SpikeTrain::build(id, &times).unwrap()
                })
                .collect();
            Ok(())
        }

        fn set_stimulus_current(&mut self, amplitudes: &[f64]) -> Result<(), DecodingError> {
            self.amplitudes = amplitudes.to_vec();
            Ok(())
        }

        fn set_frequency(&mut self, frequencies: &[f64]) -> Result<(), DecodingError> {
            self.frequencies = frequencies.to_vec();
            Ok(())
        }

        fn spike_trains(&self) -> Vec<SpikeTrain> {
            self.trains.clone()
        }
    }

    #[test]
    fn test_create_param_range() {
        assert_eq!(create_param_range(0.0, 1.0, 0.5).unwrap(), vec![0.0, 0.5, 1.0]);
        assert_eq!(create_param_range(2.0, 4.0, 1.0).unwrap(), vec![2.0, 3.0, 4.0]);
        assert_eq!(create_param_range(3.0, 3.0, 1.0).unwrap(), vec![3.0]);
        assert!(create_param_range(0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_evaluate_amplitude_discrimination() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut model = FakeModel::new(3);
        let sweep = AmplitudeSweep {
            unit: 2.0,
            t_max: 1.0,
            ..AmplitudeSweep::new(1.0, 3.0, 1.0)
        };

        let (trials, inferred) =
            evaluate_amplitude_discrimination(&mut model, &sweep, &mut rng).unwrap();

        assert_eq!(trials.levels(), vec![1.0, 2.0, 3.0]);
        assert_eq!(inferred.levels(), vec![1.0, 2.0, 3.0]);
        for (amplitude, values) in inferred.iter() {
            assert_eq!(values, &vec![Inference::Value(2.0 * amplitude); 3]);
        }
        assert_eq!(trials.get(3.0).unwrap().len(), 3);
        assert_eq!(trials.get(3.0).unwrap()[1].num_spikes(), 6);

        // nuisance frequencies are drawn per unit within the range
        assert!(model.frequencies.iter().all(|&f| (100.0..600.0).contains(&f)));
        assert!(model.frequencies[0] != model.frequencies[1]);

        // single store, then restore before every run
        assert_eq!(
            model.calls,
            vec![
                "store initial",
                "restore initial",
                "run",
                "restore initial",
                "run",
                "restore initial",
                "run"
            ]
        );
    }

    #[test]
    fn test_evaluate_frequency_discrimination_without_inference() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut model = FakeModel::new(4);
        let sweep = FrequencySweep {
            t_max: 1.0,
            nuisance: NuisanceSampling::PerRun,
            ..FrequencySweep::new(100.0, 200.0, 50.0)
        };

        let (trials, inferred) =
            evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).unwrap();

        assert_eq!(trials.levels(), vec![100.0, 150.0, 200.0]);
        assert!(inferred.is_empty());
        assert_eq!(model.frequencies, vec![200.0; 4]);

        // a shared nuisance amplitude yields the same spike count for every unit
        assert!(model.amplitudes.iter().all(|&a| a == model.amplitudes[0]));
        assert!((50.0..100.0).contains(&model.amplitudes[0]));
    }

    #[test]
    fn test_evaluate_frequency_discrimination_with_inference() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut model = FakeModel::new(2);
        let sweep = FrequencySweep {
            t_max: 1.0,
            ..FrequencySweep::new(100.0, 200.0, 100.0).with_inference(0.6, 0.3, 0.01)
        };

        let (trials, inferred) =
            evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).unwrap();

        // evenly spread spikes have a single ISI, hence no decodable frequency
        assert_eq!(trials.len(), 2);
        assert_eq!(inferred.levels(), vec![100.0, 200.0]);
        assert!(inferred
            .iter()
            .all(|(_, values)| values.len() == 2 && values.iter().all(|m| m.is_undefined())));
    }

    #[test]
    fn test_evaluate_frequency_discrimination_decodes_locked_trains() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut model = FakeModel::phase_locked(3);
        let sweep = FrequencySweep {
            t_max: 1.0,
            ..FrequencySweep::new(100.0, 200.0, 100.0).with_inference(0.6, 0.3, 0.01)
        };
        let time_step = sweep.inference.unwrap().time_step;

        let (trials, inferred) =
            evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).unwrap();
        assert_eq!(inferred.levels(), vec![100.0, 200.0]);

        for (frequency, values) in inferred.iter() {
            // spike times are reported in seconds
            let times = trials.get(frequency).unwrap()[0].times().to_vec();
            assert!(times.iter().all(|&t| (0.0..1.0).contains(&t)));

            // every unit decodes the level within one peak-spacing bin
            let period = 1e3 / frequency;
            let tolerance = 1e3 / (period - time_step) - frequency;
            assert_eq!(values.len(), 3);
            for value in values {
                let decoded = value.value().unwrap();
                assert!(
                    (decoded - frequency).abs() <= tolerance,
                    "decoded {} Hz at level {} Hz",
                    decoded,
                    frequency
                );
            }
        }
    }

    #[test]
    fn test_evaluate_invalid_sweeps() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut model = FakeModel::new(2);

        let sweep = AmplitudeSweep {
            f0: 600.0,
            f1: 100.0,
            ..AmplitudeSweep::new(1.0, 2.0, 1.0)
        };
        assert!(evaluate_amplitude_discrimination(&mut model, &sweep, &mut rng).is_err());

        let sweep = FrequencySweep {
            t_max: 0.0,
            ..FrequencySweep::new(100.0, 200.0, 50.0)
        };
        assert!(evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).is_err());

        let sweep = FrequencySweep::new(100.0, 200.0, -1.0);
        assert!(evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).is_err());

        let sweep = FrequencySweep::new(100.0, 200.0, 50.0).with_inference(-0.6, 0.3, 0.01);
        assert!(evaluate_frequency_discrimination(&mut model, &sweep, &mut rng).is_err());

        // the model is never touched by an invalid sweep
        assert!(model.calls.is_empty());
    }
}
