//! A phase-locked population of independent units, the reference [`Model`] of the crate.
//!
//! Every unit fires as an inhomogeneous Poisson process whose rate follows the rectified stimulus
//! waveform, with an absolute dead time after each spike. Spikes are drawn by thinning: candidate
//! events are sampled at the peak rate of the unit and accepted with probability rate / peak rate.
use derivative::Derivative;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

use crate::error::DecodingError;
use crate::spike_train::SpikeTrain;
use crate::sweep::Model;

/// The time (in s) before which a synaptic drive stays silent.
pub const SYNAPTIC_ONSET: f64 = 10e-3;

/// The periodic input current injected into every unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `A sin(2π f t) + A`
    Sine,
    /// `-A ((f t) mod 1) + A`
    Sawtooth,
    /// A peak-normalized double-exponential pulse of height `A`, triggered at the start of every
    /// stimulus period once the drive is on (after [`SYNAPTIC_ONSET`]). Time constants are in s.
    Synaptic { tau_rise: f64, tau_decay: f64 },
}

impl Waveform {
    /// Returns the input of amplitude `amplitude` and frequency `frequency` at time `t` (in s).
    pub fn eval(&self, amplitude: f64, frequency: f64, t: f64) -> f64 {
        match self {
            Waveform::Sine => amplitude * (2.0 * PI * frequency * t).sin() + amplitude,
            Waveform::Sawtooth => -amplitude * (frequency * t).rem_euclid(1.0) + amplitude,
            Waveform::Synaptic {
                tau_rise,
                tau_decay,
            } => {
                if t <= SYNAPTIC_ONSET {
                    return 0.0;
                }
                let phase = t.rem_euclid(1.0 / frequency);
                amplitude * double_exponential(*tau_rise, *tau_decay, phase)
            }
        }
    }

    /// Returns the maximum of the rectified input over a period.
    pub fn peak(&self, amplitude: f64) -> f64 {
        match self {
            Waveform::Sine => 2.0 * amplitude.abs(),
            Waveform::Sawtooth | Waveform::Synaptic { .. } => amplitude.abs(),
        }
    }

    fn check(&self) -> Result<(), DecodingError> {
        if let Waveform::Synaptic {
            tau_rise,
            tau_decay,
        } = self
        {
            let ordered = 0.0 < *tau_rise && tau_rise < tau_decay;
            if !(tau_decay.is_finite() && ordered) {
                return Err(DecodingError::InvalidParameter(format!(
                    "The synaptic time constants must satisfy 0 < tau_rise < tau_decay, got {} and {}",
                    tau_rise, tau_decay
                )));
            }
        }
        Ok(())
    }
}

/// The difference of exponentials with time constants `tau_rise < tau_decay`, scaled to peak at 1.
fn double_exponential(tau_rise: f64, tau_decay: f64, t: f64) -> f64 {
    let t_peak = tau_rise * tau_decay / (tau_decay - tau_rise) * (tau_decay / tau_rise).ln();
    let norm = (-t_peak / tau_decay).exp() - (-t_peak / tau_rise).exp();
    ((-t / tau_decay).exp() - (-t / tau_rise).exp()) / norm
}

fn default_num_neurons() -> usize {
    100
}
fn default_gain() -> f64 {
    2.0
}
fn default_refractory() -> f64 {
    2e-3
}

/// Parameters of a [`Population`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationParams {
    /// The number of units.
    #[serde(default = "default_num_neurons")]
    pub num_neurons: usize,
    pub waveform: Waveform,
    /// The firing rate (in Hz) per unit of rectified input.
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// The input-independent firing rate (in Hz).
    #[serde(default)]
    pub baseline_rate: f64,
    /// The dead time after each spike (in s).
    #[serde(default = "default_refractory")]
    pub refractory: f64,
    /// The seed of the population noise.
    #[serde(default)]
    pub seed: u64,
}

impl PopulationParams {
    /// Create parameters for `num_neurons` units driven by `waveform`, with the default gain and dead time.
    pub fn new(num_neurons: usize, waveform: Waveform) -> Self {
        PopulationParams {
            num_neurons,
            waveform,
            gain: default_gain(),
            baseline_rate: 0.0,
            refractory: default_refractory(),
            seed: 0,
        }
    }
}

/// The dynamical state of a population, i.e., everything `store` and `restore` act on.
#[derive(Debug, Clone)]
struct State {
    time: f64,
    amplitudes: Vec<f64>,
    frequencies: Vec<f64>,
    firing_times: Vec<Vec<f64>>,
    rng: ChaCha8Rng,
}

/// A population of phase-locked units.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Population {
    params: PopulationParams,
    state: State,
    #[derivative(Debug = "ignore")]
    snapshots: HashMap<String, State>,
}

impl Population {
    /// Create a population at time zero, without stimulus.
    /// The function returns an error for negative rates or dead time, or for an invalid waveform.
    pub fn build(params: PopulationParams) -> Result<Self, DecodingError> {
        params.waveform.check()?;
        if !(params.gain.is_finite() && params.gain >= 0.0) {
            return Err(DecodingError::InvalidParameter(format!(
                "The gain must be non-negative, got {}",
                params.gain
            )));
        }
        if !(params.baseline_rate.is_finite() && params.baseline_rate >= 0.0) {
            return Err(DecodingError::InvalidParameter(format!(
                "The baseline rate must be non-negative, got {}",
                params.baseline_rate
            )));
        }
        if !(params.refractory.is_finite() && params.refractory >= 0.0) {
            return Err(DecodingError::InvalidParameter(format!(
                "The dead time must be non-negative, got {}",
                params.refractory
            )));
        }

        let n = params.num_neurons;
        let state = State {
            time: 0.0,
            amplitudes: vec![0.0; n],
            frequencies: vec![0.0; n],
            firing_times: vec![vec![]; n],
            rng: ChaCha8Rng::seed_from_u64(params.seed),
        };
        Ok(Population {
            params,
            state,
            snapshots: HashMap::new(),
        })
    }

    pub fn params(&self) -> &PopulationParams {
        &self.params
    }

    /// Returns the current simulation time (in s).
    pub fn time(&self) -> f64 {
        self.state.time
    }

    /// Returns the firing rate (in Hz) of unit `id` at time `t`.
    fn rate(&self, id: usize, t: f64) -> f64 {
        let input = self.params.waveform.eval(
            self.state.amplitudes[id],
            self.state.frequencies[id],
            t,
        );
        self.params.baseline_rate + self.params.gain * input.max(0.0)
    }

    fn check_len(&self, values: &[f64]) -> Result<(), DecodingError> {
        if values.len() != self.params.num_neurons {
            return Err(DecodingError::IncompatibleLengths {
                expected: self.params.num_neurons,
                found: values.len(),
            });
        }
        Ok(())
    }
}

impl Model for Population {
    fn num_neurons(&self) -> usize {
        self.params.num_neurons
    }

    fn store(&mut self, tag: &str) {
        self.snapshots.insert(tag.to_string(), self.state.clone());
    }

    fn restore(&mut self, tag: &str) -> Result<(), DecodingError> {
        self.state = self
            .snapshots
            .get(tag)
            .cloned()
            .ok_or_else(|| DecodingError::SnapshotNotFound(tag.to_string()))?;
        Ok(())
    }

    fn run(&mut self, duration: f64) -> Result<(), DecodingError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(DecodingError::InvalidParameter(format!(
                "The run duration must be positive and finite, got {}",
                duration
            )));
        }

        let start = self.state.time;
        let end = start + duration;

        for id in 0..self.params.num_neurons {
            let peak_rate = self.params.baseline_rate
                + self.params.gain * self.params.waveform.peak(self.state.amplitudes[id]);
            if !peak_rate.is_finite() {
                return Err(DecodingError::InvalidParameter(format!(
                    "Unit {} has a non-finite peak firing rate",
                    id
                )));
            }
            if peak_rate <= 0.0 {
                continue;
            }
            let inter_event = Exp::new(peak_rate)
                .map_err(|e| DecodingError::InvalidParameter(e.to_string()))?;

            let mut t = start;
            let mut last_spike = self.state.firing_times[id]
                .last()
                .copied()
                .unwrap_or(f64::NEG_INFINITY);
            loop {
                t += inter_event.sample(&mut self.state.rng);
                if t >= end {
                    break;
                }
                if t < last_spike + self.params.refractory {
                    continue;
                }
                let accept: f64 = self.state.rng.gen();
                if accept * peak_rate < self.rate(id, t) {
                    self.state.firing_times[id].push(t);
                    last_spike = t;
                }
            }
        }

        self.state.time = end;
        Ok(())
    }

    fn set_stimulus_current(&mut self, amplitudes: &[f64]) -> Result<(), DecodingError> {
        self.check_len(amplitudes)?;
        if amplitudes.iter().any(|a| !a.is_finite()) {
            return Err(DecodingError::InvalidParameter(
                "Stimulus amplitudes must be finite".to_string(),
            ));
        }
        self.state.amplitudes = amplitudes.to_vec();
        Ok(())
    }

    fn set_frequency(&mut self, frequencies: &[f64]) -> Result<(), DecodingError> {
        self.check_len(frequencies)?;
        if frequencies.iter().any(|f| !f.is_finite()) {
            return Err(DecodingError::InvalidParameter(
                "Stimulus frequencies must be finite".to_string(),
            ));
        }
        self.state.frequencies = frequencies.to_vec();
        Ok(())
    }

    fn spike_trains(&self) -> Vec<SpikeTrain> {
        self.state
            .firing_times
            .iter()
            .enumerate()
            .map(|(id, times)| SpikeTrain::from_sorted(id, times.clone()))
            .collect()
    }
}
