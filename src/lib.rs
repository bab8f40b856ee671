//! This crate provides tools to decode the frequency and amplitude of a periodic stimulus from the
//! spike trains of a stimulated population, and to quantify how well two stimulus levels can be
//! told apart.
//!
//! # Inferring Stimulus Parameters
//!
//! ```rust
//! use adex_decoding::inference::{infer_amplitude, infer_frequency, FrequencyInferenceParams};
//!
//! // Spike times (in ms) locked to a 5 ms period, skipping cycles
//! let mut t = 0.0;
//! let times: Vec<f64> = (0..60).map(|n| { t += 5.0 * ((n % 3) + 1) as f64; t }).collect();
//!
//! let params = FrequencyInferenceParams { res: 0.25, prom: 0.01, time_step: 0.05, ..Default::default() };
//! let frequency = infer_frequency(&times, &params).value().unwrap();
//! assert!((frequency - 200.0).abs() < 2.5);
//!
//! assert_eq!(infer_amplitude(&times), 60);
//! ```
//!
//! # Sweeping a Model
//!
//! ```rust
//! use adex_decoding::discrimination::discrimination_combinations;
//! use adex_decoding::population::{Population, PopulationParams, Waveform};
//! use adex_decoding::sweep::{evaluate_amplitude_discrimination, AmplitudeSweep};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut model = Population::build(PopulationParams::new(20, Waveform::Sine)).unwrap();
//!
//! // Sweep the amplitude over 10, 20 and 30, with random nuisance frequencies
//! let sweep = AmplitudeSweep { t_max: 1.0, ..AmplitudeSweep::new(10.0, 30.0, 10.0) };
//! let (spike_trains, inferred) = evaluate_amplitude_discrimination(&mut model, &sweep, &mut rng).unwrap();
//! assert_eq!(spike_trains.levels(), vec![10.0, 20.0, 30.0]);
//!
//! // Score every pair of levels
//! let grid = discrimination_combinations(&inferred);
//! assert!(grid.score(10.0, 30.0).unwrap() > 0.9);
//! ```

pub mod config;
pub mod discrimination;
pub mod error;
pub mod inference;
pub mod kernel;
pub mod levels;
pub mod peaks;
pub mod persistence;
pub mod population;
pub mod roc;
pub mod spike_train;
pub mod sweep;
pub mod utils;
