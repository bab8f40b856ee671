//! Stimulus parameter inference from a single spike train.
//!
//! The frequency is recovered with a superposition method: the inter-spike intervals of a neuron
//! locked to a periodic drive cluster around multiples of the stimulus period, so the spacing
//! between consecutive peaks of the smoothed ISI distribution estimates the period itself.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::DecodingError;
use crate::kernel::{kernel_density, normalize};
use crate::peaks::find_peaks;
use crate::utils::{arange, argmax, diff};

/// Upper limit (excluded) of the ISI bins, in milliseconds.
pub const ISI_RANGE: f64 = 350.0;
/// Upper limit (excluded) of the peak-spacing bins, in milliseconds.
pub const PERIOD_RANGE: f64 = 15.0;

/// The outcome of an inference, which might be undefined when the spike train carries too little structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Inference {
    Value(f64),
    Undefined,
}

impl Inference {
    /// Returns the inferred value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Inference::Value(value) => Some(*value),
            Inference::Undefined => None,
        }
    }

    /// Returns the inferred value, or NaN if undefined.
    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Inference::Undefined)
    }
}

/// Tuning parameters of the frequency inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyInferenceParams {
    /// The spread of the gaussian placed at every ISI.
    pub t1: f64,
    /// The spread of the gaussian placed at every peak spacing.
    pub t2: f64,
    /// The width of the ISI bins.
    pub res: f64,
    /// The minimum prominence of an ISI peak.
    pub prom: f64,
    /// The width of the peak-spacing bins.
    pub time_step: f64,
}

impl Default for FrequencyInferenceParams {
    fn default() -> Self {
        FrequencyInferenceParams {
            t1: 0.6,
            t2: 0.3,
            res: 0.1,
            prom: 0.5,
            time_step: 0.01,
        }
    }
}

impl FrequencyInferenceParams {
    /// Check that the spreads and bin widths are positive and the prominence non-negative.
    pub fn validate(&self) -> Result<(), DecodingError> {
        for (name, value) in [
            ("t1", self.t1),
            ("t2", self.t2),
            ("res", self.res),
            ("time_step", self.time_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DecodingError::InvalidParameter(format!(
                    "The inference parameter {} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !(self.prom.is_finite() && self.prom >= 0.0) {
            return Err(DecodingError::InvalidParameter(format!(
                "The minimum prominence must be non-negative, got {}",
                self.prom
            )));
        }
        Ok(())
    }
}

/// Infer the stimulus frequency (in Hz) from spike times expressed in milliseconds.
///
/// Any failure along the way, e.g., fewer than two spikes or fewer than two ISI peaks, results in
/// [`Inference::Undefined`] and is never propagated.
///
/// # Examples
///
/// ```rust
/// use adex_decoding::inference::{infer_frequency, FrequencyInferenceParams, Inference};
///
/// // a single spike carries no interval
/// let params = FrequencyInferenceParams::default();
/// assert_eq!(infer_frequency(&[10.0], &params), Inference::Undefined);
/// ```
pub fn infer_frequency(spike_times: &[f64], params: &FrequencyInferenceParams) -> Inference {
    match superposition_frequency(spike_times, params) {
        Ok(frequency) if frequency.is_finite() => Inference::Value(frequency),
        Ok(frequency) => {
            debug!("Frequency inference produced a non-finite estimate {}", frequency);
            Inference::Undefined
        }
        Err(e) => {
            debug!("Frequency inference failed: {}", e);
            Inference::Undefined
        }
    }
}

fn superposition_frequency(
    spike_times: &[f64],
    params: &FrequencyInferenceParams,
) -> Result<f64, DecodingError> {
    params.validate()?;

    let isi_bins = arange(0.0, ISI_RANGE, params.res)?;
    let isi = diff(spike_times);

    let mut isi_density = kernel_density(&isi_bins, &isi, params.t1)?;
    normalize(&mut isi_density)?;

    let peak_locations: Vec<f64> = find_peaks(&isi_density, params.prom)
        .into_iter()
        .map(|pos| isi_bins[pos])
        .collect();
    let peak_spacings = diff(&peak_locations);

    let period_bins = arange(0.0, PERIOD_RANGE, params.time_step)?;
    let period_density = kernel_density(&period_bins, &peak_spacings, params.t2)?;

    let pos = argmax(&period_density).ok_or_else(|| {
        DecodingError::InvalidParameter("The peak-spacing bins are empty".to_string())
    })?;
    Ok(1000.0 / period_bins[pos])
}

/// Infer a proxy for the stimulus amplitude, i.e., the number of spikes.
pub fn infer_amplitude(spike_times: &[f64]) -> usize {
    spike_times.len()
}
