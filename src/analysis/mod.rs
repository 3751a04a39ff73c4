//! Spectral-flux onset curves and tempo estimation.
//!
//! mono samples -> [`framer`] -> [`spectrum`] -> [`flux`] -> [`smooth`] / [`tempo`]

pub mod flux;
pub mod framer;
pub mod operation;
pub mod smooth;
pub mod spectrum;
pub mod tempo;

use serde::Serialize;
use std::ops::Deref;

pub use flux::{extract_flux, extract_flux_cancellable, flux_from_mono, FluxAccumulator};
pub use framer::{frame_count, frames, Frames};
pub use operation::{FluxReport, Operation, OperationOutput, TempoSource};
pub use smooth::smooth;
pub use spectrum::{hann_window, SpectrumAnalyzer};
pub use tempo::{estimate_tempo, flux_fps, BpmRange, TempoEstimate};

/// One onset-strength value per analysis window, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FluxCurve(Vec<f64>);

impl FluxCurve {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for FluxCurve {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FluxCurve {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for FluxCurve {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
