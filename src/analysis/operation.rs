//! The closed set of analyses a session can run, each with its own output.

use serde::{Deserialize, Serialize};

use super::{estimate_tempo, extract_flux, smooth, FluxCurve, TempoEstimate};
use crate::audio::{AudioMetadata, Signal};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::plot::PlotReport;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Flux curve, smoothed curve and tempo estimate
    #[value(alias = "flux")]
    FluxExtraction,
    /// Downsampled waveform and flux series for a plot renderer
    #[value(alias = "plot")]
    Plotting,
    /// Stream properties and track tags
    #[value(alias = "metadata")]
    MetadataExtraction,
}

impl Operation {
    pub fn needs_flux(self) -> bool {
        matches!(self, Operation::FluxExtraction | Operation::Plotting)
    }
}

/// Which flux curve feeds the tempo estimator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TempoSource {
    #[default]
    Raw,
    Smoothed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum OperationOutput {
    FluxExtraction(FluxReport),
    Plotting(PlotReport),
    MetadataExtraction(AudioMetadata),
}

#[derive(Debug, Clone, Serialize)]
pub struct FluxReport {
    pub sample_rate: u32,
    pub window_size: usize,
    pub hop_size: usize,
    pub smoothing_window: usize,
    pub tempo_source: TempoSource,
    pub tempo: Option<TempoEstimate>,
    /// Set instead of `tempo` when no tempo could be found.
    pub tempo_unknown: Option<String>,
    pub flux: FluxCurve,
    pub smoothed: FluxCurve,
}

impl FluxReport {
    /// Run the full pipeline over `signal`.
    ///
    /// NoTempoFound is reported as an unknown tempo; every other error is
    /// returned.
    pub fn compute(signal: &Signal, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let flux = extract_flux(signal, config.window_size, config.hop_size)?;
        let smoothed = smooth(&flux, config.smoothing_window);

        let source = match config.tempo_source {
            TempoSource::Raw => &flux,
            TempoSource::Smoothed => &smoothed,
        };

        let (tempo, tempo_unknown) = match estimate_tempo(
            source,
            signal.sample_rate(),
            config.hop_size,
            config.bpm_range(),
        ) {
            Ok(estimate) => (Some(estimate), None),
            Err(err @ AnalysisError::NoTempoFound { .. }) => {
                log::warn!("Tempo unknown: {}", err);
                (None, Some(err.to_string()))
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            sample_rate: signal.sample_rate(),
            window_size: config.window_size,
            hop_size: config.hop_size,
            smoothing_window: config.smoothing_window,
            tempo_source: config.tempo_source,
            tempo,
            tempo_unknown,
            flux,
            smoothed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_reports_unknown_tempo() {
        let signal = Signal::mono(vec![0.0; 44100], 44100).unwrap();
        let report = FluxReport::compute(&signal, &AnalysisConfig::default()).unwrap();
        assert!(report.tempo.is_none());
        assert!(report.tempo_unknown.is_some());
        assert_eq!(report.flux.len(), report.smoothed.len());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let signal = Signal::mono(vec![0.0; 44100], 44100).unwrap();
        let config = AnalysisConfig {
            min_bpm: 180.0,
            max_bpm: 60.0,
            ..Default::default()
        };
        assert!(matches!(
            FluxReport::compute(&signal, &config),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_serialized_output_is_tagged() {
        let signal = Signal::mono(vec![0.0; 100], 8000).unwrap();
        let meta = AudioMetadata::describe(&signal, 16, &Default::default());
        let json = serde_json::to_value(OperationOutput::MetadataExtraction(meta)).unwrap();
        assert_eq!(json["operation"], "metadata-extraction");
        assert_eq!(json["sample_rate"], 8000);
    }

    #[test]
    fn test_only_metadata_skips_flux() {
        assert!(Operation::FluxExtraction.needs_flux());
        assert!(Operation::Plotting.needs_flux());
        assert!(!Operation::MetadataExtraction.needs_flux());
    }
}
