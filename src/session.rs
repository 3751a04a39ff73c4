//! One loaded audio file and the analyses run against it.
//!
//! Loading is construction and unloading is drop; there is no process-wide
//! "current audio" state.

use std::path::{Path, PathBuf};

use crate::analysis::{FluxReport, Operation, OperationOutput};
use crate::audio::{decode_file, AudioMetadata, DecodeError, DecodedAudio, Signal, TrackTags};
use crate::config::{AnalysisConfig, Config};
use crate::error::Result;
use crate::plot::PlotReport;

/// Bit depth reported for signals handed over as f32 PCM.
const FLOAT_BITS_PER_SAMPLE: u32 = 32;

pub struct AudioSession {
    source: Option<PathBuf>,
    audio: DecodedAudio,
}

impl AudioSession {
    pub fn load(path: &Path) -> std::result::Result<Self, DecodeError> {
        let audio = decode_file(path)?;
        log::debug!("Loaded audio session for {}", path.display());
        Ok(Self {
            source: Some(path.to_path_buf()),
            audio,
        })
    }

    /// Session over samples decoded elsewhere. No tags are available.
    pub fn from_signal(signal: Signal) -> Self {
        Self {
            source: None,
            audio: DecodedAudio {
                signal,
                tags: TrackTags::default(),
                bits_per_sample: FLOAT_BITS_PER_SAMPLE,
            },
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn signal(&self) -> &Signal {
        &self.audio.signal
    }

    pub fn metadata(&self) -> AudioMetadata {
        AudioMetadata::describe(
            &self.audio.signal,
            self.audio.bits_per_sample,
            &self.audio.tags,
        )
    }

    pub fn flux_report(&self, config: &AnalysisConfig) -> Result<FluxReport> {
        FluxReport::compute(&self.audio.signal, config)
    }

    pub fn run(&self, op: Operation, config: &Config) -> Result<OperationOutput> {
        config.validate()?;
        self.output(op, None, config)
    }

    /// Run several operations, computing the flux curve at most once.
    pub fn run_all(&self, ops: &[Operation], config: &Config) -> Result<Vec<OperationOutput>> {
        config.validate()?;
        let flux = if ops.iter().any(|op| op.needs_flux()) {
            Some(self.flux_report(&config.analysis)?)
        } else {
            None
        };
        ops.iter()
            .map(|&op| self.output(op, flux.as_ref(), config))
            .collect()
    }

    fn output(
        &self,
        op: Operation,
        flux: Option<&FluxReport>,
        config: &Config,
    ) -> Result<OperationOutput> {
        if op == Operation::MetadataExtraction {
            return Ok(OperationOutput::MetadataExtraction(self.metadata()));
        }

        let computed;
        let report = match flux {
            Some(report) => report,
            None => {
                computed = self.flux_report(&config.analysis)?;
                &computed
            }
        };

        Ok(match op {
            Operation::Plotting => OperationOutput::Plotting(PlotReport::build(
                &self.audio.signal.to_mono(),
                report.sample_rate,
                &report.smoothed,
                report.hop_size,
                config.plot.target_points,
            )),
            _ => OperationOutput::FluxExtraction(report.clone()),
        })
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        match &self.source {
            Some(path) => log::debug!("Unloaded audio session for {}", path.display()),
            None => log::debug!("Unloaded in-memory audio session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_session() -> AudioSession {
        let mut samples = vec![0.0f32; 44100 * 4];
        for i in (0..samples.len()).step_by(22050) {
            samples[i] = 1.0;
        }
        AudioSession::from_signal(Signal::mono(samples, 44100).unwrap())
    }

    #[test]
    fn test_run_all_keeps_requested_order() {
        let session = click_session();
        let ops = [
            Operation::MetadataExtraction,
            Operation::FluxExtraction,
            Operation::Plotting,
        ];
        let outputs = session.run_all(&ops, &Config::default()).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(matches!(outputs[0], OperationOutput::MetadataExtraction(_)));
        assert!(matches!(outputs[1], OperationOutput::FluxExtraction(_)));
        assert!(matches!(outputs[2], OperationOutput::Plotting(_)));
    }

    #[test]
    fn test_plot_uses_smoothed_flux() {
        let session = click_session();
        let config = Config::default();
        let report = session.flux_report(&config.analysis).unwrap();
        match session.run(Operation::Plotting, &config).unwrap() {
            OperationOutput::Plotting(plot) => {
                assert_eq!(plot.flux.max, report.smoothed.as_slice());
                assert_eq!(plot.waveform.len(), config.plot.target_points);
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_in_memory_metadata() {
        let session = click_session();
        assert!(session.source().is_none());
        let meta = session.metadata();
        assert_eq!(meta.duration_ms, 4000);
        assert_eq!(meta.decoded_bitrate, 44100 * 32);
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let session = click_session();
        let mut config = Config::default();
        config.analysis.window_size = 0;
        assert!(session.run(Operation::MetadataExtraction, &config).is_err());
        assert!(session.run_all(&[], &config).is_err());
    }
}
