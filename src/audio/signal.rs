use crate::error::{invalid, Result};

/// Decoded PCM audio: interleaved f32 frames with a fixed channel layout.
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl Signal {
    /// Wrap interleaved samples. Fails when the layout is inconsistent.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(invalid("signal must have at least one channel"));
        }
        if sample_rate == 0 {
            return Err(invalid("sample rate must be positive"));
        }
        if samples.len() % channels != 0 {
            return Err(invalid(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Single-channel signal.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(samples, sample_rate, 1)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of sample frames (one value per channel each).
    pub fn len(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Lazily yields one slice of `channels` values per frame.
    pub fn frames(&self) -> std::slice::ChunksExact<'_, f32> {
        self.samples.chunks_exact(self.channels)
    }

    /// Mix every frame down to one value.
    pub fn to_mono(&self) -> Vec<f64> {
        if self.channels == 1 {
            return self.samples.iter().map(|&s| s as f64).collect();
        }
        self.frames().map(mixdown).collect()
    }
}

/// Arithmetic mean of one frame's channel values; `(L + R) / 2` for stereo.
pub fn mixdown(frame: &[f32]) -> f64 {
    debug_assert!(!frame.is_empty(), "mixdown of an empty frame");
    frame.iter().map(|&s| s as f64).sum::<f64>() / frame.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_stereo_mixdown_averages_channels() {
        assert_eq!(mixdown(&[1.0, 0.0]), 0.5);
        assert_eq!(mixdown(&[0.25, -0.75]), -0.25);
    }

    #[test]
    fn test_multichannel_mixdown_is_mean() {
        assert!((mixdown(&[0.1, 0.2, 0.3, 0.4]) - 0.25).abs() < 1e-7);
    }

    #[test]
    fn test_to_mono_one_value_per_frame() {
        let signal = Signal::new(vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 44100, 2).unwrap();
        assert_eq!(signal.len(), 3);
        assert_eq!(signal.to_mono(), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_channel_mismatch_fails_fast() {
        let err = Signal::new(vec![0.0; 5], 44100, 2).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfiguration(_)));
        assert!(Signal::new(vec![0.0; 4], 44100, 0).is_err());
        assert!(Signal::new(vec![0.0; 4], 0, 1).is_err());
    }

    #[test]
    fn test_nan_propagates_through_mixdown() {
        let signal = Signal::new(vec![f32::NAN, 0.0], 8000, 2).unwrap();
        assert!(signal.to_mono()[0].is_nan());
    }
}
