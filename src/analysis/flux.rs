//! Spectral flux onset curve.
//!
//! Spectra are independent per frame and computed in parallel batches; the
//! difference against the previous spectrum is strictly sequential, so each
//! batch is reassembled in frame order before it reaches the accumulator.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use super::framer::{frame_count, frames};
use super::spectrum::SpectrumAnalyzer;
use super::FluxCurve;
use crate::audio::Signal;
use crate::error::{invalid, AnalysisError, Result};

/// Frames transformed per parallel batch. Bounds peak memory to
/// `BATCH_FRAMES * window_size` magnitudes.
const BATCH_FRAMES: usize = 256;

/// Previous-spectrum slot of the flux computation.
///
/// Starts empty; the first spectrum yields a flux of 0 and primes it. Owned
/// by a single extraction and discarded with it.
#[derive(Debug, Default)]
pub struct FluxAccumulator {
    previous: Option<Vec<f64>>,
}

impl FluxAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Consume the next spectrum in frame order and return its flux.
    pub fn push(&mut self, spectrum: Vec<f64>) -> f64 {
        let flux = match &self.previous {
            Some(prev) => rectified_increase(prev, &spectrum).sqrt(),
            None => 0.0,
        };
        self.previous = Some(spectrum);
        flux
    }
}

/// Sum of per-bin magnitude increases. Decreases count as zero; NaN is kept.
fn rectified_increase(prev: &[f64], curr: &[f64]) -> f64 {
    curr.iter()
        .zip(prev)
        .map(|(c, p)| {
            let diff = c - p;
            if diff < 0.0 {
                0.0
            } else {
                diff
            }
        })
        .sum()
}

pub(crate) fn validate_frame_params(window_size: usize, hop_size: usize) -> Result<()> {
    if window_size == 0 {
        return Err(invalid("window size must be positive"));
    }
    if hop_size == 0 {
        return Err(invalid("hop size must be positive"));
    }
    Ok(())
}

/// Flux curve of `signal`, one value per analysis window.
///
/// A signal shorter than one window yields an empty curve.
pub fn extract_flux(signal: &Signal, window_size: usize, hop_size: usize) -> Result<FluxCurve> {
    extract_flux_cancellable(signal, window_size, hop_size, &AtomicBool::new(false))
}

/// Like [`extract_flux`], but stops with [`AnalysisError::Cancelled`] once
/// `cancel` is set. The flag is polled between batches.
pub fn extract_flux_cancellable(
    signal: &Signal,
    window_size: usize,
    hop_size: usize,
    cancel: &AtomicBool,
) -> Result<FluxCurve> {
    validate_frame_params(window_size, hop_size)?;
    let mono = signal.to_mono();
    flux_from_mono(&mono, window_size, hop_size, cancel)
}

pub fn flux_from_mono(
    mono: &[f64],
    window_size: usize,
    hop_size: usize,
    cancel: &AtomicBool,
) -> Result<FluxCurve> {
    flux_until(mono, window_size, hop_size, || cancel.load(Ordering::Relaxed))
}

/// Batch loop behind the public entry points. `stop` is polled before each
/// batch; once it returns true the partial curve is dropped.
fn flux_until(
    mono: &[f64],
    window_size: usize,
    hop_size: usize,
    mut stop: impl FnMut() -> bool,
) -> Result<FluxCurve> {
    validate_frame_params(window_size, hop_size)?;

    let total = frame_count(mono.len(), window_size, hop_size);
    if total == 0 {
        log::debug!(
            "Signal of {} samples is shorter than one {}-sample window",
            mono.len(),
            window_size
        );
        return Ok(FluxCurve::default());
    }

    let analyzer = SpectrumAnalyzer::new(window_size);
    let mut accumulator = FluxAccumulator::new();
    let mut values = Vec::with_capacity(total);
    let mut windows = frames(mono, window_size, hop_size);

    loop {
        if stop() {
            log::debug!("Spectral flux cancelled after {} of {} windows", values.len(), total);
            return Err(AnalysisError::Cancelled);
        }

        let batch: Vec<&[f64]> = windows.by_ref().take(BATCH_FRAMES).collect();
        if batch.is_empty() {
            break;
        }

        let spectra: Vec<Vec<f64>> = batch
            .par_iter()
            .map(|frame| analyzer.magnitudes(frame))
            .collect();

        values.extend(spectra.into_iter().map(|s| accumulator.push(s)));
    }

    log::debug!(
        "Spectral flux: {} windows (size={}, hop={})",
        values.len(),
        window_size,
        hop_size
    );

    Ok(FluxCurve::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_spectrum_yields_zero() {
        let mut acc = FluxAccumulator::new();
        assert!(!acc.has_previous());
        assert_eq!(acc.push(vec![5.0, 5.0]), 0.0);
        assert!(acc.has_previous());
    }

    #[test]
    fn test_only_increases_count() {
        let mut acc = FluxAccumulator::new();
        acc.push(vec![1.0, 4.0, 2.0]);
        // +3, -2, +1 -> sqrt(4)
        assert_eq!(acc.push(vec![4.0, 2.0, 3.0]), 2.0);
        // everything decays
        assert_eq!(acc.push(vec![0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_order_matters() {
        let a = vec![0.0, 0.0];
        let b = vec![9.0, 0.0];

        let mut forward = FluxAccumulator::new();
        forward.push(a.clone());
        let rising = forward.push(b.clone());

        let mut backward = FluxAccumulator::new();
        backward.push(b);
        let falling = backward.push(a);

        assert_eq!(rising, 3.0);
        assert_eq!(falling, 0.0);
    }

    #[test]
    fn test_nan_is_not_clamped() {
        let mut acc = FluxAccumulator::new();
        acc.push(vec![0.0]);
        assert!(acc.push(vec![f64::NAN]).is_nan());
    }

    #[test]
    fn test_zero_params_rejected() {
        let signal = Signal::mono(vec![0.0; 64], 8000).unwrap();
        assert!(matches!(
            extract_flux(&signal, 0, 4),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            extract_flux(&signal, 16, 0),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_short_signal_gives_empty_curve() {
        let signal = Signal::mono(vec![0.3; 100], 8000).unwrap();
        assert!(extract_flux(&signal, 128, 64).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_first_batch() {
        let signal = Signal::mono(vec![0.1; 4096], 8000).unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(
            extract_flux_cancellable(&signal, 256, 128, &cancel),
            Err(AnalysisError::Cancelled)
        );
    }

    #[test]
    fn test_cancelled_between_batches() {
        let window = 32;
        let hop = 16;
        let samples: Vec<f64> = (0..hop * BATCH_FRAMES * 3).map(|i| (i % 7) as f64).collect();

        // Let two batches through, then cancel.
        let mut polls = 0;
        let result = flux_until(&samples, window, hop, || {
            polls += 1;
            polls > 2
        });
        assert_eq!(result, Err(AnalysisError::Cancelled));
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_batches_reassemble_in_order() {
        // Enough windows for several batches; an onset halfway through must
        // land at the same index as in a frame-by-frame computation.
        let window = 32;
        let hop = 16;
        let mut samples = vec![0.0f64; hop * (BATCH_FRAMES * 3)];
        let onset = samples.len() / 2;
        for s in &mut samples[onset..] {
            *s = 1.0;
        }

        let parallel = flux_from_mono(&samples, window, hop, &AtomicBool::new(false)).unwrap();

        let analyzer = SpectrumAnalyzer::new(window);
        let mut acc = FluxAccumulator::new();
        let sequential: Vec<f64> = frames(&samples, window, hop)
            .map(|f| acc.push(analyzer.magnitudes(f)))
            .collect();

        assert_eq!(parallel.as_slice(), sequential.as_slice());
        assert!(parallel.iter().any(|&v| v > 0.0));
    }
}
