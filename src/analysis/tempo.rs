//! Autocorrelation tempo estimate over an onset curve.
//!
//! Periodicity is searched in onset timing rather than in the waveform, and
//! only over lags that map to a plausible BPM range. Long lags outside that
//! range would otherwise pick up octave errors.

use serde::Serialize;

use crate::error::{invalid, AnalysisError, Result};

/// Inclusive tempo search bounds in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmRange {
    pub min: f64,
    pub max: f64,
}

impl Default for BpmRange {
    fn default() -> Self {
        Self {
            min: 60.0,
            max: 180.0,
        }
    }
}

impl BpmRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 {
            return Err(invalid(format!(
                "BPM bounds must be positive and finite, got {}..{}",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(invalid(format!(
                "min BPM {} must be below max BPM {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Lag bounds in flux frames: the fastest tempo gives the shortest lag.
    pub fn lag_bounds(&self, flux_fps: f64) -> Result<(usize, usize)> {
        self.validate()?;
        let min_lag = (flux_fps * 60.0 / self.max).floor() as usize;
        let max_lag = (flux_fps * 60.0 / self.min).floor() as usize;
        if min_lag == 0 {
            return Err(invalid(format!(
                "{:.3} flux frames per second cannot resolve {} BPM",
                flux_fps, self.max
            )));
        }
        Ok((min_lag, max_lag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempoEstimate {
    pub bpm: f64,
    pub lag_in_frames: usize,
    pub correlation: f64,
}

/// Flux values per second for a given sample rate and hop.
pub fn flux_fps(sample_rate: u32, hop_size: usize) -> f64 {
    sample_rate as f64 / hop_size as f64
}

/// Best-fitting beat period of `curve`, converted to BPM.
///
/// Lags are scanned in ascending order and the first strict maximum wins.
/// A curve with no positive correlation at any lag in range (empty, too
/// short, or flat) yields [`AnalysisError::NoTempoFound`].
pub fn estimate_tempo(
    curve: &[f64],
    sample_rate: u32,
    hop_size: usize,
    range: BpmRange,
) -> Result<TempoEstimate> {
    if sample_rate == 0 || hop_size == 0 {
        return Err(invalid("sample rate and hop size must be positive"));
    }

    let fps = flux_fps(sample_rate, hop_size);
    let (min_lag, max_lag) = range.lag_bounds(fps)?;
    let not_found = AnalysisError::NoTempoFound {
        min_bpm: range.min,
        max_bpm: range.max,
    };

    // A constant curve has no periodicity; rounding in the mean must not invent one.
    match curve.first() {
        None => return Err(not_found),
        Some(&first) if curve.iter().all(|&v| v == first) => return Err(not_found),
        Some(_) => {}
    }

    let mean = curve.iter().sum::<f64>() / curve.len() as f64;
    let last_lag = max_lag.min(curve.len() - 1);

    let mut best_lag = 0;
    let mut best_correlation = 0.0;

    for lag in min_lag..=last_lag {
        let correlation = autocorrelation(curve, mean, lag);
        if correlation > best_correlation {
            best_correlation = correlation;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        log::debug!(
            "No positive correlation for lags {}..={} over {} flux frames",
            min_lag,
            max_lag,
            curve.len()
        );
        return Err(not_found);
    }

    let bpm = 60.0 / (best_lag as f64 / fps);
    log::debug!(
        "Tempo: lag {} frames -> {:.2} BPM (corr={:.4})",
        best_lag,
        bpm,
        best_correlation
    );

    Ok(TempoEstimate {
        bpm,
        lag_in_frames: best_lag,
        correlation: best_correlation,
    })
}

/// Mean-removed correlation of the curve with itself shifted by `lag`.
fn autocorrelation(curve: &[f64], mean: f64, lag: usize) -> f64 {
    curve
        .iter()
        .zip(&curve[lag..])
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;
    const HOP: usize = 512;

    fn pulse_train(len: usize, period: usize) -> Vec<f64> {
        (0..len).map(|i| if i % period == 0 { 1.0 } else { 0.0 }).collect()
    }

    #[test]
    fn test_default_lag_bounds() {
        let (min_lag, max_lag) = BpmRange::default().lag_bounds(flux_fps(SR, HOP)).unwrap();
        assert_eq!((min_lag, max_lag), (28, 86));
    }

    #[test]
    fn test_recovers_pulse_period() {
        let curve = pulse_train(800, 43);
        let estimate = estimate_tempo(&curve, SR, HOP, BpmRange::default()).unwrap();
        assert_eq!(estimate.lag_in_frames, 43);
        assert!((estimate.bpm - 120.19).abs() < 0.01);
        assert!(estimate.correlation > 0.0);
    }

    #[test]
    fn test_prefers_shortest_matching_period() {
        // Period 30 also correlates at 60; the shorter lag sums more terms.
        let curve = pulse_train(2000, 30);
        let estimate = estimate_tempo(&curve, SR, HOP, BpmRange::default()).unwrap();
        assert_eq!(estimate.lag_in_frames, 30);
    }

    #[test]
    fn test_flat_curve_has_no_tempo() {
        let curve = vec![0.7; 500];
        assert!(matches!(
            estimate_tempo(&curve, SR, HOP, BpmRange::default()),
            Err(AnalysisError::NoTempoFound { .. })
        ));
    }

    #[test]
    fn test_short_curve_has_no_tempo() {
        // min_lag is 28; 28 values leave no lag to evaluate.
        let curve = pulse_train(28, 5);
        assert!(matches!(
            estimate_tempo(&curve, SR, HOP, BpmRange::default()),
            Err(AnalysisError::NoTempoFound { .. })
        ));
        assert!(matches!(
            estimate_tempo(&[], SR, HOP, BpmRange::default()),
            Err(AnalysisError::NoTempoFound { .. })
        ));
    }

    #[test]
    fn test_invalid_ranges_fail_fast() {
        assert!(BpmRange::new(180.0, 60.0).is_err());
        assert!(BpmRange::new(120.0, 120.0).is_err());
        assert!(BpmRange::new(0.0, 120.0).is_err());
        assert!(BpmRange::new(60.0, f64::INFINITY).is_err());

        let inverted = BpmRange {
            min: 200.0,
            max: 100.0,
        };
        assert!(matches!(
            estimate_tempo(&pulse_train(800, 43), SR, HOP, inverted),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unresolvable_lag_is_invalid() {
        // 8000 / 4096 ~= 1.95 frames per second, less than one frame per beat at 180 BPM.
        let err = estimate_tempo(&pulse_train(800, 3), 8000, 4096, BpmRange::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_range_narrows_search() {
        // A 43-frame period with a range that excludes ~120 BPM must not report it.
        let curve = pulse_train(800, 43);
        let slow = BpmRange::new(50.0, 70.0).unwrap();
        let estimate = estimate_tempo(&curve, SR, HOP, slow).unwrap();
        assert_eq!(estimate.lag_in_frames, 86);
    }
}
