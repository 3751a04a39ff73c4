//! Hann-windowed magnitude spectra.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Symmetric Hann window: `0.5 * (1 - cos(2*pi*i / (size - 1)))`.
pub fn hann_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (size - 1) as f64).cos()))
        .collect()
}

/// Planned forward FFT and its analysis window for one frame size.
///
/// Shared across worker threads; `magnitudes` takes `&self` and allocates
/// its own buffer per call.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
}

impl SpectrumAnalyzer {
    pub fn new(window_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);
        Self {
            fft,
            window: hann_window(window_size),
        }
    }

    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Magnitude of every DFT coefficient of the windowed frame.
    ///
    /// # Panics
    ///
    /// Panics if `frame.len()` differs from the planned window size.
    pub fn magnitudes(&self, frame: &[f64]) -> Vec<f64> {
        assert_eq!(
            frame.len(),
            self.window.len(),
            "frame length does not match the planned window size"
        );

        let mut buffer: Vec<Complex<f64>> = frame
            .iter()
            .zip(&self.window)
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();

        self.fft.process(&mut buffer);

        buffer.iter().map(|c| c.norm()).collect()
    }
}
