//! Spectral-flux onset curves and autocorrelation tempo estimates from
//! decoded audio.
//!
//! ```no_run
//! use fluxtempo::{estimate_tempo, extract_flux, smooth, BpmRange, Signal};
//!
//! let signal = Signal::new(vec![0.0; 2 * 44100 * 10], 44100, 2)?;
//! let flux = extract_flux(&signal, 1024, 512)?;
//! let smoothed = smooth(&flux, 50);
//! let tempo = estimate_tempo(&flux, signal.sample_rate(), 512, BpmRange::default());
//! # Ok::<(), fluxtempo::AnalysisError>(())
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod plot;
pub mod session;

pub use analysis::{
    estimate_tempo, extract_flux, smooth, BpmRange, FluxCurve, Operation, OperationOutput,
    TempoEstimate, TempoSource,
};
pub use audio::Signal;
pub use config::{AnalysisConfig, Config, PlotConfig};
pub use error::{AnalysisError, Result};
pub use session::AudioSession;
