use clap::Parser;
use fluxtempo::{Operation, TempoSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fluxtempo",
    about = "Spectral-flux onset curves and tempo estimates for audio files"
)]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (default: ./fluxtempo.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Operations to run (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub operations: Vec<Operation>,

    /// Samples per analysis window
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Samples between consecutive windows
    #[arg(long)]
    pub hop_size: Option<usize>,

    /// Moving-average width applied to the flux curve (0 or 1 disables)
    #[arg(long)]
    pub smoothing: Option<usize>,

    /// Slowest tempo considered
    #[arg(long)]
    pub min_bpm: Option<f64>,

    /// Fastest tempo considered
    #[arg(long)]
    pub max_bpm: Option<f64>,

    /// Curve the tempo estimator reads
    #[arg(long, value_enum)]
    pub tempo_source: Option<TempoSource>,

    /// Maximum points per plotted series
    #[arg(long)]
    pub plot_points: Option<usize>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Also write each raw flux curve as native-endian f64 to <DIR>/<stem>.flux
    #[arg(long, value_name = "DIR")]
    pub raw_flux_dir: Option<PathBuf>,
}
