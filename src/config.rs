use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::flux::validate_frame_params;
use crate::analysis::{BpmRange, Operation, TempoSource};
use crate::error::invalid;

const CONFIG_FILE: &str = "fluxtempo.toml";
const APP_DIR: &str = "fluxtempo";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    #[serde(default = "default_min_bpm")]
    pub min_bpm: f64,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f64,
    /// Which curve the tempo estimator reads.
    #[serde(default)]
    pub tempo_source: TempoSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Upper bound on points per plotted series.
    #[serde(default = "default_target_points")]
    pub target_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            hop_size: default_hop_size(),
            smoothing_window: default_smoothing_window(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            tempo_source: TempoSource::default(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            target_points: default_target_points(),
        }
    }
}

impl AnalysisConfig {
    pub fn bpm_range(&self) -> BpmRange {
        BpmRange {
            min: self.min_bpm,
            max: self.max_bpm,
        }
    }

    /// Reject settings the pipeline cannot run with. Nothing is clamped.
    pub fn validate(&self) -> crate::Result<()> {
        validate_frame_params(self.window_size, self.hop_size)?;
        self.bpm_range().validate()
    }
}

impl PlotConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.target_points == 0 {
            return Err(invalid("plot target points must be positive"));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> crate::Result<()> {
        self.analysis.validate()?;
        self.plot.validate()
    }
}

fn default_window_size() -> usize { 1024 }
fn default_hop_size() -> usize { 512 }
fn default_smoothing_window() -> usize { 50 }
fn default_min_bpm() -> f64 { 60.0 }
fn default_max_bpm() -> f64 { 180.0 }
fn default_target_points() -> usize { 2000 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// `./fluxtempo.toml`, then `~/.config/fluxtempo/config.toml`, then the platform config dir.
pub fn find_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join(APP_DIR).join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join(APP_DIR).join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
