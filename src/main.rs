mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cli::Cli;
use fluxtempo::config::{self, Config};
use fluxtempo::export;
use fluxtempo::{AudioSession, Operation, OperationOutput};

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    results: Vec<OperationOutput>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(config::find_config_path);
    let mut cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) if cli.config.is_some() => return Err(err),
            Err(err) => {
                log::warn!("{:#}; using defaults", err);
                Config::default()
            }
        },
        None => Config::default(),
    };
    apply_overrides(&mut cfg, &cli);
    cfg.validate().context("Invalid analysis configuration")?;

    let operations = if !cli.operations.is_empty() {
        cli.operations.clone()
    } else if !cfg.operations.is_empty() {
        cfg.operations.clone()
    } else {
        vec![Operation::FluxExtraction]
    };

    log::info!("fluxtempo - spectral flux tempo estimation");
    log::info!("Operations: {:?}", operations);
    log::info!(
        "Window: {} samples, hop: {} samples, smoothing: {}, BPM range: {}-{}",
        cfg.analysis.window_size,
        cfg.analysis.hop_size,
        cfg.analysis.smoothing_window,
        cfg.analysis.min_bpm,
        cfg.analysis.max_bpm
    );

    if let Some(ref dir) = cli.raw_flux_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let pb = if cli.inputs.len() > 1 {
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }

        log::info!("Analyzing {}", input.display());
        let session = AudioSession::load(input)
            .with_context(|| format!("Failed to decode {}", input.display()))?;
        let results = session
            .run_all(&operations, &cfg)
            .with_context(|| format!("Analysis failed for {}", input.display()))?;

        for result in &results {
            if let OperationOutput::FluxExtraction(report) = result {
                match report.tempo {
                    Some(ref tempo) => log::info!(
                        "{}: {:.2} BPM (lag {} frames, corr={:.4}), {} flux frames",
                        input.display(),
                        tempo.bpm,
                        tempo.lag_in_frames,
                        tempo.correlation,
                        report.flux.len()
                    ),
                    None => log::info!(
                        "{}: tempo unknown, {} flux frames",
                        input.display(),
                        report.flux.len()
                    ),
                }

                if let Some(ref dir) = cli.raw_flux_dir {
                    let path = raw_flux_path(dir, input);
                    export::write_curve(&path, &report.flux)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Wrote raw flux to {}", path.display());
                }
            }
        }

        reports.push(FileReport {
            path: input.clone(),
            results,
        });
        drop(session);

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Analysis complete");
    }

    write_report(&reports, cli.output.as_deref(), cli.pretty)?;
    Ok(())
}

fn apply_overrides(cfg: &mut Config, cli: &Cli) {
    let analysis = &mut cfg.analysis;
    if let Some(v) = cli.window_size { analysis.window_size = v; }
    if let Some(v) = cli.hop_size { analysis.hop_size = v; }
    if let Some(v) = cli.smoothing { analysis.smoothing_window = v; }
    if let Some(v) = cli.min_bpm { analysis.min_bpm = v; }
    if let Some(v) = cli.max_bpm { analysis.max_bpm = v; }
    if let Some(v) = cli.tempo_source { analysis.tempo_source = v; }
    if let Some(v) = cli.plot_points { cfg.plot.target_points = v; }
}

fn raw_flux_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    dir.join(format!("{}.flux", stem))
}

fn write_report(reports: &[FileReport], output: Option<&Path>, pretty: bool) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    if pretty {
        serde_json::to_writer_pretty(&mut writer, reports)?;
    } else {
        serde_json::to_writer(&mut writer, reports)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = output {
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}
