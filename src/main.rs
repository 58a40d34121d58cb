//! Matroska subtitle extractor
//!
//! Lists the tracks of a Matroska/WebM file, or rips the cues of one
//! subtitle track as SRT, plain text or JSON.
//!
//! Usage: `matroska-subtitles [--config <path>] <file> [track-number]`
//! or `matroska-subtitles --write-default-config <path>`

mod config;
mod config_file;
mod output;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matroska_subtitles::{MatroskaError, MatroskaFile, Result};

use crate::config::{AppConfig, LogFormat};
use crate::config_file::ConfigFile;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "matroska-subtitles";

/// Config file picked up from the working directory
const DEFAULT_CONFIG_PATH: &str = "matroska-subtitles.toml";

/// Matroska subtitle extractor
#[derive(Parser, Debug)]
#[command(name = "matroska-subtitles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Matroska/WebM file to read
    #[arg(required_unless_present = "write_default_config")]
    input: Option<PathBuf>,

    /// Track to rip; without it the tracks are listed
    track: Option<u64>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a default configuration file to this path and exit
    #[arg(long, conflicts_with_all = ["input", "track"])]
    write_default_config: Option<PathBuf>,
}

/// Load the explicit config file, else the default one if present, else defaults
fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return ConfigFile::from_file(path)?.into_app_config();
    }

    if !Path::new(DEFAULT_CONFIG_PATH).exists() {
        return Ok(AppConfig::default());
    }

    match ConfigFile::from_file(DEFAULT_CONFIG_PATH).and_then(ConfigFile::into_app_config) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Failed to load config file {}: {}. Using defaults.",
                DEFAULT_CONFIG_PATH, e
            );
            Ok(AppConfig::default())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.write_default_config {
        ConfigFile::default_config().to_file(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let input = cli
        .input
        .ok_or_else(|| MatroskaError::Config("no input file given".to_string()))?;
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::debug!("Configuration loaded: {:?}", config);

    let mut file = MatroskaFile::open_path(&input)?;
    if !file.is_valid() {
        tracing::warn!("{} is not a Matroska file", input.display());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.track {
        None => {
            let summary = file.media_summary()?;
            let tracks = file.track_list()?;
            let subtitle_tracks = file.subtitle_track_list()?;
            output::write_overview(
                &mut out,
                &summary,
                &tracks,
                &subtitle_tracks,
                config.output_format,
            )?;
        }
        Some(track) => {
            let summary = file.media_summary()?;
            let step = config.progress_step_percent as u64;
            let mut next_report = step;

            let sequences = file.rip_subtitles_with_progress(track, |done, total| {
                if step == 0 || total == 0 {
                    return;
                }
                let percent = done.saturating_mul(100) / total;
                if percent >= next_report {
                    tracing::info!("Ripping track {}: {}%", track, percent);
                    next_report = (percent / step + 1) * step;
                }
            })?;

            tracing::info!("Track {}: {} cues", track, sequences.len());
            let cues = output::to_cues(&sequences, summary.timecode_scale);
            output::write_cues(&mut out, &cues, config.output_format)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());

    let (pretty, json) = match config.logging.format {
        LogFormat::Pretty => (
            Some(tracing_subscriber::fmt::layer().with_writer(io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once(APP_NAME).chain(args.iter().copied()))
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_file_only() {
        let cli = parse(&["movie.mkv"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("movie.mkv")));
        assert_eq!(cli.track, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_track_and_config() {
        let cli = parse(&["--config", "c.toml", "movie.mkv", "3"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.input, Some(PathBuf::from("movie.mkv")));
        assert_eq!(cli.track, Some(3));

        let cli = parse(&["--config=x.toml", "a.mkv"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert_eq!(cli.input, Some(PathBuf::from("a.mkv")));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert!(parse(&[]).is_err());
        assert!(parse(&["movie.mkv", "three"]).is_err());
        assert!(parse(&["movie.mkv", "--config"]).is_err());
        assert!(parse(&["a.mkv", "1", "2"]).is_err());
    }

    #[test]
    fn test_parse_write_default_config() {
        let cli = parse(&["--write-default-config", "out.toml"]).unwrap();
        assert_eq!(cli.write_default_config, Some(PathBuf::from("out.toml")));
        assert_eq!(cli.input, None);

        assert!(parse(&["--write-default-config", "out.toml", "movie.mkv"]).is_err());
    }

    #[test]
    fn test_explicit_config_must_load() {
        assert!(load_config(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }
}
