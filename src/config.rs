//! CLI configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use matroska_subtitles::MatroskaError;

/// How ripped cues are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Numbered SubRip blocks
    #[default]
    Srt,
    /// One line per cue with its time range
    Text,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = MatroskaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(MatroskaError::Config(format!("unknown output format '{}'", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = MatroskaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(MatroskaError::Config(format!("unknown log format '{}'", other))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    pub level: String,

    /// Line layout
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cue output format
    pub output_format: OutputFormat,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Log rip progress every this many percent, 0 disables it
    pub progress_step_percent: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Srt,
            logging: LoggingConfig::default(),
            progress_step_percent: 10,
        }
    }
}

impl AppConfig {
    /// Default filter directive for the subscriber
    pub fn log_filter(&self) -> String {
        format!("matroska_subtitles={}", self.logging.level)
    }
}
