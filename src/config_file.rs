//! Configuration file support
//!
//! Loads CLI configuration from TOML files. Every section is optional and
//! missing values fall back to [`AppConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use matroska_subtitles::{MatroskaError, Result};

use crate::config::{AppConfig, LoggingConfig};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Output settings
    pub output: Option<OutputSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Progress reporting settings
    pub progress: Option<ProgressSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// srt, text or json
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSettings {
    /// Percent of the stream between progress log lines
    pub step_percent: Option<u8>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| MatroskaError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MatroskaError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            output: Some(OutputSettings {
                format: "srt".to_string(),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
            progress: Some(ProgressSettings {
                step_percent: Some(10),
            }),
        }
    }

    /// Convert to AppConfig, rejecting unknown format names
    pub fn into_app_config(self) -> Result<AppConfig> {
        let defaults = AppConfig::default();

        let output_format = match self.output {
            Some(output) => output.format.parse()?,
            None => defaults.output_format,
        };

        let logging = match self.logging {
            Some(logging) => LoggingConfig {
                level: logging.level,
                format: match logging.format {
                    Some(format) => format.parse()?,
                    None => defaults.logging.format,
                },
            },
            None => defaults.logging,
        };

        let progress_step_percent = self
            .progress
            .and_then(|p| p.step_percent)
            .unwrap_or(defaults.progress_step_percent)
            .min(100);

        Ok(AppConfig {
            output_format,
            logging,
            progress_step_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, OutputFormat};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default_config().into_app_config().unwrap();
        assert_eq!(config.output_format, OutputFormat::Srt);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.progress_step_percent, 10);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = ConfigFile::default_config();
        let temp_file = NamedTempFile::new().unwrap();

        config.to_file(temp_file.path()).unwrap();

        let loaded = ConfigFile::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.output.unwrap().format, "srt");
        assert_eq!(loaded.logging.unwrap().level, "info");
    }

    #[test]
    fn test_partial_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nformat = \"json\"\n")
            .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_app_config()
            .unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.progress_step_percent, 10);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nlevel = \"warn\"\nformat = \"xml\"\n")
            .unwrap();

        let result = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_app_config();
        assert!(matches!(result, Err(MatroskaError::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[output\nformat = 3").unwrap();
        assert!(matches!(
            ConfigFile::from_file(temp_file.path()),
            Err(MatroskaError::Config(_))
        ));
    }

    #[test]
    fn test_step_clamped() {
        let file = ConfigFile {
            progress: Some(ProgressSettings {
                step_percent: Some(250),
            }),
            ..Default::default()
        };
        assert_eq!(file.into_app_config().unwrap().progress_step_percent, 100);
    }
}
