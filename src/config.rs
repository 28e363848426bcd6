//! Configuration management for colourscale.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::colourmaps::{ColourMapProperties, DEFAULT_SAMPLES};
use crate::error::{ColourScaleError, Result};

/// Command-line arguments for the colourscale server
#[derive(Parser, Debug)]
#[command(name = "colourscale")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "COLOURSCALE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "COLOURSCALE_PORT")]
    pub port: Option<u16>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "COLOURSCALE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Size of each colour map's precalculated sample table
    #[arg(short, long, env = "COLOURSCALE_SAMPLES")]
    pub samples: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "COLOURSCALE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Palette engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Sample table size for every colour map
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Map used when a request names none
    #[serde(default = "default_colourmap")]
    pub default_colourmap: String,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Palette engine configuration
    #[serde(default)]
    pub palette: PaletteConfig,

    /// Named colour maps registered at startup
    #[serde(default)]
    pub colourmaps: BTreeMap<String, ColourMapProperties>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Environment and command line (clap merges the two) override the file
        if let Some(host) = args.host {
            config.server.host = host;
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(samples) = args.samples {
            config.palette.samples = samples;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.server = other.server;
        self.palette = other.palette;
        self.colourmaps.extend(other.colourmaps);
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(ColourScaleError::Config {
                message: "Server host cannot be empty".to_string(),
            });
        }

        // Validate port (0 is not a valid port for users)
        if self.server.port == 0 {
            return Err(ColourScaleError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ColourScaleError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.palette.samples < 2 {
            return Err(ColourScaleError::Config {
                message: format!(
                    "Sample table size must be at least 2, got {}",
                    self.palette.samples
                ),
            });
        }

        for (name, properties) in &self.colourmaps {
            properties.validate().map_err(|e| ColourScaleError::Config {
                message: format!("Colour map '{}': {}", name, e),
            })?;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            palette: PaletteConfig::default(),
            colourmaps: BTreeMap::new(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            default_colourmap: default_colourmap(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_colourmap() -> String {
    "greyscale".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(config: Option<PathBuf>) -> Args {
        Args {
            host: None,
            port: None,
            config,
            samples: None,
            log_level: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.palette.samples, 4096);
        assert_eq!(config.palette.default_colourmap, "greyscale");
        assert_eq!(config.log_level, "info");
        assert!(config.colourmaps.is_empty());
    }

    #[test]
    fn test_config_file_then_arguments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "server": {{"port": 9100}},
                "palette": {{"samples": 512}},
                "colourmaps": {{"temperature": {{"colours": "blue white red", "range": [-40, 40]}}}}
            }}"#
        )
        .unwrap();

        let mut args = args(Some(file.path().to_path_buf()));
        args.samples = Some(1024);
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.palette.samples, 1024);
        assert_eq!(
            config.colourmaps["temperature"].fixed_range(),
            Some((-40.0, 40.0))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_args(args(Some(PathBuf::from("/nonexistent/colourscale.json"))));
        assert!(matches!(result, Err(ColourScaleError::Io(_))));
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.server.host = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.palette.samples = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colourmaps.insert(
            "bad".to_string(),
            ColourMapProperties {
                range: Some([10.0, 1.0]),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }
}
