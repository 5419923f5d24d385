//! Configuration file support for vctools.
//!
//! Two locations are read:
//! - Global: `~/.vctools/config.toml` - User-wide defaults
//! - Project: `.vctools/config.toml` - Directory-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::toolchain::default_encoding;

/// vctools configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for toolchain selection
    pub defaults: DefaultsConfig,

    /// Setup script output handling
    pub capture: CaptureConfig,
}

/// Defaults used when no flag is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DefaultsConfig {
    /// Visual Studio version label (e.g., "2015")
    pub version: Option<String>,

    /// Platform passed to vcvarsall.bat (e.g., "amd64")
    pub target_platform: Option<String>,
}

/// Setup script capture settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Encoding label of the script output (e.g., "ibm866", "windows-1252")
    pub encoding: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.defaults.version.is_some() {
            self.defaults.version = other.defaults.version;
        }
        if other.defaults.target_platform.is_some() {
            self.defaults.target_platform = other.defaults.target_platform;
        }
        if other.capture.encoding.is_some() {
            self.capture.encoding = other.capture.encoding;
        }
    }

    /// Encoding for setup script output.
    ///
    /// Unknown labels fall back to the platform default, as do encodings
    /// that are not ASCII compatible (UTF-16), since script output is split
    /// on single `\n` bytes.
    pub fn encoding(&self) -> &'static Encoding {
        match self.capture.encoding.as_deref() {
            Some(label) => Encoding::for_label(label.as_bytes())
                .filter(|encoding| encoding.is_ascii_compatible())
                .unwrap_or_else(|| {
                    tracing::warn!(
                        "unsupported encoding '{}', using {}",
                        label,
                        default_encoding().name()
                    );
                    default_encoding()
                }),
            None => default_encoding(),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.vctools/config.toml)
/// 2. Global config (~/.vctools/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global vctools config directory (~/.vctools).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".vctools"))
}

/// Get the global config path (~/.vctools/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.vctools/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".vctools").join("config.toml")
}
