//! Configuration loading and validation
//!
//! Bootstrap configuration comes from three tiers, highest priority first:
//! 1. Command-line arguments (each with a `BREEDID_*` environment fallback)
//! 2. TOML config file (explicit `--config` path, else the platform config dir)
//! 3. Compiled defaults
//!
//! A missing TOML file at the default location is not an error: a warning is
//! logged and the compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Minimum confidence required to accept a prediction
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Label order the bundled model was trained with
pub const DEFAULT_LABELS: [&str; 5] = [
    "french_bulldog",
    "german_shepherd",
    "golden_retriever",
    "poodle",
    "yorkshire_terrier",
];

/// Model input edge length (pixels)
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Number of gallery images / history entries rendered on the page
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

/// Environment variable naming an alternate config file
pub const CONFIG_ENV_VAR: &str = "BREEDID_CONFIG";

/// Top-level bootstrap configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub gallery: GalleryConfig,
    pub history: HistoryConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

/// Classifier model settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    pub path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    /// Inclusive acceptance threshold in [0, 1]
    pub confidence_threshold: f32,
    /// Labels in model output order
    pub labels: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/dog_breed_classifier.onnx"),
            input_width: DEFAULT_INPUT_SIZE,
            input_height: DEFAULT_INPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Gallery directory settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub dir: PathBuf,
    /// File name prefix (`<prefix>_<YYYYMMDD-HHMMSS>.jpg`)
    pub file_prefix: String,
    pub display_limit: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("gallery"),
            file_prefix: "dog".to_string(),
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

/// Per-session history settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub display_limit: usize,
    /// Maximum entries retained per session; oldest dropped first
    pub retention: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            retention: 100,
        }
    }
}

/// Session lifecycle settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
        }
    }
}

/// Upload limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line (or their env fallbacks)
///
/// `None` means "not given"; the TOML/default value stays in effect.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub gallery_dir: Option<PathBuf>,
    pub confidence_threshold: Option<f32>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and compiled defaults are used if nothing is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Read config {} failed: {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            return Self::from_toml_str(&content);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)
            }
            Some(path) => {
                warn!(
                    "No config file at {}, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.model_path {
            self.model.path = path;
        }
        if let Some(dir) = overrides.gallery_dir {
            self.gallery.dir = dir;
        }
        if let Some(threshold) = overrides.confidence_threshold {
            self.model.confidence_threshold = threshold;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.model.confidence_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "model.confidence_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        if self.model.labels.is_empty() {
            return Err(Error::Config("model.labels must not be empty".to_string()));
        }
        for (i, label) in self.model.labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(Error::Config(format!("model.labels[{}] is blank", i)));
            }
            if self.model.labels[..i].contains(label) {
                return Err(Error::Config(format!("duplicate label '{}'", label)));
            }
        }

        if self.model.input_width == 0 || self.model.input_height == 0 {
            return Err(Error::Config(
                "model input dimensions must be non-zero".to_string(),
            ));
        }

        if self.gallery.file_prefix.is_empty()
            || self
                .gallery
                .file_prefix
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '.')
        {
            return Err(Error::Config(format!(
                "gallery.file_prefix '{}' must be a plain non-empty name",
                self.gallery.file_prefix
            )));
        }

        if self.gallery.display_limit == 0 || self.history.display_limit == 0 {
            return Err(Error::Config("display limits must be non-zero".to_string()));
        }

        if self.history.retention < self.history.display_limit {
            return Err(Error::Config(format!(
                "history.retention ({}) must be at least history.display_limit ({})",
                self.history.retention, self.history.display_limit
            )));
        }

        if self.upload.max_bytes == 0 {
            return Err(Error::Config("upload.max_bytes must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Default config file location: `$BREEDID_CONFIG`, else `<config_dir>/breedid/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("breedid").join("config.toml"))
}
