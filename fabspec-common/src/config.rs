//! Configuration loading and API key resolution
//!
//! Bootstrap configuration comes from a single TOML file. The file is located
//! with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. `FABSPEC_CONFIG` environment variable
//! 3. `~/.config/fabspec/config.toml` (platform config directory)
//! 4. Built-in defaults (no file)
//!
//! A missing file is never fatal: the tools log a warning and continue with
//! defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FABSPEC_CONFIG";

/// Environment variables checked for the model API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 3] = [
    "FABSPEC_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_GENERATIVE_AI_API_KEY",
];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extractor backend selection and model endpoint
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Active vocabulary settings
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Form session behaviour
    #[serde(default)]
    pub session: SessionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Which draft producer to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    /// Deterministic rule engine (no network)
    #[default]
    Rules,
    /// Remote language model over HTTP
    Model,
}

/// Extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub backend: ExtractorBackend,

    /// Base URL of the generateContent-style API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name appended to the endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (environment variables take precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Caller-side timeout for one extraction request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Vocabulary configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VocabularyConfig {
    /// Fiber code scheme for new records ("legacy" or "iso")
    #[serde(default = "default_fiber_scheme")]
    pub fiber_scheme: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            fiber_scheme: default_fiber_scheme(),
        }
    }
}

/// How a new draft is folded into an edited record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicySetting {
    /// Per-field three-way merge, user edits win
    #[default]
    ThreeWay,
    /// Draft supersedes the whole record
    Replace,
}

/// Form session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default)]
    pub merge_policy: MergePolicySetting,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_fiber_scheme() -> String {
    "legacy".to_string()
}

/// Locates and loads the bootstrap config file
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create resolver with an optional `--config` argument
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Determine which config file to read, if any
    ///
    /// An explicitly named file (CLI or ENV) is returned even when it does not
    /// exist so that `load` can report it; the default location is only
    /// returned when present.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|p| p.exists())
    }

    /// Load configuration, falling back to defaults
    ///
    /// A missing file logs a warning and yields defaults. A file that exists
    /// but does not parse is an error.
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve_path() {
            Some(path) if path.exists() => {
                let config = load_toml_config(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
            None => Ok(TomlConfig::default()),
        }
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fabspec").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write config atomically (temp file + rename)
///
/// On Unix the file is restricted to 0600 because it may hold an API key.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Resolve the model API key
///
/// **Priority:** ENV (in `API_KEY_ENV_VARS` order) → TOML
pub fn resolve_api_key(config: &ExtractorConfig) -> Result<String> {
    let mut sources = Vec::new();
    let mut resolved: Option<String> = None;

    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                sources.push(var);
                if resolved.is_none() {
                    resolved = Some(key);
                }
            }
        }
    }

    if let Some(key) = config.api_key.as_ref().filter(|k| is_valid_key(k)) {
        sources.push("TOML");
        if resolved.is_none() {
            resolved = Some(key.clone());
        }
    }

    if sources.len() > 1 {
        warn!(
            "API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    match resolved {
        Some(key) => {
            info!("Model API key loaded from {}", sources[0]);
            Ok(key)
        }
        None => Err(Error::Config(
            "Model API key not configured. Set one of:\n\
             1. Environment: FABSPEC_API_KEY=your-key-here\n\
             2. Environment: GEMINI_API_KEY / GOOGLE_GENERATIVE_AI_API_KEY\n\
             3. TOML config: [extractor] api_key = \"your-key\""
                .to_string(),
        )),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
