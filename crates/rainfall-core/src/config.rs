use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RAINFALL_CONFIG";

pub const DEFAULT_MODEL_FILE: &str = "rainfall.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
pub const DEFAULT_ENCODERS_FILE: &str = "encoder.json";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub artifacts: ArtifactConfig,

    #[serde(default)]
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` for address resolution; bare IPv6 hosts are bracketed
    pub fn bind_address(&self) -> String {
        let host = self.host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// Where the trained artifacts live.
///
/// Each `*_path` is the primary location. When a file is missing there, the
/// loader searches `base_dir`, `base_dir/models` and `base_dir/data` for the
/// same file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub model_path: Option<PathBuf>,

    #[serde(default)]
    pub scaler_path: Option<PathBuf>,

    #[serde(default)]
    pub encoders_path: Option<PathBuf>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            model_path: None,
            scaler_path: None,
            encoders_path: None,
        }
    }
}

impl ArtifactConfig {
    /// Config rooted at `base_dir` with every artifact at its default name
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(self.model_path.as_deref(), DEFAULT_MODEL_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.resolve(self.scaler_path.as_deref(), DEFAULT_SCALER_FILE)
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.resolve(self.encoders_path.as_deref(), DEFAULT_ENCODERS_FILE)
    }

    fn resolve(&self, configured: Option<&Path>, default_name: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.base_dir.join(path),
            None => self.base_dir.join(default_name),
        }
    }
}

/// Static HTML pages. Built-in pages are used when `template_dir` is unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesConfig {
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// Resolution order: `explicit`, then `$RAINFALL_CONFIG`, then the user
    /// config directory. An explicitly named file must exist; the default
    /// location is created with defaults on first run.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        if let Some(path) = named {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Self::load_from(&path);
        }

        let Some(path) = Self::default_path() else {
            tracing::debug!("No user config directory; using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(&path) {
                tracing::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            return Ok(config);
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let config = Self::from_toml_str(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate, logging warnings; errors fail.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(())
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.host.trim().is_empty() {
            result.add_error("server.host", "Host must not be empty");
        }

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if !self.artifacts.base_dir.is_dir() {
            result.add_warning(
                "artifacts.base_dir",
                format!("Not a directory: {}", self.artifacts.base_dir.display()),
            );
        }

        let artifact_paths = [
            ("artifacts.model_path", self.artifacts.model_path()),
            ("artifacts.scaler_path", self.artifacts.scaler_path()),
            ("artifacts.encoders_path", self.artifacts.encoders_path()),
        ];
        for (field, path) in artifact_paths {
            if !path.exists() {
                result.add_warning(
                    field,
                    format!(
                        "{} does not exist; fallback locations will be searched",
                        path.display()
                    ),
                );
            }
        }

        if let Some(dir) = &self.pages.template_dir {
            if !dir.is_dir() {
                result.add_warning(
                    "pages.template_dir",
                    format!("Not a directory: {}; built-in pages will be used", dir.display()),
                );
            }
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Read(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Path to the per-user configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rainfall").join("config.toml"))
    }
}
