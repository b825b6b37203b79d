//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error; an unreadable or malformed one is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

pub const ENV_CONFIG: &str = "CLINAI_CONFIG";
pub const ENV_MODEL_PATH: &str = "CLINAI_MODEL_PATH";
pub const ENV_SCHEMA_PATH: &str = "CLINAI_SCHEMA_PATH";
pub const ENV_HOST: &str = "CLINAI_HOST";
pub const ENV_PORT: &str = "CLINAI_PORT";

pub const DEFAULT_MODEL_FILE: &str = "readmission_model.json";
pub const DEFAULT_SCHEMA_FILE: &str = "feature_columns.json";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `[server]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub model_path: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
    }
}

/// Platform fallbacks used when nothing else sets a value
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub data_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            data_folder: default_data_folder(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_folder.join(DEFAULT_MODEL_FILE)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.data_folder.join(DEFAULT_SCHEMA_FILE)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_path: PathBuf,
    pub schema_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from CLI overrides, environment, TOML and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let config_file = match cli.config.clone().or_else(|| env_path(ENV_CONFIG)) {
            // An explicitly named file must exist
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => find_config_file(),
        };

        let toml_config = match &config_file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                TomlConfig::load(path)?
            }
            None => {
                debug!("No config file found, using defaults");
                TomlConfig::default()
            }
        };

        let port = match cli.port {
            Some(port) => port,
            None => env_port()?
                .or(toml_config.server.port)
                .unwrap_or(defaults.port),
        };

        Ok(Self {
            model_path: cli
                .model_path
                .clone()
                .or_else(|| env_path(ENV_MODEL_PATH))
                .or(toml_config.model_path)
                .unwrap_or_else(|| defaults.model_path()),
            schema_path: cli
                .schema_path
                .clone()
                .or_else(|| env_path(ENV_SCHEMA_PATH))
                .or(toml_config.schema_path)
                .unwrap_or_else(|| defaults.schema_path()),
            host: cli
                .host
                .clone()
                .or_else(|| env_string(ENV_HOST))
                .or(toml_config.server.host)
                .unwrap_or(defaults.host),
            port,
            log_level: toml_config.logging.level.unwrap_or(defaults.log_level),
            config_file,
        })
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

fn env_port() -> Result<Option<u16>> {
    match env_string(ENV_PORT) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw))),
        None => Ok(None),
    }
}

/// Default configuration file location for the platform, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("clinai").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/clinai/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent folder holding the model and schema artifacts
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/clinai (or /var/lib/clinai for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("clinai"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/clinai"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/clinai
        dirs::data_dir()
            .map(|d| d.join("clinai"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/clinai"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\clinai
        dirs::data_local_dir()
            .map(|d| d.join("clinai"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\clinai"))
    } else {
        PathBuf::from("./clinai_data")
    }
}
