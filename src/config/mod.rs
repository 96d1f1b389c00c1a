//! Configuration module
//!
//! Handles loading and saving ChessLink configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::protocol::{Side, DEFAULT_PORT};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Network settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Game settings
    #[serde(default)]
    pub game: GameConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Name shown in the console banner
    pub name: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            verbose: false,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Port the host listens on and the guest dials
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection timeout in ms
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Send timeout in ms
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
    /// How long `host` waits for an opponent, in seconds
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,
    /// Per-frame receive wait in ms
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,
    /// Frame loop period in ms
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Upper bound on messages handled in one frame
    #[serde(default = "default_max_messages_per_frame")]
    pub max_messages_per_frame: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_send_timeout() -> u64 {
    5000
}

fn default_listen_timeout() -> u64 {
    30
}

fn default_poll_timeout() -> u64 {
    1
}

fn default_frame_interval() -> u64 {
    16
}

fn default_max_messages_per_frame() -> usize {
    8
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            send_timeout_ms: default_send_timeout(),
            listen_timeout_secs: default_listen_timeout(),
            poll_timeout_ms: default_poll_timeout(),
            frame_interval_ms: default_frame_interval(),
            max_messages_per_frame: default_max_messages_per_frame(),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Colour requested when joining a host
    #[serde(default)]
    pub preferred_side: Side,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chesslink/config.toml")),
            Some(PathBuf::from("./chesslink.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// The example settings shipped as the sample configuration
pub fn sample_config() -> Config {
    Config {
        general: GeneralConfig {
            name: "Study PC".to_string(),
            verbose: false,
        },
        game: GameConfig {
            preferred_side: Side::Black,
        },
        ..Default::default()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    Ok(toml::to_string_pretty(&sample_config())?)
}
