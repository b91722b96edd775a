//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via LINEWIRE_CONFIG)
//! 3. Environment variables

use linewire_protocol::{CRLF, DEFAULT_MAX_LINE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Client runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long a request waits for its response, in milliseconds.
    pub request_timeout_ms: u64,
    /// How long a flush waits for outstanding writes, in milliseconds.
    pub flush_timeout_ms: u64,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
    /// Longest accepted control line, terminator included.
    pub max_line_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
            flush_timeout_ms: 10_000,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_line_size: DEFAULT_MAX_LINE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LINEWIRE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let mut config: ClientConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config.read_buffer_size = clamp_read_buffer(config.read_buffer_size);
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(ms) = std::env::var("LINEWIRE_REQUEST_TIMEOUT_MS") {
            if let Ok(n) = ms.parse() {
                self.request_timeout_ms = n;
            }
        }

        if let Ok(ms) = std::env::var("LINEWIRE_FLUSH_TIMEOUT_MS") {
            if let Ok(n) = ms.parse() {
                self.flush_timeout_ms = n;
            }
        }

        if let Ok(size) = std::env::var("LINEWIRE_READ_BUFFER_SIZE") {
            if let Ok(n) = size.parse() {
                self.read_buffer_size = clamp_read_buffer(n);
            }
        }

        if let Ok(size) = std::env::var("LINEWIRE_MAX_LINE_SIZE") {
            if let Ok(n) = size.parse() {
                self.max_line_size = n;
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.flush_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "flush_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_line_size <= CRLF.len() {
            return Err(ConfigError::ValidationError(format!(
                "max_line_size must exceed the {}-byte terminator",
                CRLF.len()
            )));
        }
        Ok(())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = clamp_read_buffer(size);
        self
    }

    pub fn with_max_line_size(mut self, size: usize) -> Self {
        self.max_line_size = size;
        self
    }

    /// Returns the request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the flush timeout as Duration.
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

fn clamp_read_buffer(size: usize) -> usize {
    size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE)
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
