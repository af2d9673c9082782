//! # Gateway Configuration
//!
//! TOML configuration with serde defaults for every section, `SG_`
//! environment overrides and semantic validation.
//!
//! ```toml
//! [sensor.api]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [sensor.token]
//! duration = "28d"
//! [sensor.token.secrets]
//! current = "<base64 64 bytes>"
//!
//! [[sensor.install.verifiers]]
//! group = "..."
//! salt = "..."
//! hash = "..."
//! checksum = "..."
//!
//! [[outputs]]
//! type = "stdout"
//! ```

use serde::Deserialize;
use sg_01_install_auth::{is_verifier_valid, Verifier};
use sg_02_token::{SigningSecret, TokenProcessor, DEFAULT_TOKEN_DURATION};
use sg_04_output::config::humantime_serde;
use sg_04_output::OutputConfig;
use sg_05_sensor_api::DEFAULT_MAX_BODY_BYTES;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub sensor: SensorConfig,
    pub outputs: Vec<OutputConfig>,
    pub shutdown: ShutdownConfig,
}

/// Sensor facing settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub api: ApiConfig,
    pub token: TokenConfig,
    pub install: InstallConfig,
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Larger request bodies are rejected with 413
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ApiConfig {
    /// Listen address.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Token lifetime and signing secrets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub secrets: SecretsConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_TOKEN_DURATION,
            secrets: SecretsConfig::default(),
        }
    }
}

/// Current secret signs new tokens. Past secrets only verify.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub current: Option<SigningSecret>,
    pub past: Vec<SigningSecret>,
}

/// Install verifiers, any number per group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub verifiers: Vec<Verifier>,
}

/// Grace periods applied on shutdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time in-flight HTTP requests get to finish
    #[serde(with = "humantime_serde")]
    pub http: Duration,
    /// Time outputs get to drain their queues
    #[serde(with = "humantime_serde")]
    pub outputs: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            http: Duration::from_secs(5),
            outputs: Duration::from_secs(1),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("no current token signing secret configured")]
    MissingSecret,

    #[error("invalid token duration: {0}")]
    InvalidDuration(String),

    #[error("verifier for group {group} has an invalid checksum")]
    InvalidVerifier { group: uuid::Uuid },

    #[error("at least one output must be configured")]
    NoOutputs,

    #[error("invalid output #{index}: {reason}")]
    InvalidOutput { index: usize, reason: String },
}

impl GatewayConfig {
    /// Read, parse, apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `SG_` overrides returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SG_API_HOST") {
            self.sensor.api.host = host.parse().map_err(|e| env_error("SG_API_HOST", e))?;
        }
        if let Some(port) = lookup("SG_API_PORT") {
            self.sensor.api.port = port.parse().map_err(|e| env_error("SG_API_PORT", e))?;
        }
        if let Some(duration) = lookup("SG_TOKEN_DURATION") {
            self.sensor.token.duration = humantime_serde::parse_duration(&duration)
                .map_err(|e| env_error("SG_TOKEN_DURATION", e))?;
        }
        if let Some(secret) = lookup("SG_TOKEN_SECRET_CURRENT") {
            let secret = secret
                .parse()
                .map_err(|e| env_error("SG_TOKEN_SECRET_CURRENT", e))?;
            self.sensor.token.secrets.current = Some(secret);
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Secret lengths are enforced when they are decoded
        if self.sensor.token.secrets.current.is_none() {
            return Err(ConfigError::MissingSecret);
        }

        if self.sensor.token.duration.is_zero() {
            return Err(ConfigError::InvalidDuration("duration cannot be 0".into()));
        }

        if let Some(bad) = self
            .sensor
            .install
            .verifiers
            .iter()
            .find(|verifier| !is_verifier_valid(verifier))
        {
            return Err(ConfigError::InvalidVerifier { group: bad.group });
        }

        if self.outputs.is_empty() {
            return Err(ConfigError::NoOutputs);
        }

        for (index, output) in self.outputs.iter().enumerate() {
            if let OutputConfig::Filesystem {
                directory,
                age,
                size,
            } = output
            {
                let reason = if directory.as_os_str().is_empty() {
                    Some("directory cannot be empty")
                } else if age.is_zero() {
                    Some("age cannot be 0")
                } else if *size == 0 {
                    Some("size cannot be 0")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(ConfigError::InvalidOutput {
                        index,
                        reason: reason.into(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Token processor over the configured secrets.
    pub fn token_processor(&self) -> Result<TokenProcessor, ConfigError> {
        let secrets = &self.sensor.token.secrets;
        let current = secrets.current.clone().ok_or(ConfigError::MissingSecret)?;
        Ok(TokenProcessor::new(
            current,
            secrets.past.clone(),
            self.sensor.token.duration,
        ))
    }
}

fn env_error(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Env {
        var,
        reason: reason.to_string(),
    }
}
