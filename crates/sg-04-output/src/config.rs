//! Output configuration and router construction.

use crate::errors::SinkError;
use crate::filesystem::{FileSettings, FilesystemSink};
use crate::router::OutputRouter;
use crate::sink::Sink;
use crate::stdout::StdoutSink;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One configured destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    /// One JSON event per line on standard output
    Stdout,
    /// Rotating JSON-array files under `directory`
    Filesystem {
        directory: PathBuf,
        #[serde(with = "humantime_serde", default = "default_age")]
        age: Duration,
        #[serde(default = "default_size")]
        size: u64,
    },
}

fn default_age() -> Duration {
    FileSettings::default().max_age
}

fn default_size() -> u64 {
    FileSettings::default().max_size
}

/// Build a router with one sink per entry, in order.
///
/// Must run inside a tokio runtime: sinks spawn their background tasks here.
pub fn build_router(outputs: &[OutputConfig]) -> Result<OutputRouter, SinkError> {
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(outputs.len());

    for output in outputs {
        match output {
            OutputConfig::Stdout => {
                info!("Adding stdout output");
                sinks.push(Arc::new(StdoutSink::new()));
            }
            OutputConfig::Filesystem {
                directory,
                age,
                size,
            } => {
                let settings = FileSettings {
                    max_size: *size,
                    max_age: *age,
                    ..FileSettings::default()
                };
                sinks.push(Arc::new(FilesystemSink::new(directory.clone(), settings)?));
            }
        }
    }

    Ok(OutputRouter::new(sinks))
}

/// Durations as strings with a unit suffix (`ms`, `s`, `m`, `h`, `d`) or a
/// bare number of seconds.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Parse `"250ms"`, `"30s"`, `"5m"`, `"1h"`, `"28d"` or `"60"`.
    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" must be tried before "m" and "s".
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            scaled(mins, 60).ok_or("invalid minutes")
        } else if let Some(hours) = s.strip_suffix('h') {
            scaled(hours, 60 * 60).ok_or("invalid hours")
        } else if let Some(days) = s.strip_suffix('d') {
            scaled(days, 24 * 60 * 60).ok_or("invalid days")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }

    fn scaled(value: &str, unit_secs: u64) -> Option<Duration> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|v| v.checked_mul(unit_secs))
            .map(Duration::from_secs)
    }
}
