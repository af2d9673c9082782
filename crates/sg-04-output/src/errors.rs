//! Output error types.

use thiserror::Error;

/// Delivery failure local to one sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// `consume` called after `close`
    #[error("Output is closed")]
    Closed,

    /// Some events of the batch were not queued
    #[error("Discarded {dropped} of {total} events: {reason}")]
    Discarded {
        /// Events not queued
        dropped: usize,
        /// Events in the batch
        total: usize,
        /// First failure seen
        reason: String,
    },

    /// Filesystem failure
    #[error("I/O error at {path}: {reason}")]
    Io {
        /// Path involved
        path: String,
        /// OS error message
        reason: String,
    },
}

impl SinkError {
    pub(crate) fn io(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Aggregate of the sinks that failed for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {} outputs failed: {}", .failures.len(), .total, summarize(.failures))]
pub struct OutputError {
    /// Sink name and its failure
    pub failures: Vec<(String, SinkError)>,
    /// Number of sinks the batch was sent to
    pub total: usize,
}

fn summarize(failures: &[(String, SinkError)]) -> String {
    failures
        .iter()
        .map(|(name, error)| format!("{}: {}", name, error))
        .collect::<Vec<_>>()
        .join("; ")
}
