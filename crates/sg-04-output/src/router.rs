//! Fan-out over the configured sinks.

use crate::errors::OutputError;
use crate::sink::Sink;
use futures::future::join_all;
use sg_03_events::Event;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sends every batch to every sink.
#[derive(Clone, Default)]
pub struct OutputRouter {
    sinks: Vec<Arc<dyn Sink>>,
}

impl OutputRouter {
    /// Router over `sinks`, dispatched in order.
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Number of sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True if no sinks are configured.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver `events` to every sink.
    ///
    /// A failing sink does not stop delivery to the others. Fails only if at
    /// least one sink failed. An empty batch is a no-op.
    pub fn consume(&self, events: &[Event]) -> Result<(), OutputError> {
        if events.is_empty() {
            return Ok(());
        }

        let failures: Vec<_> = self
            .sinks
            .iter()
            .filter_map(|sink| match sink.consume(events) {
                Ok(()) => None,
                Err(e) => {
                    warn!(output = sink.name(), error = %e, "Output failed to accept events");
                    Some((sink.name().to_owned(), e))
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(OutputError {
                failures,
                total: self.sinks.len(),
            })
        }
    }

    /// Close every sink.
    pub fn close(&self) {
        for sink in &self.sinks {
            debug!(output = sink.name(), "Closing output");
            sink.close();
        }
    }

    /// Close every sink and wait up to `grace` for them to drain.
    ///
    /// Returns false if the grace period elapsed first.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.close();

        let drained = join_all(self.sinks.iter().map(|sink| sink.closed()));
        match tokio::time::timeout(grace, drained).await {
            Ok(_) => {
                info!("All outputs drained");
                true
            }
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "Outputs still draining after grace period");
                false
            }
        }
    }
}
