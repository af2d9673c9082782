//! The sink capability.

use crate::errors::SinkError;
use async_trait::async_trait;
use sg_03_events::Event;

/// A destination for parsed events.
///
/// `consume` must never block on I/O. `close` is idempotent and must only be
/// called once the caller guarantees no further `consume` calls.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs and aggregate errors.
    fn name(&self) -> &str;

    /// Queue a non-empty, ordered batch for delivery.
    fn consume(&self, events: &[Event]) -> Result<(), SinkError>;

    /// Stop accepting events and let background work drain.
    fn close(&self);

    /// Resolves once all background work has finished after `close`.
    async fn closed(&self);
}
