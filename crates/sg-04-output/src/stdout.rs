//! Line-delimited JSON on standard output.

use crate::errors::SinkError;
use crate::lifecycle::{task_signal, TaskDone, TaskGuard};
use crate::sink::Sink;
use crate::DEFAULT_QUEUE_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use sg_03_events::Event;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Prints one serialized event per line from a background task.
///
/// Closing drains the queue before the task exits.
pub struct StdoutSink {
    sender: Mutex<Option<mpsc::Sender<String>>>,
    done: TaskDone,
}

impl StdoutSink {
    /// Sink writing to the process standard output.
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout(), DEFAULT_QUEUE_CAPACITY)
    }

    /// Sink writing lines to `writer` through a queue of `capacity` lines.
    pub fn with_writer<W>(writer: W, capacity: usize) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (guard, done) = task_signal();
        tokio::spawn(print_lines(writer, receiver, guard));

        Self {
            sender: Mutex::new(Some(sender)),
            done,
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn consume(&self, events: &[Event]) -> Result<(), SinkError> {
        let sender = self.sender.lock().clone().ok_or(SinkError::Closed)?;

        let mut dropped = 0;
        let mut reason = None;
        for event in events {
            let line = match serde_json::to_string(event) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize event. Discarding event");
                    dropped += 1;
                    reason.get_or_insert_with(|| e.to_string());
                    continue;
                }
            };

            if sender.try_send(line).is_err() {
                dropped += 1;
                reason.get_or_insert_with(|| "stdout queue full".to_owned());
            }
        }

        if dropped > 0 {
            warn!(dropped, "Discarded events for stdout output");
            return Err(SinkError::Discarded {
                dropped,
                total: events.len(),
                reason: reason.unwrap_or_default(),
            });
        }

        Ok(())
    }

    fn close(&self) {
        if self.sender.lock().take().is_some() {
            debug!("Stdout output closed");
        }
    }

    async fn closed(&self) {
        self.done.wait().await;
    }
}

async fn print_lines<W>(mut writer: W, mut receiver: mpsc::Receiver<String>, _guard: TaskGuard)
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = receiver.recv().await {
        line.push('\n');
        let written = match writer.write_all(line.as_bytes()).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(error = %e, "Error printing event to stdout");
        }
    }
}
