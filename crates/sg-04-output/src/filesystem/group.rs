//! Per-group writer task: rotation by size and age.

use super::file::{ActiveFile, FilePaths};
use super::FileSettings;
use crate::errors::SinkError;
use crate::lifecycle::{TaskDone, TaskGuard};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the files of one group. Fed by the group's bounded queue.
pub(crate) struct GroupWriter {
    group: Uuid,
    directory: PathBuf,
    settings: FileSettings,
    active: Option<ActiveFile>,
    finishing: Vec<TaskDone>,
    deadline: Instant,
    sequence: u64,
}

impl GroupWriter {
    pub(crate) fn new(group: Uuid, directory: PathBuf, settings: FileSettings) -> Self {
        Self {
            group,
            directory,
            deadline: Instant::now() + settings.max_age,
            settings,
            active: None,
            finishing: Vec::new(),
            sequence: 0,
        }
    }

    /// Run until the queue is closed and drained, then finalize every file.
    pub(crate) async fn run(mut self, mut receiver: mpsc::Receiver<Vec<u8>>, _guard: TaskGuard) {
        if let Err(e) = self.rotate().await {
            warn!(group = %self.group, error = %e, "Failed to open first output file");
        }

        loop {
            tokio::select! {
                received = receiver.recv() => match received {
                    Some(bytes) => self.write(bytes).await,
                    None => break,
                },
                _ = sleep_until(self.deadline) => self.on_age().await,
            }
        }

        if let Some(mut file) = self.active.take() {
            file.close();
            self.finishing.push(file.done());
        }
        for done in &self.finishing {
            done.wait().await;
        }

        debug!(group = %self.group, "Group writer stopped");
    }

    async fn write(&mut self, bytes: Vec<u8>) {
        let usable = self.active.as_ref().is_some_and(ActiveFile::accepts_writes);
        if !usable {
            if let Err(e) = self.rotate().await {
                info!(group = %self.group, error = %e, "File rotation failed. Discarding event");
                return;
            }
        }

        if let Some(file) = self.active.as_mut() {
            if let Err(e) = file.write(bytes).await {
                info!(group = %self.group, error = %e, "Writing to file failed. Discarding event");
            }
        }
    }

    async fn on_age(&mut self) {
        let idle = self.active.as_ref().is_some_and(|file| file.events() == 0);
        if idle {
            self.deadline = Instant::now() + self.settings.max_age;
            return;
        }

        if let Err(e) = self.rotate().await {
            info!(group = %self.group, error = %e, "File rotation on timer failed");
        }
    }

    /// Open a new file, then finalize the previous one.
    async fn rotate(&mut self) -> Result<(), SinkError> {
        self.deadline = Instant::now() + self.settings.max_age;

        let name = self.next_name();
        let paths = FilePaths::new(&self.directory, &name);
        let next = ActiveFile::open(paths, self.settings.max_size).await?;

        if let Some(mut previous) = self.active.replace(next) {
            previous.close();
            self.finishing.push(previous.done());
        }
        self.finishing.retain(|done| !done.is_done());

        Ok(())
    }

    fn next_name(&mut self) -> String {
        self.sequence += 1;
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or(0);
        // Zero padded so lexical order matches creation order.
        format!("{:020}-{:06}.json", micros, self.sequence)
    }
}
