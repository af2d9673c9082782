//! Rotating JSON-array files, one directory per group.
//!
//! Each group gets a long-lived writer task with its own bounded queue. The
//! first event for a new group creates `<directory>/<group>/` and the writer
//! under a creation lock. Later lookups only read the published handle.

mod file;
mod group;

pub use file::{ActiveFile, FilePaths, FileState};

use crate::errors::SinkError;
use crate::lifecycle::{task_signal, TaskDone};
use crate::sink::Sink;
use crate::DEFAULT_QUEUE_CAPACITY;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use group::GroupWriter;
use parking_lot::Mutex;
use sg_03_events::Event;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rotation and queueing limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSettings {
    /// Rotate once a file holds at least this many bytes
    pub max_size: u64,
    /// Rotate once a file is this old
    pub max_age: Duration,
    /// Events buffered per group before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            max_size: 250_000_000,
            max_age: Duration::from_secs(60 * 60),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

struct GroupHandle {
    sender: mpsc::Sender<Vec<u8>>,
}

/// Writes events to per-group rotating files under one directory.
pub struct FilesystemSink {
    directory: PathBuf,
    settings: FileSettings,
    groups: DashMap<Uuid, GroupHandle>,
    creation: Mutex<()>,
    writers: Mutex<Vec<TaskDone>>,
    closed: AtomicBool,
}

impl FilesystemSink {
    /// Create the sink, creating `directory` if needed.
    pub fn new(directory: impl Into<PathBuf>, settings: FileSettings) -> Result<Self, SinkError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|e| SinkError::io(&directory, &e))?;

        info!(
            directory = %directory.display(),
            max_size = settings.max_size,
            max_age_secs = settings.max_age.as_secs(),
            "Filesystem output ready"
        );

        Ok(Self {
            directory,
            settings,
            groups: DashMap::new(),
            creation: Mutex::new(()),
            writers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// Root output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Directory holding the files of `group`.
    pub fn group_directory(&self, group: Uuid) -> PathBuf {
        self.directory.join(group.to_string())
    }

    /// Number of groups with a running writer.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn group_sender(&self, group: Uuid) -> Result<mpsc::Sender<Vec<u8>>, SinkError> {
        if let Some(handle) = self.groups.get(&group) {
            return Ok(handle.sender.clone());
        }
        self.create_group(group)
    }

    fn create_group(&self, group: Uuid) -> Result<mpsc::Sender<Vec<u8>>, SinkError> {
        let _creation = self.creation.lock();

        // Another request may have published it while we waited.
        if let Some(handle) = self.groups.get(&group) {
            return Ok(handle.sender.clone());
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        let directory = self.group_directory(group);
        std::fs::create_dir_all(&directory).map_err(|e| SinkError::io(&directory, &e))?;

        let (sender, receiver) = mpsc::channel(self.settings.queue_capacity.max(1));
        let (guard, done) = task_signal();
        let writer = GroupWriter::new(group, directory, self.settings);
        tokio::spawn(writer.run(receiver, guard));

        self.writers.lock().push(done);
        self.groups.insert(
            group,
            GroupHandle {
                sender: sender.clone(),
            },
        );

        debug!(group = %group, "Started group writer");
        Ok(sender)
    }
}

#[async_trait]
impl Sink for FilesystemSink {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn consume(&self, events: &[Event]) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        let mut dropped = 0;
        let mut reason: Option<String> = None;
        let mut current: Option<(Uuid, mpsc::Sender<Vec<u8>>)> = None;

        for event in events {
            let bytes = match serde_json::to_vec(event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize event. Discarding event");
                    dropped += 1;
                    reason.get_or_insert_with(|| e.to_string());
                    continue;
                }
            };

            let group = event.group();
            let sender = match &current {
                Some((cached, sender)) if *cached == group => sender.clone(),
                _ => match self.group_sender(group) {
                    Ok(sender) => {
                        current = Some((group, sender.clone()));
                        sender
                    }
                    Err(e) => {
                        warn!(group = %group, error = %e, "No writer for group. Discarding event");
                        dropped += 1;
                        reason.get_or_insert_with(|| e.to_string());
                        continue;
                    }
                },
            };

            if sender.try_send(bytes).is_err() {
                dropped += 1;
                reason.get_or_insert_with(|| format!("event queue for group {} full", group));
            }
        }

        if dropped > 0 {
            warn!(dropped, total = events.len(), "Discarded events for filesystem output");
            return Err(SinkError::Discarded {
                dropped,
                total: events.len(),
                reason: reason.unwrap_or_default(),
            });
        }

        Ok(())
    }

    fn close(&self) {
        let _creation = self.creation.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Dropping the senders closes every group queue.
        let groups = self.groups.len();
        self.groups.clear();
        info!(groups, "Filesystem output closed");
    }

    async fn closed(&self) {
        let writers: Vec<TaskDone> = self.writers.lock().clone();
        join_all(writers.iter().map(TaskDone::wait)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_03_events::{EventType, SensorEvent};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn event(group: Uuid, time: i64) -> Event {
        Event::Unknown(SensorEvent::new(EventType::Unknown, time, Uuid::nil(), group))
    }

    fn settings(max_size: u64, max_age: Duration) -> FileSettings {
        FileSettings {
            max_size,
            max_age,
            queue_capacity: 1000,
        }
    }

    fn list(dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut visible = Vec::new();
        let mut hidden = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if is_hidden {
                    hidden.push(path);
                } else {
                    visible.push(path);
                }
            }
        }
        visible.sort();
        (visible, hidden)
    }

    fn read_all(files: &[PathBuf]) -> Vec<serde_json::Value> {
        files
            .iter()
            .flat_map(|path| {
                let text = std::fs::read_to_string(path).unwrap();
                serde_json::from_str::<Vec<serde_json::Value>>(&text).unwrap()
            })
            .collect()
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    // =========================================================================
    // WRITE AND CLOSE
    // =========================================================================

    #[tokio::test]
    async fn test_close_publishes_valid_arrays() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1 << 20, Duration::from_secs(3600))).unwrap();
        let group = Uuid::new_v4();

        let events: Vec<_> = (0..50).map(|t| event(group, t)).collect();
        assert_ok!(sink.consume(&events[..20]));
        assert_ok!(sink.consume(&events[20..]));

        sink.close();
        sink.closed().await;

        let (visible, hidden) = list(&sink.group_directory(group));
        assert!(hidden.is_empty());
        let written = read_all(&visible);
        assert_eq!(written.len(), 50);

        let times: Vec<_> = written.iter().map(|v| v["time"].as_i64().unwrap()).collect();
        assert_eq!(times, (0..50).collect::<Vec<_>>());
        assert!(written.iter().all(|v| v["group"] == group.to_string()));
    }

    #[tokio::test]
    async fn test_groups_partitioned_by_directory() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1 << 20, Duration::from_secs(3600))).unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_ok!(sink.consume(&[event(a, 1), event(b, 2), event(a, 3)]));
        assert_eq!(sink.group_count(), 2);

        sink.close();
        sink.closed().await;

        assert_eq!(read_all(&list(&sink.group_directory(a)).0).len(), 2);
        assert_eq!(read_all(&list(&sink.group_directory(b)).0).len(), 1);
    }

    #[tokio::test]
    async fn test_writing_file_is_hidden_until_finalized() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1 << 20, Duration::from_secs(3600))).unwrap();
        let group = Uuid::new_v4();

        assert_ok!(sink.consume(&[event(group, 1)]));
        let group_dir = sink.group_directory(group);
        assert!(wait_for(|| list(&group_dir).1.len() == 1).await);
        assert!(list(&group_dir).0.is_empty());

        sink.close();
        sink.closed().await;
        let (visible, hidden) = list(&group_dir);
        assert_eq!(visible.len(), 1);
        assert!(hidden.is_empty());
    }

    // =========================================================================
    // ROTATION
    // =========================================================================

    #[tokio::test]
    async fn test_size_rotation_publishes_previous_file() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(64, Duration::from_secs(3600))).unwrap();
        let group = Uuid::new_v4();
        let group_dir = sink.group_directory(group);

        // One serialized event is well over 64 bytes.
        assert_ok!(sink.consume(&[event(group, 1)]));
        assert!(wait_for(|| list(&group_dir).1.len() == 1).await);

        assert_ok!(sink.consume(&[event(group, 2)]));
        assert!(wait_for(|| list(&group_dir).0.len() == 1).await);

        sink.close();
        sink.closed().await;

        let (visible, hidden) = list(&group_dir);
        assert!(hidden.is_empty());
        assert_eq!(visible.len(), 2);
        assert_eq!(read_all(&visible).len(), 2);
    }

    #[tokio::test]
    async fn test_burst_respects_size_limit() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1000, Duration::from_secs(3600))).unwrap();
        let group = Uuid::new_v4();

        let events: Vec<_> = (0..500).map(|t| event(group, t)).collect();
        let largest = events
            .iter()
            .map(|e| serde_json::to_vec(e).unwrap().len() as u64)
            .max()
            .unwrap();

        // One batch, no pauses for the file tasks to catch up.
        assert_ok!(sink.consume(&events));
        sink.close();
        sink.closed().await;

        let (visible, hidden) = list(&sink.group_directory(group));
        assert!(hidden.is_empty());
        assert!(visible.len() > 1);
        for path in &visible {
            let size = std::fs::metadata(path).unwrap().len();
            // Last event may cross the threshold, plus its separator and "\n]".
            assert!(size <= 1000 + largest + 4, "{} is {} bytes", path.display(), size);
        }

        // Name order is write order, even within one microsecond.
        let times: Vec<_> = read_all(&visible)
            .iter()
            .map(|v| v["time"].as_i64().unwrap())
            .collect();
        assert_eq!(times, (0..500).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_age_rotation() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1 << 20, Duration::from_millis(100))).unwrap();
        let group = Uuid::new_v4();
        let group_dir = sink.group_directory(group);

        assert_ok!(sink.consume(&[event(group, 1)]));
        assert!(wait_for(|| list(&group_dir).0.len() == 1).await);

        sink.close();
        sink.closed().await;

        let (visible, hidden) = list(&group_dir);
        assert!(hidden.is_empty());
        assert_eq!(read_all(&visible).len(), 1);
    }

    #[tokio::test]
    async fn test_idle_group_does_not_rotate() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), settings(1 << 20, Duration::from_millis(30))).unwrap();
        let group = Uuid::new_v4();
        let group_dir = sink.group_directory(group);

        assert_ok!(sink.consume(&[event(group, 1)]));
        assert!(wait_for(|| list(&group_dir).0.len() == 1).await);

        // Several age periods with no events.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let (visible, hidden) = list(&group_dir);
        assert_eq!(visible.len(), 1);
        assert_eq!(hidden.len(), 1);

        sink.close();
        sink.closed().await;
    }

    // =========================================================================
    // BACKPRESSURE AND LIFECYCLE
    // =========================================================================

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_and_reports() {
        let dir = TempDir::new().unwrap();
        let mut config = settings(1 << 20, Duration::from_secs(3600));
        config.queue_capacity = 3;
        let sink = FilesystemSink::new(dir.path(), config).unwrap();
        let group = Uuid::new_v4();

        // The writer task cannot run before this test yields.
        let events: Vec<_> = (0..5).map(|t| event(group, t)).collect();
        match sink.consume(&events) {
            Err(SinkError::Discarded { dropped, total, .. }) => {
                assert_eq!(dropped, 2);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected result {:?}", other),
        }

        sink.close();
        sink.closed().await;
        assert_eq!(read_all(&list(&sink.group_directory(group)).0).len(), 3);
    }

    #[tokio::test]
    async fn test_close_idempotent_and_consume_rejected() {
        let dir = TempDir::new().unwrap();
        let sink = FilesystemSink::new(dir.path(), FileSettings::default()).unwrap();
        let group = Uuid::new_v4();

        assert_ok!(sink.consume(&[event(group, 1)]));
        sink.close();
        sink.close();
        assert_eq!(sink.consume(&[event(group, 2)]), Err(SinkError::Closed));

        sink.closed().await;
        sink.closed().await;
        assert_eq!(read_all(&list(&sink.group_directory(group)).0).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_events_create_one_writer() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(FilesystemSink::new(dir.path(), FileSettings::default()).unwrap());
        let group = Uuid::new_v4();

        let tasks: Vec<_> = (0..16)
            .map(|t| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.consume(&[event(group, t)]) })
            })
            .collect();
        for task in tasks {
            assert_ok!(task.await.unwrap());
        }

        assert_eq!(sink.group_count(), 1);
        assert_eq!(sink.writers.lock().len(), 1);

        sink.close();
        sink.closed().await;

        let (visible, _) = list(&sink.group_directory(group));
        assert_eq!(visible.len(), 1);
        assert_eq!(read_all(&visible).len(), 16);
    }
}
