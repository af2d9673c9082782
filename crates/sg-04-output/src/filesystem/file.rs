//! One output file and the task that writes it.
//!
//! ```text
//!   Open ──close()──► Closing ──writer drained, "]" written, renamed──► Closed
//! ```
//!
//! The file is created as `.<name>` and renamed to `<name>` only after the
//! closing bracket is written, so visible files are always complete JSON
//! arrays.

use crate::errors::SinkError;
use crate::lifecycle::{task_signal, TaskDone, TaskGuard};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

const ARRAY_OPEN: &[u8] = b"[\n";
const ARRAY_CLOSE: &[u8] = b"\n]";
const SEPARATOR: &[u8] = b",\n";

/// Serialized events buffered between the group writer and a file task.
/// Size accounting happens on enqueue, so this only bounds memory.
const FILE_QUEUE_CAPACITY: usize = 256;

/// Life cycle of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileState {
    Open = 0,
    Closing = 1,
    Closed = 2,
}

impl FileState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Open,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// State shared between the owning group writer and the file task.
#[derive(Debug)]
struct FileStatus {
    state: AtomicU8,
    /// A write failed
    failed: AtomicBool,
}

/// Hidden and visible paths of one output file.
#[derive(Debug, Clone)]
pub struct FilePaths {
    pub writing: PathBuf,
    pub complete: PathBuf,
}

impl FilePaths {
    /// Paths for `name` inside `directory`.
    pub fn new(directory: &Path, name: &str) -> Self {
        Self {
            writing: directory.join(format!(".{}", name)),
            complete: directory.join(name),
        }
    }
}

/// Handle to an open output file. Owned by one group writer.
pub struct ActiveFile {
    paths: FilePaths,
    sender: Option<mpsc::Sender<Vec<u8>>>,
    status: Arc<FileStatus>,
    done: TaskDone,
    created_at: Instant,
    events: u64,
    /// Bytes queued so far, counting the opening bracket and separators
    bytes: u64,
    max_size: u64,
}

impl ActiveFile {
    /// Create the hidden file, write the array opening and start its task.
    pub async fn open(paths: FilePaths, max_size: u64) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&paths.writing)
            .await
            .map_err(|e| SinkError::io(&paths.writing, &e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(ARRAY_OPEN)
            .await
            .map_err(|e| SinkError::io(&paths.writing, &e))?;

        let status = Arc::new(FileStatus {
            state: AtomicU8::new(FileState::Open as u8),
            failed: AtomicBool::new(false),
        });
        let (sender, receiver) = mpsc::channel(FILE_QUEUE_CAPACITY);
        let (guard, done) = task_signal();

        tokio::spawn(write_file(
            writer,
            paths.clone(),
            receiver,
            status.clone(),
            guard,
        ));

        debug!(path = %paths.writing.display(), "Opened output file");

        Ok(Self {
            paths,
            sender: Some(sender),
            status,
            done,
            created_at: Instant::now(),
            events: 0,
            bytes: ARRAY_OPEN.len() as u64,
            max_size,
        })
    }

    /// Queue one serialized event, waiting for room in the file queue.
    pub async fn write(&mut self, bytes: Vec<u8>) -> Result<(), SinkError> {
        let sender = self.sender.as_ref().ok_or(SinkError::Closed)?;
        let len = bytes.len() as u64;
        sender.send(bytes).await.map_err(|_| SinkError::Closed)?;
        if self.events > 0 {
            self.bytes += SEPARATOR.len() as u64;
        }
        self.bytes += len;
        self.events += 1;
        Ok(())
    }

    /// False once the file is full, failed or closing.
    pub fn accepts_writes(&self) -> bool {
        self.state() == FileState::Open
            && self.bytes < self.max_size
            && !self.status.failed.load(Ordering::Acquire)
    }

    /// Begin finalizing. Only the first call has any effect.
    pub fn close(&mut self) -> bool {
        let won = self
            .status
            .state
            .compare_exchange(
                FileState::Open as u8,
                FileState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if won {
            // Dropping the sender lets the task drain and finalize.
            self.sender.take();
        }
        won
    }

    pub fn state(&self) -> FileState {
        FileState::from_u8(self.status.state.load(Ordering::Acquire))
    }

    /// Events queued to this file so far.
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Bytes queued to this file so far, excluding the closing bracket.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn paths(&self) -> &FilePaths {
        &self.paths
    }

    /// Completion signal of the file task.
    pub(crate) fn done(&self) -> TaskDone {
        self.done.clone()
    }
}

impl Drop for ActiveFile {
    fn drop(&mut self) {
        self.close();
    }
}

async fn write_file(
    mut writer: BufWriter<File>,
    paths: FilePaths,
    mut receiver: mpsc::Receiver<Vec<u8>>,
    status: Arc<FileStatus>,
    _guard: TaskGuard,
) {
    let mut first = true;
    let mut discarded = 0u64;

    while let Some(bytes) = receiver.recv().await {
        if status.failed.load(Ordering::Acquire) {
            discarded += 1;
            continue;
        }

        match append(&mut writer, first, &bytes).await {
            Ok(()) => first = false,
            Err(e) => {
                warn!(path = %paths.writing.display(), error = %e, "Error writing output file");
                status.failed.store(true, Ordering::Release);
                discarded += 1;
            }
        }
    }

    if discarded > 0 {
        warn!(path = %paths.writing.display(), discarded, "Discarded events after write failure");
    }

    finalize(writer, &paths).await;
    status.state.store(FileState::Closed as u8, Ordering::Release);
}

async fn append(writer: &mut BufWriter<File>, first: bool, bytes: &[u8]) -> std::io::Result<()> {
    if !first {
        writer.write_all(SEPARATOR).await?;
    }
    writer.write_all(bytes).await
}

async fn finalize(mut writer: BufWriter<File>, paths: &FilePaths) {
    if let Err(e) = writer.write_all(ARRAY_CLOSE).await {
        warn!(path = %paths.writing.display(), error = %e, "Failed to write JSON array closure");
    }
    if let Err(e) = writer.flush().await {
        warn!(path = %paths.writing.display(), error = %e, "Failed to flush output file");
    }
    drop(writer);

    match tokio::fs::rename(&paths.writing, &paths.complete).await {
        Ok(()) => debug!(path = %paths.complete.display(), "Published output file"),
        Err(e) => warn!(
            from = %paths.writing.display(),
            to = %paths.complete.display(),
            error = %e,
            "Failed to publish output file"
        ),
    }
}
