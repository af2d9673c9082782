//! Task completion signalling.
//!
//! A background task owns a [`TaskGuard`]. Dropping it, on normal exit or
//! unwind, releases every [`TaskDone`] waiting on that task.

use tokio::sync::watch;

/// Held by the running task.
pub(crate) struct TaskGuard {
    _sender: watch::Sender<()>,
}

/// Resolves once the matching [`TaskGuard`] is dropped.
#[derive(Clone)]
pub(crate) struct TaskDone {
    receiver: watch::Receiver<()>,
}

pub(crate) fn task_signal() -> (TaskGuard, TaskDone) {
    let (sender, receiver) = watch::channel(());
    (TaskGuard { _sender: sender }, TaskDone { receiver })
}

impl TaskDone {
    /// Wait for the task to finish.
    pub(crate) async fn wait(&self) {
        let mut receiver = self.receiver.clone();
        while receiver.changed().await.is_ok() {}
    }

    /// True once the task has finished.
    pub(crate) fn is_done(&self) -> bool {
        self.receiver.has_changed().is_err()
    }
}
