mod loop_worker;
pub mod navigation;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use navigation::{MutationBatch, MutationRecord, NavigationWatcher};

/// Running watcher task; dropping it leaves the task running until the feed closes.
pub struct WatcherHandle {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl WatcherHandle {
    pub(crate) fn new(handle: JoinHandle<()>, cancel_token: CancellationToken) -> Self {
        Self {
            handle,
            cancel_token,
        }
    }

    /// Cancels the watcher and returns once a batch already being handled is done.
    pub async fn stop(self) -> Result<()> {
        self.cancel_token.cancel();
        self.handle
            .await
            .context("navigation watcher task failed to join")
    }
}
