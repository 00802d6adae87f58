use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{log_info, utils::Debouncer};

use super::navigation::{MutationBatch, NavigationWatcher};

const ENABLE_LOGS: bool = true;

pub(super) async fn watch_loop(
    watcher: NavigationWatcher,
    mut batches: mpsc::Receiver<MutationBatch>,
    cancel_token: CancellationToken,
) {
    watcher.warm_up().await;

    let mut debouncer = Debouncer::new(watcher.debounce_window());
    loop {
        tokio::select! {
            batch = batches.recv() => match batch {
                Some(batch) => {
                    let watcher = watcher.clone();
                    debouncer.call(async move {
                        watcher.handle_batch(&batch).await;
                    });
                }
                None => {
                    log_info!("mutation feed closed, navigation watcher exiting");
                    break;
                }
            },
            _ = cancel_token.cancelled() => {
                log_info!("navigation watcher shutting down");
                break;
            }
        }
    }
    debouncer.finish().await;
}
