use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::oneshot;

use super::KeyValueStore;

/// Layout of `kv_store` this build reads and writes, tracked in `user_version`.
const STORE_LAYOUT_VERSION: i32 = 1;

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct SqliteStoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SqliteStoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// Persistent key-value store on SQLite, owned by a dedicated worker thread.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<SqliteStoreInner>,
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("replay-timeline-store".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite store")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result = prepare_table(&conn);
                if ready_tx.send(init_result).is_err() {
                    error!("Store initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .with_context(|| "failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before signaling readiness")??;

        info!("Store initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(SqliteStoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }
}

/// Creates `kv_store` on a fresh file and refuses files written by a newer layout.
fn prepare_table(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read store layout version")?;
    if version > STORE_LAYOUT_VERSION {
        bail!("store layout {version} is newer than supported layout {STORE_LAYOUT_VERSION}");
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
             key TEXT PRIMARY KEY NOT NULL,
             value TEXT NOT NULL,
             updated_at TEXT NOT NULL
         );",
    )
    .context("failed to create kv_store table")?;

    if version < STORE_LAYOUT_VERSION {
        conn.pragma_update(None, "user_version", STORE_LAYOUT_VERSION)
            .context("failed to record store layout version")?;
    }
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .with_context(|| format!("failed to read key '{key}'"))?;

            raw.map(|text| {
                serde_json::from_str(&text)
                    .with_context(|| format!("stored value for '{key}' is not JSON"))
            })
            .transpose()
        })
        .await
    }

    async fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        let key = key.to_string();
        let encoded = serde_json::to_string(&value)?;
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, encoded, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write key '{key}'"))?;
            Ok(())
        })
        .await
    }
}
