//! SQLite-backed [`crate::RecordStore`].
//!
//! All statements run on one dedicated thread that owns the connection.
//! Async callers hand it closures through a channel and await the reply.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use async_trait::async_trait;
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod classes;
mod ideas;
mod migrations;
mod reference;

use migrations::run_migrations;

use crate::{
    error::StoreError,
    filter::ClassFilter,
    model::{ClassId, ClassRecord, ClassType, GeneratedIdea, IdeaKind, Location, NewClass, Theme},
    store::RecordStore,
};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the journal database. Clones share one connection; the
/// connection closes when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<Option<PathBuf>>,
}

impl Database {
    /// Open (creating if needed) the database file and bring its schema up to date.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                StoreError::Connection(format!(
                    "failed to create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let path_for_thread = db_path.clone();
        Self::spawn(move || Connection::open(&path_for_thread), Some(db_path))
    }

    /// A private database that disappears with the handle.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::spawn(Connection::open_in_memory, None)
    }

    fn spawn<F>(open: F, db_path: Option<PathBuf>) -> Result<Self, StoreError>
    where
        F: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("journal-db".into())
            .spawn(move || {
                let mut conn = match open() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(StoreError::Connection(err.to_string())));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                if ready_tx.send(run_migrations(&mut conn)).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .map_err(|err| {
                StoreError::Connection(format!("failed to spawn database worker thread: {err}"))
            })?;

        ready_rx.recv().map_err(|_| {
            StoreError::Connection("database worker exited before signaling readiness".into())
        })??;

        match &db_path {
            Some(path) => info!("Database initialized at {}", path.display()),
            None => info!("In-memory database initialized"),
        }

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run `task` on the database thread.
    pub async fn execute<F, T>(&self, task: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        self.inner.sender.send(command).map_err(|err| {
            StoreError::Connection(format!("failed to send command to DB thread: {err}"))
        })?;

        reply_rx
            .await
            .map_err(|_| StoreError::Connection("database thread terminated unexpectedly".into()))?
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn insert_class(&self, class: &NewClass) -> Result<ClassId, StoreError> {
        let record = class.clone();
        self.execute(move |conn| classes::insert(conn, &record)).await
    }

    async fn update_class(&self, id: ClassId, class: &NewClass) -> Result<(), StoreError> {
        let record = class.clone();
        self.execute(move |conn| classes::update(conn, id, &record)).await
    }

    async fn delete_class(&self, id: ClassId) -> Result<(), StoreError> {
        self.execute(move |conn| classes::delete(conn, id)).await
    }

    async fn get_class(&self, id: ClassId) -> Result<ClassRecord, StoreError> {
        self.execute(move |conn| classes::get(conn, id)).await
    }

    async fn list_classes(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, StoreError> {
        let filter = filter.clone();
        self.execute(move |conn| classes::list(conn, &filter)).await
    }

    async fn locations(&self) -> Result<Vec<Location>, StoreError> {
        self.execute(|conn| reference::locations(conn)).await
    }

    async fn class_types(&self) -> Result<Vec<ClassType>, StoreError> {
        self.execute(|conn| reference::class_types(conn)).await
    }

    async fn themes(&self) -> Result<Vec<Theme>, StoreError> {
        self.execute(|conn| reference::themes(conn)).await
    }

    async fn record_idea(&self, idea: &GeneratedIdea) -> Result<(), StoreError> {
        let idea = idea.clone();
        self.execute(move |conn| ideas::insert(conn, &idea)).await
    }

    async fn recent_ideas(
        &self,
        kind: IdeaKind,
        limit: usize,
    ) -> Result<Vec<GeneratedIdea>, StoreError> {
        self.execute(move |conn| ideas::recent(conn, kind, limit)).await
    }
}
