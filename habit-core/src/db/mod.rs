//! SQLite storage handle.
//!
//! [`Database`] is cheap to clone; every clone shares one connection guarded
//! by a mutex, so operations issued through the same handle never interleave.

mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use directories::ProjectDirs;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::Result;

pub use schema::SCHEMA;

const DB_FILE_NAME: &str = "habits.db";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Opens a private in-memory database. Used by tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "habit-hero").ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine a home directory for the database",
            )
        })?;
        Ok(dirs.data_dir().join(DB_FILE_NAME))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Applies the schema. Safe to call on every start.
    pub fn migrate(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })?;
        tracing::info!("Database schema up to date");
        Ok(())
    }

    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&conn)
    }

    /// Runs `f` inside an IMMEDIATE transaction, committing only when it
    /// returns `Ok`. The write lock is taken up front so a read followed by a
    /// write cannot be split by another writer.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-operation drops its transaction, which rolls back, so
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
