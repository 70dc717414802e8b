use rusqlite::Connection;
use std::path::Path;
use tokio::task;
use crate::error::{Result, BenchError};

/// Database connection wrapper
pub struct Db {
    path: std::path::PathBuf,
}

/// WAL for crash safety, FULL sync so a committed cache entry survives a crash
/// right after the call returns.
const PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
                       PRAGMA synchronous = FULL; \
                       PRAGMA temp_store = MEMORY;";

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new database connection with the cache pragmas
    fn open_connection(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)
            .map_err(BenchError::Database)?;
        conn.execute_batch(PRAGMAS)?;
        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Self::open_connection(&path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| BenchError::Io(std::io::Error::other(e)))?
    }
}

pub mod migrate;
