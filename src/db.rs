//! Shared SQLite handle
//!
//! One database file holds users, agenda entries, and missions. The
//! connection is shared behind a `parking_lot::Mutex`; writes serialize on
//! the lock, reads see the latest committed state. WAL mode keeps the file
//! usable if an operator opens a second reader.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

/// Shared connection handle used by every store.
pub type Db = Arc<Mutex<Connection>>;

const PRAGMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
"#;

/// Open (or create) the database file and apply connection pragmas.
pub fn open(db_path: &str) -> Result<Db> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    conn.execute_batch(PRAGMA_SQL)
        .context("Failed to apply database pragmas")?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database for tests.
#[cfg(test)]
pub fn open_in_memory() -> Db {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    Arc::new(Mutex::new(conn))
}
