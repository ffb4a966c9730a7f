//! Agenda Storage
//! Per-user schedule entries. Pure storage with ownership filtering.

use crate::db::Db;
use anyhow::Result;
use rusqlite::params;
use serde::Serialize;
use std::fmt;

/// Personal schedule entry. The owning user id is an access-control detail
/// and is not part of the serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaEntry {
    pub id: i64,
    pub title: String,
    pub date: String,
}

#[derive(Debug)]
pub enum AgendaStoreError {
    Storage(anyhow::Error),
}

impl fmt::Display for AgendaStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgendaStoreError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for AgendaStoreError {}

impl From<rusqlite::Error> for AgendaStoreError {
    fn from(e: rusqlite::Error) -> Self {
        AgendaStoreError::Storage(e.into())
    }
}

/// Agenda storage with SQLite backend
#[derive(Clone)]
pub struct AgendaStore {
    db: Db,
}

impl AgendaStore {
    pub fn new(db: Db) -> Result<Self> {
        let store = Self { db };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agenda (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;
        Ok(())
    }

    /// List entries owned by `user_id`, ordered by date ascending.
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<AgendaEntry>, AgendaStoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, date FROM agenda WHERE user_id = ?1 ORDER BY date",
        )?;

        let entries = stmt
            .query_map(params![user_id], |row| {
                Ok(AgendaEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    date: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Create an entry owned by `user_id`.
    pub fn create(
        &self,
        user_id: i64,
        title: &str,
        date: &str,
    ) -> Result<AgendaEntry, AgendaStoreError> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO agenda (user_id, title, date) VALUES (?1, ?2, ?3)",
            params![user_id, title, date],
        )?;

        Ok(AgendaEntry {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            date: date.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use crate::auth::UserStore;
    use crate::db;

    fn create_test_store() -> (AgendaStore, UserStore) {
        let db = db::open_in_memory();
        let users = UserStore::new(db.clone()).unwrap();
        let agenda = AgendaStore::new(db).unwrap();
        (agenda, users)
    }

    #[test]
    fn test_entries_are_owner_filtered() {
        let (agenda, users) = create_test_store();
        let a = users.create_user("a", "pass", UserRole::Standard).unwrap();
        let b = users.create_user("b", "pass", UserRole::Standard).unwrap();

        agenda.create(a.id, "Shift", "2026-09-01").unwrap();
        agenda.create(b.id, "Meeting", "2026-09-02").unwrap();

        let for_a = agenda.list_for_user(a.id).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].title, "Shift");

        let for_b = agenda.list_for_user(b.id).unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].title, "Meeting");
    }

    #[test]
    fn test_entries_ordered_by_date() {
        let (agenda, users) = create_test_store();
        let user = users.create_user("a", "pass", UserRole::Standard).unwrap();

        agenda.create(user.id, "Later", "2026-09-05").unwrap();
        agenda.create(user.id, "Sooner", "2026-09-01").unwrap();

        let entries = agenda.list_for_user(user.id).unwrap();
        assert_eq!(entries[0].title, "Sooner");
        assert_eq!(entries[1].title, "Later");
    }
}
