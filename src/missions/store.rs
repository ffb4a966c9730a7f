//! Mission Storage
//! Mission: Persist dispatch missions and their assignment state in SQLite

use crate::db::Db;
use crate::missions::models::{Mission, MissionListItem, MissionStatus};
use anyhow::Result;
use rusqlite::params;
use std::fmt;
use tracing::info;

/// Errors surfaced by the mission store.
#[derive(Debug)]
pub enum MissionStoreError {
    NotFound,
    Storage(anyhow::Error),
}

impl fmt::Display for MissionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStoreError::NotFound => write!(f, "Mission not found"),
            MissionStoreError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for MissionStoreError {}

impl From<rusqlite::Error> for MissionStoreError {
    fn from(e: rusqlite::Error) -> Self {
        MissionStoreError::Storage(e.into())
    }
}

/// Mission storage with SQLite backend.
///
/// Owns both the registry (create/list) and the assignment transition.
#[derive(Clone)]
pub struct MissionStore {
    db: Db,
}

impl MissionStore {
    /// Create a new mission store and initialize the schema.
    pub fn new(db: Db) -> Result<Self> {
        let store = Self { db };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS missions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client TEXT NOT NULL,
                dt TEXT NOT NULL,
                pickup TEXT NOT NULL,
                dropoff TEXT NOT NULL,
                assigned_to INTEGER,
                status TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn row_to_mission(row: &rusqlite::Row<'_>) -> rusqlite::Result<Mission> {
        let status_str: String = row.get(6)?;
        let status = MissionStatus::from_str(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("unknown mission status: {}", status_str).into(),
            )
        })?;
        Ok(Mission {
            id: row.get(0)?,
            client: row.get(1)?,
            dt: row.get(2)?,
            pickup: row.get(3)?,
            dropoff: row.get(4)?,
            assigned_to: row.get(5)?,
            status,
        })
    }

    /// Persist a new mission. Always starts as `new` with no assignee.
    pub fn create(
        &self,
        client: &str,
        dt: &str,
        pickup: &str,
        dropoff: &str,
    ) -> Result<Mission, MissionStoreError> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO missions (client, dt, pickup, dropoff, assigned_to, status)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![client, dt, pickup, dropoff, MissionStatus::New.as_str()],
        )?;
        let id = conn.last_insert_rowid();

        info!("Created mission {} for client {}", id, client);

        Ok(Mission {
            id,
            client: client.to_string(),
            dt: dt.to_string(),
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
            assigned_to: None,
            status: MissionStatus::New,
        })
    }

    /// List all missions ordered by scheduled date/time ascending, with the
    /// assignee's display name resolved. Unassigned (or dangling) references
    /// yield a null name, not an error.
    pub fn list(&self) -> Result<Vec<MissionListItem>, MissionStoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT m.id, m.client, m.dt, m.pickup, m.dropoff, m.assigned_to, m.status,
                    u.name AS assigned_name
             FROM missions m
             LEFT JOIN users u ON m.assigned_to = u.id
             ORDER BY m.dt",
        )?;

        let missions = stmt
            .query_map([], |row| {
                Ok(MissionListItem {
                    mission: Self::row_to_mission(row)?,
                    assigned_name: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(missions)
    }

    /// Fetch a single mission by id.
    pub fn get(&self, id: i64) -> Result<Option<Mission>, MissionStoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, client, dt, pickup, dropoff, assigned_to, status
             FROM missions WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], Self::row_to_mission) {
            Ok(mission) => Ok(Some(mission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Assign a mission to a user.
    ///
    /// Sets the assignee and the `assigned` status in a single UPDATE so the
    /// status/assignee invariant cannot be observed half-applied.
    /// Re-assignment overwrites the previous assignee with no guard. The
    /// target user id is a weak reference and is not checked for existence.
    pub fn assign(&self, mission_id: i64, user_id: i64) -> Result<(), MissionStoreError> {
        let conn = self.db.lock();
        let rows_affected = conn.execute(
            "UPDATE missions SET assigned_to = ?1, status = ?2 WHERE id = ?3",
            params![user_id, MissionStatus::Assigned.as_str(), mission_id],
        )?;

        if rows_affected == 0 {
            return Err(MissionStoreError::NotFound);
        }

        info!("Assigned mission {} to user {}", mission_id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use crate::auth::UserStore;
    use crate::db;

    fn create_test_stores() -> (MissionStore, UserStore) {
        let db = db::open_in_memory();
        let users = UserStore::new(db.clone()).unwrap();
        let missions = MissionStore::new(db).unwrap();
        (missions, users)
    }

    #[test]
    fn test_created_mission_is_new_and_unassigned() {
        let (store, _users) = create_test_stores();

        let mission = store
            .create("Acme", "2026-09-01T10:00:00Z", "Depot A", "Depot B")
            .unwrap();

        assert_eq!(mission.status, MissionStatus::New);
        assert!(mission.assigned_to.is_none());

        let fetched = store.get(mission.id).unwrap().unwrap();
        assert_eq!(fetched.status, MissionStatus::New);
        assert!(fetched.assigned_to.is_none());
    }

    #[test]
    fn test_assign_sets_both_assignee_and_status() {
        let (store, users) = create_test_stores();
        let driver = users
            .create_user("driver1", "pass", UserRole::Standard)
            .unwrap();

        let mission = store
            .create("Acme", "2026-09-01T10:00:00Z", "Depot A", "Depot B")
            .unwrap();
        store.assign(mission.id, driver.id).unwrap();

        let fetched = store.get(mission.id).unwrap().unwrap();
        assert_eq!(fetched.status, MissionStatus::Assigned);
        assert_eq!(fetched.assigned_to, Some(driver.id));
    }

    #[test]
    fn test_assign_is_idempotent_and_reassignable() {
        let (store, users) = create_test_stores();
        let a = users.create_user("a", "pass", UserRole::Standard).unwrap();
        let b = users.create_user("b", "pass", UserRole::Standard).unwrap();

        let mission = store
            .create("Acme", "2026-09-01T10:00:00Z", "Depot A", "Depot B")
            .unwrap();

        // Same target twice: observationally a no-op.
        store.assign(mission.id, a.id).unwrap();
        store.assign(mission.id, a.id).unwrap();
        let fetched = store.get(mission.id).unwrap().unwrap();
        assert_eq!(fetched.assigned_to, Some(a.id));
        assert_eq!(fetched.status, MissionStatus::Assigned);

        // Re-assignment silently overwrites.
        store.assign(mission.id, b.id).unwrap();
        let fetched = store.get(mission.id).unwrap().unwrap();
        assert_eq!(fetched.assigned_to, Some(b.id));
        assert_eq!(fetched.status, MissionStatus::Assigned);
    }

    #[test]
    fn test_assign_unknown_mission_is_not_found() {
        let (store, _users) = create_test_stores();

        let err = store.assign(999, 1).unwrap_err();
        assert!(matches!(err, MissionStoreError::NotFound));
    }

    #[test]
    fn test_assign_to_nonexistent_user_succeeds() {
        // Weak reference: the target user is not checked.
        let (store, _users) = create_test_stores();

        let mission = store
            .create("Acme", "2026-09-01T10:00:00Z", "Depot A", "Depot B")
            .unwrap();
        store.assign(mission.id, 4242).unwrap();

        let fetched = store.get(mission.id).unwrap().unwrap();
        assert_eq!(fetched.assigned_to, Some(4242));
        assert_eq!(fetched.status, MissionStatus::Assigned);
    }

    #[test]
    fn test_list_orders_by_dt_and_joins_assignee_name() {
        let (store, users) = create_test_stores();
        let driver = users
            .create_user("driver1", "pass", UserRole::Standard)
            .unwrap();

        let later = store
            .create("Beta", "2026-09-02T08:00:00Z", "X", "Y")
            .unwrap();
        let earlier = store
            .create("Acme", "2026-09-01T10:00:00Z", "A", "B")
            .unwrap();
        store.assign(earlier.id, driver.id).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);

        assert_eq!(listed[0].mission.id, earlier.id);
        assert_eq!(listed[0].assigned_name.as_deref(), Some("driver1"));

        assert_eq!(listed[1].mission.id, later.id);
        assert!(listed[1].assigned_name.is_none());
    }

    #[test]
    fn test_dangling_assignee_lists_with_null_name() {
        let (store, _users) = create_test_stores();

        let mission = store
            .create("Acme", "2026-09-01T10:00:00Z", "A", "B")
            .unwrap();
        store.assign(mission.id, 4242).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].mission.assigned_to, Some(4242));
        assert!(listed[0].assigned_name.is_none());
    }
}
