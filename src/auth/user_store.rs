//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{User, UserRole};
use crate::db::Db;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use rusqlite::{params, ErrorCode};
use std::fmt;
use tracing::{info, warn};

/// Seeded once at startup when no user with this name exists.
const DEFAULT_ADMIN_NAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "adminpass";

/// Errors surfaced by the credential store.
///
/// `InvalidCredentials` deliberately covers both "unknown user" and "wrong
/// password" so a caller cannot tell which half failed.
#[derive(Debug)]
pub enum UserStoreError {
    InvalidCredentials,
    DuplicateName,
    Storage(anyhow::Error),
}

impl fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStoreError::InvalidCredentials => write!(f, "Invalid credentials"),
            UserStoreError::DuplicateName => write!(f, "User name already exists"),
            UserStoreError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for UserStoreError {}

impl From<rusqlite::Error> for UserStoreError {
    fn from(e: rusqlite::Error) -> Self {
        UserStoreError::Storage(e.into())
    }
}

impl From<bcrypt::BcryptError> for UserStoreError {
    fn from(e: bcrypt::BcryptError) -> Self {
        UserStoreError::Storage(e.into())
    }
}

/// User storage with SQLite backend
#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store, initialize the schema, and seed the default
    /// admin account if it is missing.
    pub fn new(db: Db) -> Result<Self> {
        let store = Self { db };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.db.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL
            )",
            [],
        )?;

        // One-time idempotent seeding of the default admin.
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE name = ?1",
                params![DEFAULT_ADMIN_NAME],
                |row| row.get(0),
            )
            .context("Failed to check for default admin")?;

        if exists == 0 {
            let password_hash =
                hash(DEFAULT_ADMIN_PASSWORD, DEFAULT_COST).context("Failed to hash password")?;
            conn.execute(
                "INSERT INTO users (name, password_hash, role) VALUES (?1, ?2, ?3)",
                params![DEFAULT_ADMIN_NAME, password_hash, UserRole::Admin.as_str()],
            )
            .context("Failed to insert default admin")?;

            info!("Default admin user created (name: admin)");
            warn!("Change the default admin password in production");
        }

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(3)?;
        let role = UserRole::from_str(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown role: {}", role_str).into(),
            )
        })?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            password_hash: row.get(2)?,
            role,
        })
    }

    /// Get user by display name
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.db.lock();
        let mut stmt = conn
            .prepare("SELECT id, name, password_hash, role FROM users WHERE name = ?1")?;

        match stmt.query_row(params![name], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a name/password pair and return the matching user.
    ///
    /// Unknown name and wrong password both return
    /// [`UserStoreError::InvalidCredentials`].
    pub fn verify_credentials(&self, name: &str, password: &str) -> Result<User, UserStoreError> {
        let user = self
            .get_user_by_name(name)?
            .ok_or(UserStoreError::InvalidCredentials)?;

        // bcrypt's verify does the scheme-defined constant-time comparison.
        if verify(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(UserStoreError::InvalidCredentials)
        }
    }

    /// Create a new user with a freshly computed password hash.
    pub fn create_user(
        &self,
        name: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, UserStoreError> {
        let password_hash = hash(password, DEFAULT_COST)?;

        let conn = self.db.lock();
        let result = conn.execute(
            "INSERT INTO users (name, password_hash, role) VALUES (?1, ?2, ?3)",
            params![name, password_hash, role.as_str()],
        );

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                info!("Created user: {} ({})", name, role.as_str());
                Ok(User {
                    id,
                    name: name.to_string(),
                    password_hash,
                    role,
                })
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(UserStoreError::DuplicateName)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all users. Password hashes stay out of the serialized form via
    /// `#[serde(skip_serializing)]` on [`User`].
    pub fn list_users(&self) -> Result<Vec<User>, UserStoreError> {
        let conn = self.db.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, password_hash, role FROM users ORDER BY id")?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}
