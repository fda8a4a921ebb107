// Credential storage
// Durable session persistence in a SQLite key-value table

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockWriteGuard};

use super::types::{
    Session, SessionUpdate, UserProfile, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_DATA_KEY,
};
use crate::error::StoreResult;

/// Synchronous storage for the process-wide session
///
/// Writes are visible to every reader as soon as `set` returns.
pub trait CredentialStore: Send + Sync {
    /// Current session. Unreadable fields read as absent.
    fn get(&self) -> Session;

    /// Merge the `Some` fields of `update` into the stored session
    fn set(&self, update: SessionUpdate) -> StoreResult<()>;

    /// Remove every session field
    fn clear(&self) -> StoreResult<()>;

    /// Name of this storage backend
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Session stored in the `auth_kv` table of a SQLite database
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteCredentialStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::debug!("Opening credential store: {}", path.display());
        let conn = Connection::open(path)?;
        Self::init(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Non-durable store backed by an in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS auth_kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    // A panic while holding the lock cannot leave a half-written row
    // (writes are transactional), so the poisoned connection is still usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_value(conn: &Connection, key: &str) -> Option<String> {
        match conn
            .query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Failed to read credential entry");
                None
            }
        }
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self) -> Session {
        let conn = self.lock();

        let access_token = Self::read_value(&conn, ACCESS_TOKEN_KEY);
        let refresh_token = Self::read_value(&conn, REFRESH_TOKEN_KEY);
        let user = Self::read_value(&conn, USER_DATA_KEY).and_then(|json| parse_user(&json));

        session_from_parts(access_token, refresh_token, user)
    }

    fn set(&self, update: SessionUpdate) -> StoreResult<()> {
        let user_json = update.user.as_ref().map(serde_json::to_string).transpose()?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            if let Some(ref token) = update.access_token {
                upsert.execute(params![ACCESS_TOKEN_KEY, token])?;
            }
            if let Some(ref token) = update.refresh_token {
                upsert.execute(params![REFRESH_TOKEN_KEY, token])?;
            }
            if let Some(ref json) = user_json {
                upsert.execute(params![USER_DATA_KEY, json])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute(
            "DELETE FROM auth_kv WHERE key IN (?1, ?2, ?3)",
            params![ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_DATA_KEY],
        )?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

/// In-process session storage, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Session>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    // Every write replaces whole fields, so a poisoned lock still guards a
    // consistent session.
    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, update: SessionUpdate) -> StoreResult<()> {
        let mut session = self.write();

        if let Some(token) = update.access_token {
            session.access_token = Some(token);
        }
        if let Some(token) = update.refresh_token {
            session.refresh_token = Some(token);
        }
        if let Some(user) = update.user {
            session.email_verified = user.email_verified;
            session.user = Some(user);
        }

        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut session = self.write();
        *session = Session::default();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn parse_user(json: &str) -> Option<UserProfile> {
    match serde_json::from_str(json) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Ignoring unreadable stored user profile: {}", e);
            None
        }
    }
}

fn session_from_parts(
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
) -> Session {
    let email_verified = user.as_ref().map(|u| u.email_verified).unwrap_or(false);
    Session {
        access_token,
        refresh_token,
        user,
        email_verified,
    }
}
