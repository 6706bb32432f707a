// SQLite persistence for the session and cached conversations.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{Message, User};

/// Local store: a key/value `session_state` table plus the last fetched
/// messages per job so a conversation renders before its first poll lands.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub const TOKEN_KEY: &'static str = "token";
    pub const USER_KEY: &'static str = "user";
    pub const LAST_ROUTE_KEY: &'static str = "last_route";

    /// Open (or create) the database at `path` and ensure the tables exist.
    /// `":memory:"` gives an ephemeral store for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS session_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS message_cache (
                job_id     TEXT PRIMARY KEY,
                messages   TEXT NOT NULL,
                fetched_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Key/value state
    // ------------------------------------------------------------------

    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO session_state (key, value) VALUES (?1, ?2)",
                params![key, json_str],
            )
            .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved value. `None` when the key is absent.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM session_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query session state")?;
        raw.map(|s| serde_json::from_str(&s).context("failed to deserialize state value"))
            .transpose()
    }

    pub fn delete_state(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM session_state WHERE key = ?1", params![key])
            .context("failed to delete state")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn save_session(&self, token: &str, user: &User) -> Result<()> {
        self.save_state(Self::TOKEN_KEY, &serde_json::Value::String(token.to_string()))?;
        let user_json = serde_json::to_value(user).context("failed to serialize user")?;
        self.save_state(Self::USER_KEY, &user_json)
    }

    /// Stored token and the user cached alongside it. A cached user that no
    /// longer decodes is dropped; the token alone is still returned.
    pub fn load_session(&self) -> Result<Option<(String, Option<User>)>> {
        let Some(token) = self.load_state(Self::TOKEN_KEY)? else {
            return Ok(None);
        };
        let Some(token) = token.as_str().map(str::to_string) else {
            return Ok(None);
        };
        let user = self
            .load_state(Self::USER_KEY)?
            .and_then(|v| serde_json::from_value(v).ok());
        Ok(Some((token, user)))
    }

    /// Forget the token, cached user and every cached conversation.
    pub fn clear_session(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM session_state WHERE key IN (?1, ?2, ?3)",
            params![Self::TOKEN_KEY, Self::USER_KEY, Self::LAST_ROUTE_KEY],
        )
        .context("failed to clear session")?;
        conn.execute("DELETE FROM message_cache", [])
            .context("failed to clear message cache")?;
        Ok(())
    }

    pub fn save_last_route(&self, route: &str) -> Result<()> {
        self.save_state(Self::LAST_ROUTE_KEY, &serde_json::Value::String(route.to_string()))
    }

    pub fn load_last_route(&self) -> Result<Option<String>> {
        Ok(self
            .load_state(Self::LAST_ROUTE_KEY)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    // ------------------------------------------------------------------
    // Message cache
    // ------------------------------------------------------------------

    /// Replace the cached messages for `job_id` (last fetch wins).
    pub fn cache_messages(&self, job_id: &str, messages: &[Message]) -> Result<()> {
        let json_str = serde_json::to_string(messages).context("failed to serialize messages")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO message_cache (job_id, messages) VALUES (?1, ?2)",
                params![job_id, json_str],
            )
            .context("failed to cache messages")?;
        Ok(())
    }

    pub fn cached_messages(&self, job_id: &str) -> Result<Vec<Message>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT messages FROM message_cache WHERE job_id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query message cache")?;
        match raw {
            Some(s) => serde_json::from_str(&s).context("failed to deserialize cached messages"),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, SubscriptionStatus};
    use serde_json::json;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory db")
    }

    fn user() -> User {
        User {
            id: "u-1".into(),
            email: "s@x.in".into(),
            company_name: "Stone & Co".into(),
            contact_phone: "1".into(),
            role: Role::Supplier,
            gst_number: None,
            address: None,
            is_verified: true,
            subscription_status: SubscriptionStatus::Inactive,
            subscription_expires_at: None,
            trial_expires_at: None,
            created_at: None,
        }
    }

    fn message(id: &str) -> Message {
        Message {
            id: id.into(),
            job_id: "j-1".into(),
            sender_id: "u-1".into(),
            receiver_id: Some("u-2".into()),
            sender_name: None,
            message: format!("msg {id}"),
            file_attachments: vec![],
            created_at: crate::model::timestamp::parse("2025-03-05T12:00:00Z"),
        }
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('session_state', 'message_cache')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn state_round_trip_and_overwrite() {
        let db = test_db();
        assert!(db.load_state("k").unwrap().is_none());
        db.save_state("k", &json!({"a": 1})).unwrap();
        db.save_state("k", &json!(2)).unwrap();
        assert_eq!(db.load_state("k").unwrap(), Some(json!(2)));
        db.delete_state("k").unwrap();
        assert!(db.load_state("k").unwrap().is_none());
    }

    #[test]
    fn session_round_trip() {
        let db = test_db();
        assert!(db.load_session().unwrap().is_none());

        db.save_session("tok-123", &user()).unwrap();
        let (token, cached) = db.load_session().unwrap().unwrap();
        assert_eq!(token, "tok-123");
        assert_eq!(cached.unwrap(), user());
    }

    #[test]
    fn undecodable_cached_user_is_dropped() {
        let db = test_db();
        db.save_state(Database::TOKEN_KEY, &json!("tok")).unwrap();
        db.save_state(Database::USER_KEY, &json!({"nope": true})).unwrap();
        let (token, cached) = db.load_session().unwrap().unwrap();
        assert_eq!(token, "tok");
        assert!(cached.is_none());
    }

    #[test]
    fn clear_session_forgets_everything() {
        let db = test_db();
        db.save_session("tok", &user()).unwrap();
        db.save_last_route("chat").unwrap();
        db.cache_messages("j-1", &[message("m1")]).unwrap();

        db.clear_session().unwrap();
        assert!(db.load_session().unwrap().is_none());
        assert!(db.load_last_route().unwrap().is_none());
        assert!(db.cached_messages("j-1").unwrap().is_empty());
    }

    #[test]
    fn message_cache_last_write_wins() {
        let db = test_db();
        assert!(db.cached_messages("j-1").unwrap().is_empty());

        db.cache_messages("j-1", &[message("m1"), message("m2")]).unwrap();
        db.cache_messages("j-1", &[message("m3")]).unwrap();
        let cached = db.cached_messages("j-1").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0], message("m3"));
    }
}
