//! SQLite-backed record store.
//!
//! Runtime pragmas match a small single-user database:
//! - `journal_mode = WAL` so a reader never blocks on a writer
//! - `busy_timeout = 5s` to ride out transient lock failures
//! - `foreign_keys = ON` so sessions are dropped with their account

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::{Collection, Document, Fields, RecordStore, generate_id, merge_patch, migrations, stamp_created};
use crate::error::{BoardError, Result};

/// Busy timeout used for board DB connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the board database, apply pragmas, and migrate.
    ///
    /// # Errors
    ///
    /// Returns an error if opening, configuring, or migrating fails.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create board db directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("open board database {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Private database for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if configuring or migrating fails.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory board database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> anyhow::Result<Self> {
        configure_connection(&conn).context("configure sqlite pragmas")?;
        migrations::migrate(&mut conn).context("apply board migrations")?;
        Ok(Self { conn })
    }

    /// Shared connection, used by the session guard for its own tables.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn from_micros(us: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(us)
        .ok_or_else(|| BoardError::StoreUnavailable(format!("timestamp out of range: {us}")))
}

fn not_found(collection: Collection, id: &str) -> BoardError {
    BoardError::NotFound {
        collection: collection.as_str(),
        id: id.to_string(),
    }
}

impl RecordStore for SqliteStore {
    fn append(&mut self, collection: Collection, mut fields: Fields) -> Result<Document> {
        let now = Utc::now();
        let id = generate_id(collection, now);
        stamp_created(&mut fields, now);
        let body = serde_json::to_string(&fields)?;

        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, body, created_at_us)
             VALUES (?1, ?2, ?3, ?4)",
            params![collection.as_str(), id, body, now.timestamp_micros()],
        )?;
        debug!(%collection, %id, "appended document");

        Ok(Document {
            id,
            created_at: now,
            fields,
        })
    }

    fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body, created_at_us FROM documents
             WHERE collection = ?1
             ORDER BY created_at_us DESC, seq DESC",
        )?;
        let rows = stmt.query_map(params![collection.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body, created_at_us) = row?;
            docs.push(Document {
                id,
                created_at: from_micros(created_at_us)?,
                fields: serde_json::from_str(&body)?,
            });
        }
        debug!(%collection, count = docs.len(), "fetched collection");
        Ok(docs)
    }

    fn patch(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        let tx = self.conn.transaction()?;
        let body: Option<String> = tx
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Err(not_found(collection, id));
        };

        let mut stored: Fields = serde_json::from_str(&body)?;
        merge_patch(&mut stored, fields);
        tx.execute(
            "UPDATE documents SET body = ?1 WHERE collection = ?2 AND doc_id = ?3",
            params![serde_json::to_string(&stored)?, collection.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection.as_str(), id],
        )?;
        if removed == 0 {
            return Err(not_found(collection, id));
        }
        Ok(())
    }
}
