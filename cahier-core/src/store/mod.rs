// cahier-core/src/store/mod.rs

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

use crate::command::{Command, CommandId, Status, NO_EXIT_CODE, SENTINEL_ID};

pub mod schema;

use schema::Migration;

// ════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration to schema v{version} failed: {source}")]
    Migration {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("no command with id {0}")]
    UnknownId(CommandId),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// ════════════════════════════════════════════════════════════════════
// Store
// ════════════════════════════════════════════════════════════════════

/// The durable command log.
///
/// Rows come back in primary-key order. Every write replaces whole rows;
/// there is no partial-field update besides [`Store::update_status`].
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    last_minted: CommandId,
}

impl Store {
    /// Open the store at `path` (or `":memory:"`), creating and migrating the
    /// schema as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let in_memory = path.as_ref().as_os_str() == ":memory:";
        let conn = Connection::open(&path)?;

        if !in_memory {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        Self::from_connection(conn)
    }

    /// Wrap an already open connection and bring its schema up to date.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn,
            last_minted: SENTINEL_ID,
        })
    }

    // ────────────────────────────────────────────────────────────────
    // Reads
    // ────────────────────────────────────────────────────────────────

    /// Every record, oldest id first. An empty log is an empty vec.
    pub fn load(&self) -> Result<Vec<Command>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, command, status, return_code FROM commands ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            let id: CommandId = row.get(0)?;
            let raw_status: String = row.get(2)?;
            let status = Status::parse(&raw_status).unwrap_or_else(|| {
                tracing::warn!(id, status = %raw_status, "unknown status in store, showing as unset");
                Status::Unset
            });
            Ok(Command {
                id,
                text: row.get(1)?,
                status,
                return_code: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commands", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn get(&self, id: CommandId) -> Result<Option<Command>> {
        let found = self
            .conn
            .query_row(
                "SELECT command, status, return_code FROM commands WHERE id = ?1",
                params![id],
                |row| {
                    let raw_status: String = row.get(1)?;
                    Ok(Command {
                        id,
                        text: row.get(0)?,
                        status: Status::parse(&raw_status).unwrap_or_default(),
                        return_code: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    // ────────────────────────────────────────────────────────────────
    // Writes
    // ────────────────────────────────────────────────────────────────

    /// Insert-or-replace by id. A sentinel id gets a freshly minted one;
    /// any other id overwrites every column of that row. Returns the id
    /// that was written.
    pub fn upsert(&mut self, record: &Command) -> Result<CommandId> {
        let id = if record.is_persisted() {
            record.id
        } else {
            self.mint_id()?
        };

        self.conn.execute(
            "INSERT INTO commands (id, command, status, return_code)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE
             SET command = excluded.command,
                 status = excluded.status,
                 return_code = excluded.return_code",
            params![id, record.text, record.status.as_str(), record.return_code],
        )?;

        tracing::debug!(id, minted = !record.is_persisted(), "command upserted");
        Ok(id)
    }

    /// Rewrite only the outcome columns of an existing row.
    pub fn update_status(&self, id: CommandId, status: Status, return_code: i32) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE commands SET status = ?1, return_code = ?2 WHERE id = ?3",
            params![status.as_str(), return_code, id],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownId(id));
        }
        Ok(())
    }

    /// Upsert, then return the freshly loaded log alongside the written id.
    pub fn save_and_reload(&mut self, record: &Command) -> Result<(CommandId, Vec<Command>)> {
        let id = self.upsert(record)?;
        Ok((id, self.load()?))
    }

    /// Update a row's outcome, then return the freshly loaded log.
    pub fn set_status_and_reload(
        &self,
        id: CommandId,
        status: Status,
        return_code: i32,
    ) -> Result<Vec<Command>> {
        self.update_status(id, status, return_code)?;
        self.load()
    }

    /// Rows still marked `running` belong to processes from an earlier
    /// session that can no longer report back. Mark them failed.
    pub fn recover_interrupted(&self) -> Result<usize> {
        let affected = self.conn.execute(
            "UPDATE commands SET status = ?1, return_code = ?2 WHERE status = ?3",
            params![
                Status::Failed.as_str(),
                NO_EXIT_CODE,
                Status::Running.as_str()
            ],
        )?;
        Ok(affected)
    }

    // ────────────────────────────────────────────────────────────────
    // Id minting
    // ────────────────────────────────────────────────────────────────

    /// Nanosecond timestamp, bumped past every existing and previously
    /// minted id so new rows always sort last.
    fn mint_id(&mut self) -> Result<CommandId> {
        let max_existing: CommandId = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM commands",
            [],
            |row| row.get(0),
        )?;
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(SENTINEL_ID);

        let id = now
            .max(max_existing.saturating_add(1))
            .max(self.last_minted.saturating_add(1));
        self.last_minted = id;
        Ok(id)
    }
}

// ────────────────────────────────────────────────────────────────
// Migrations
// ────────────────────────────────────────────────────────────────

fn migrate(conn: &Connection) -> Result<()> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (idx, migration) in schema::MIGRATIONS.iter().enumerate() {
        let version = idx as u32 + 1;
        if version <= current {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        apply_migration(&tx, migration)
            .and_then(|_| tx.pragma_update(None, "user_version", version))
            .map_err(|source| StoreError::Migration { version, source })?;
        tx.commit()?;

        tracing::info!(version, "command log migrated");
    }
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    match migration {
        Migration::Batch(sql) => conn.execute_batch(sql),
        Migration::AddColumns { table, columns } => {
            let existing = column_names(conn, table)?;
            for (name, definition) in columns.iter() {
                if existing.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                    tracing::debug!(table, column = name, "column already present");
                    continue;
                }
                conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {name} {definition};"))?;
            }
            Ok(())
        }
    }
}

fn column_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}
