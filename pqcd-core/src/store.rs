//! Decoy history storage
//!
//! SQLite-backed record of generated decoys. Writes are best-effort side
//! effects of generation: the engine logs and swallows storage errors so a
//! missing or unwritable database never fails the primary operation.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One stored decoy row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct StoredDecoy {
    pub id: i64,
    pub decoy_text: String,
    pub target_text: String,
    pub complexity: u32,
    pub effectiveness_score: f64,
    pub created_at: String,
}

/// Handle to the decoy history database.
pub struct DecoyStore {
    conn: Connection,
}

fn row_to_decoy(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDecoy> {
    Ok(StoredDecoy {
        id: row.get(0)?,
        decoy_text: row.get(1)?,
        target_text: row.get(2)?,
        complexity: row.get(3)?,
        effectiveness_score: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl DecoyStore {
    /// Open (or create) the history database and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open decoy store: {}", path.display()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS decoys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                decoy_text TEXT NOT NULL,
                target_text TEXT NOT NULL,
                complexity INTEGER NOT NULL,
                effectiveness_score REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("failed to create decoys table")?;

        Ok(DecoyStore { conn })
    }

    /// Insert one generated batch in a single transaction.
    pub fn record_batch(
        &mut self,
        target: &str,
        complexity: u32,
        decoys: &[(String, f64)],
    ) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin decoy store transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO decoys (decoy_text, target_text, complexity, effectiveness_score)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .context("failed to prepare decoy insert")?;
            for (decoy, effectiveness) in decoys {
                stmt.execute(params![decoy, target, complexity, effectiveness])
                    .context("failed to insert decoy")?;
            }
        }
        tx.commit().context("failed to commit decoy batch")
    }

    /// Fetch the most recent stored decoys, newest first, optionally
    /// filtered by target.
    pub fn recent(&self, target: Option<&str>, limit: usize) -> Result<Vec<StoredDecoy>> {
        let limit = limit as i64;

        let rows = match target {
            Some(target) => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT id, decoy_text, target_text, complexity, effectiveness_score, created_at
                         FROM decoys WHERE target_text = ?1
                         ORDER BY id DESC LIMIT ?2",
                    )
                    .context("failed to prepare decoy query")?;
                let mapped = stmt.query_map(params![target, limit], row_to_decoy)?;
                mapped.collect::<rusqlite::Result<Vec<_>>>()
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT id, decoy_text, target_text, complexity, effectiveness_score, created_at
                         FROM decoys ORDER BY id DESC LIMIT ?1",
                    )
                    .context("failed to prepare decoy query")?;
                let mapped = stmt.query_map(params![limit], row_to_decoy)?;
                mapped.collect::<rusqlite::Result<Vec<_>>>()
            }
        };

        rows.context("failed to read decoy history")
    }
}
