//! SQLite storage backend.
//!
//! Program aggregates are stored as JSON documents in a `programs` table with
//! owner, start date and revision pulled out into columns. Updates are guarded
//! by `WHERE revision = ?` inside a transaction.

use async_trait::async_trait;
use optivita_core::{OwnerId, Program, ProgramId};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use tracing::debug;

use super::trait_::{next_revision, Storage, StorageError, Result};

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a database at the given URL, e.g. `sqlite://optivita.db?mode=rwc`.
    pub async fn new(db_url: &str) -> Result<Self> {
        let pool = sqlx::SqlitePool::connect(db_url).await?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create an in-memory SQLite storage for testing.
    pub async fn in_memory() -> Result<Self> {
        // One connection, otherwise every pooled connection gets its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS programs (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                start_date TEXT NOT NULL,
                revision INTEGER NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_programs_owner ON programs(owner)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<Program> {
        let data: String = row.try_get("data")?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Revision currently stored for `program`, read inside `tx`.
async fn stored_revision(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    program: &Program,
) -> Result<u64> {
    let row = sqlx::query("SELECT revision FROM programs WHERE id = ? AND owner = ?")
        .bind(program.id.to_string())
        .bind(program.owner.as_str())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("program {}", program.id)))?;
    let revision: i64 = row.try_get("revision")?;
    u64::try_from(revision)
        .map_err(|_| StorageError::Other(format!("negative revision for program {}", program.id)))
}

fn to_i64(revision: u64) -> Result<i64> {
    i64::try_from(revision).map_err(|_| StorageError::Other(format!("revision {} out of range", revision)))
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_program(&self, program: &Program) -> Result<()> {
        let data = serde_json::to_string(program)?;
        sqlx::query(
            "INSERT INTO programs (id, owner, start_date, revision, data) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(program.id.to_string())
        .bind(program.owner.as_str())
        .bind(program.start_date.to_string())
        .bind(to_i64(program.revision)?)
        .bind(data)
        .execute(&self.pool)
        .await?;

        debug!(program_id = %program.id, "stored program");
        Ok(())
    }

    async fn load_program(&self, owner: &OwnerId, id: ProgramId) -> Result<Option<Program>> {
        let row = sqlx::query("SELECT data FROM programs WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list_programs(&self, owner: &OwnerId) -> Result<Vec<Program>> {
        let rows = sqlx::query(
            "SELECT data FROM programs WHERE owner = ? ORDER BY start_date DESC, id DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn update_program(&self, program: &Program) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let stored = stored_revision(&mut tx, program).await?;

        let revision = next_revision(stored, program.revision)?;
        let mut updated = program.clone();
        updated.revision = revision;

        let result = sqlx::query(
            "UPDATE programs SET start_date = ?, revision = ?, data = ? WHERE id = ? AND revision = ?",
        )
        .bind(updated.start_date.to_string())
        .bind(to_i64(revision)?)
        .bind(serde_json::to_string(&updated)?)
        .bind(updated.id.to_string())
        .bind(to_i64(stored)?)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            let actual = stored_revision(&mut tx, program).await?;
            return Err(StorageError::VersionConflict { expected: program.revision, actual });
        }

        tx.commit().await?;
        debug!(program_id = %program.id, revision, "updated program");
        Ok(revision)
    }

    async fn delete_program(&self, owner: &OwnerId, id: ProgramId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
