use super::StakeholderStore;
use crate::error::StakeholderError;
use crate::stakeholders::record::Stakeholder;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

const STAKEHOLDERS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS stakeholders (
    key        TEXT PRIMARY KEY,
    record     TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// SQLite-backed store holding one JSON document per stakeholder.
pub struct SqliteStakeholderStore {
    pool: SqlitePool,
}

impl SqliteStakeholderStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, StakeholderError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StakeholderError::Store(format!("create {}: {e}", parent.display()))
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url).await?;
        Self::new(pool).await
    }

    /// Wrap an existing pool and create the table.
    pub async fn new(pool: SqlitePool) -> Result<Self, StakeholderError> {
        sqlx::query(STAKEHOLDERS_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn encode(stakeholder: &Stakeholder) -> Result<String, StakeholderError> {
    serde_json::to_string(stakeholder)
        .map_err(|e| StakeholderError::Store(format!("encode {}: {e}", stakeholder.key())))
}

#[async_trait]
impl StakeholderStore for SqliteStakeholderStore {
    async fn get(&self, key: &str) -> Result<Option<Stakeholder>, StakeholderError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT record FROM stakeholders WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(record,)| {
            serde_json::from_str(&record)
                .map_err(|e| StakeholderError::Store(format!("decode {key}: {e}")))
        })
        .transpose()
    }

    async fn put(&self, stakeholder: &Stakeholder) -> Result<(), StakeholderError> {
        sqlx::query(
            "INSERT INTO stakeholders (key, record, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT(key) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at",
        )
        .bind(stakeholder.key())
        .bind(encode(stakeholder)?)
        .bind(stakeholder.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Stakeholder>, StakeholderError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, record FROM stakeholders ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, record)| match serde_json::from_str(&record) {
                Ok(stakeholder) => Some(stakeholder),
                Err(e) => {
                    tracing::warn!(%key, error = %e, "skipping undecodable stakeholder record");
                    None
                }
            })
            .collect())
    }
}
