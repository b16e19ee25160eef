use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;
use zhcards_core::{CoreError, SharedSnapshot, SnapshotStore};

/// Published card-set snapshots in an embedded SQLite database.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let url = format!("sqlite://{}?mode=rwc", path.as_ref().to_string_lossy());
        Self::connect(&url).await
    }

    pub async fn open_memory() -> Result<Self, CoreError> {
        // One connection: every new in-memory connection is a fresh database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn connect(url: &str) -> Result<Self, CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS share_card_set (
          id         TEXT PRIMARY KEY,
          timestamp  TEXT NOT NULL,
          card_set   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_share_card_set_time ON share_card_set (timestamp);
        "#;

        // Execute statements one by one for compatibility.
        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|_| CoreError::Storage("sqlite schema"))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn insert(&self, card_set: Option<serde_json::Value>) -> Result<SharedSnapshot, CoreError> {
        let snap = SharedSnapshot::new(card_set);
        let payload = snap
            .card_set
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query("INSERT INTO share_card_set (id,timestamp,card_set) VALUES (?,?,?)")
            .bind(snap.id.as_str())
            .bind(snap.timestamp)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("insert snapshot"))?;
        tracing::debug!(id = %snap.id, "stored share snapshot");
        Ok(snap)
    }

    async fn get(&self, id: &str) -> Result<Option<SharedSnapshot>, CoreError> {
        let row = sqlx::query("SELECT id,timestamp,card_set FROM share_card_set WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("read snapshot"))?;
        row.map(row_into_snapshot).transpose()
    }

    async fn list(&self) -> Result<Vec<SharedSnapshot>, CoreError> {
        let rows = sqlx::query("SELECT id,timestamp,card_set FROM share_card_set ORDER BY timestamp ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list snapshots"))?;
        rows.into_iter().map(row_into_snapshot).collect()
    }
}

fn row_into_snapshot(row: sqlx::sqlite::SqliteRow) -> Result<SharedSnapshot, CoreError> {
    let card_set = row
        .get::<Option<String>, _>("card_set")
        .map(|s| serde_json::from_str::<serde_json::Value>(&s))
        .transpose()?;
    Ok(SharedSnapshot {
        id: row.get::<String, _>("id"),
        timestamp: row
            .try_get::<DateTime<Utc>, _>("timestamp")
            .map_err(|_| CoreError::Invalid("timestamp"))?,
        card_set,
    })
}
