//! Durable settings storage.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::config::ConnectionConfig;
use crate::errors::SettingsError;

/// Key under which the connection settings are stored.
pub const CONNECTION_KEY: &str = "connection";

/// Durable storage for connection settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or the defaults if nothing was saved yet.
    async fn get(&self) -> Result<ConnectionConfig, SettingsError>;

    async fn set(&self, config: &ConnectionConfig) -> Result<(), SettingsError>;
}

/// Settings store backed by the SQLite `settings` table.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// When the connection settings were last saved, as RFC 3339.
    pub async fn updated_at(&self) -> Result<Option<String>, SettingsError> {
        let row = sqlx::query("SELECT updated_at FROM settings WHERE key = ?")
            .bind(CONNECTION_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("updated_at")))
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self) -> Result<ConnectionConfig, SettingsError> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(CONNECTION_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let value: String = row.get("value");
                Ok(serde_json::from_str(&value)?)
            }
            None => {
                tracing::debug!("No stored connection settings, using defaults");
                Ok(ConnectionConfig::default())
            }
        }
    }

    async fn set(&self, config: &ConnectionConfig) -> Result<(), SettingsError> {
        let value = serde_json::to_string(config)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(CONNECTION_KEY)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!("Saved connection settings for {}", config.endpoint_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("settings.sqlite"))
            .await
            .unwrap();
        let store = SqliteSettingsStore::new(pool);

        assert_eq!(store.get().await.unwrap(), ConnectionConfig::default());
        assert!(store.updated_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("settings.sqlite");

        let saved = ConnectionConfig::default()
            .with_endpoint("localhost:8080")
            .with_api_key("key")
            .with_acl_token("jwt")
            .configured();

        {
            let store = SqliteSettingsStore::new(init_database(&db_path).await.unwrap());
            store.set(&ConnectionConfig::default()).await.unwrap();
            store.set(&saved).await.unwrap();
            assert!(store.updated_at().await.unwrap().is_some());
        }

        let reopened = SqliteSettingsStore::new(init_database(&db_path).await.unwrap());
        assert_eq!(reopened.get().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("settings.sqlite"))
            .await
            .unwrap();
        sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, 'not json', 'now')")
            .bind(CONNECTION_KEY)
            .execute(&pool)
            .await
            .unwrap();

        let err = SqliteSettingsStore::new(pool).get().await.unwrap_err();
        assert!(matches!(err, SettingsError::Serialization(_)));
    }
}
