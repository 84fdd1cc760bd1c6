//! SQLite channel registry implementation.
//!
//! Implements `ChannelRepository` from `purgebot-core` using sqlx with split
//! read/write pools. Channel ids are stored as TEXT so the whole `u64`
//! snowflake range round-trips.

use chrono::{DateTime, Utc};
use purgebot_core::repository::channel::ChannelRepository;
use purgebot_types::channel::{ChannelId, ChannelPolicy};
use purgebot_types::error::RepositoryError;
use purgebot_types::max_age::MaxAge;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChannelRepository`.
pub struct SqliteChannelRepository {
    pool: DatabasePool,
}

impl SqliteChannelRepository {
    /// Create a new registry backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChannelRow {
    channel_id: String,
    max_age: i64,
    created_at: String,
    updated_at: String,
}

impl ChannelRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            channel_id: row.try_get("channel_id")?,
            max_age: row.try_get("max_age")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_policy(self) -> Result<ChannelPolicy, RepositoryError> {
        let channel_id: ChannelId = self
            .channel_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid channel_id: {e}")))?;
        let max_age = u32::try_from(self.max_age)
            .ok()
            .and_then(MaxAge::from_minutes)
            .ok_or_else(|| RepositoryError::Query(format!("invalid max_age: {}", self.max_age)))?;

        Ok(ChannelPolicy {
            channel_id,
            max_age,
            registered_at: Some(parse_datetime(&self.created_at)?),
            updated_at: Some(parse_datetime(&self.updated_at)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_sqlx(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ChannelRepository implementation
// ---------------------------------------------------------------------------

impl ChannelRepository for SqliteChannelRepository {
    async fn upsert(&self, channel_id: ChannelId, max_age: MaxAge) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());

        sqlx::query(
            r#"INSERT INTO channels (channel_id, max_age, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (channel_id) DO UPDATE SET max_age = excluded.max_age, updated_at = excluded.updated_at"#,
        )
        .bind(channel_id.to_string())
        .bind(i64::from(max_age.minutes()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        tracing::debug!(%channel_id, max_age_minutes = max_age.minutes(), "channel policy upserted");
        Ok(())
    }

    async fn remove(&self, channel_id: ChannelId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM channels WHERE channel_id = ?")
            .bind(channel_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        tracing::debug!(%channel_id, rows = result.rows_affected(), "channel policy removed");
        Ok(())
    }

    async fn get(&self, channel_id: ChannelId) -> Result<Option<ChannelPolicy>, RepositoryError> {
        let row = sqlx::query(
            "SELECT channel_id, max_age, created_at, updated_at FROM channels WHERE channel_id = ?",
        )
        .bind(channel_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let row = ChannelRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(row.into_policy()?))
            }
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<ChannelPolicy>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT channel_id, max_age, created_at, updated_at FROM channels",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        let mut policies = Vec::with_capacity(rows.len());
        for row in &rows {
            let row = ChannelRow::from_row(row).map_err(map_sqlx)?;
            policies.push(row.into_policy()?);
        }
        // TEXT ordering would put "200" before "30".
        policies.sort_by_key(|p| p.channel_id);

        Ok(policies)
    }
}
