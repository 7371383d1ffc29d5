use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, Pool, Postgres};
use std::time::Duration;

use crate::broker::types::MessageEnvelope;
use crate::config::Config;
use crate::metrics;

pub type DbPool = Pool<Postgres>;

/// A persisted message row. Identity is assigned by the store on insert and
/// never changes; `read` only ever transitions false to true.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredMessage {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .acquire_timeout(Duration::from_secs(config.db.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db.idle_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Insert one envelope as a new message row.
///
/// The timestamp is assigned by the database at insert time and the read
/// flag starts false; the generated identity is returned to the caller.
pub async fn insert_message(pool: &DbPool, envelope: &MessageEnvelope) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO messages (sender_id, receiver_id, content, timestamp, read)
        VALUES ($1, $2, $3, NOW(), FALSE)
        RETURNING id
        "#,
    )
    .bind(&envelope.sender_id)
    .bind(&envelope.receiver_id)
    .bind(&envelope.content)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Flip the read flag for a message.
///
/// Updating a row that does not exist is a no-op success; callers do not
/// distinguish the two cases.
pub async fn mark_message_read(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
    let result = sqlx::query("UPDATE messages SET read = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(message_id = id, "Mark-read for unknown message id");
    }

    Ok(())
}

/// Fetch the conversation history between two participants.
///
/// Membership is symmetric: a row matches if its sender/receiver pair equals
/// {user_a, user_b} in either orientation. Results are ordered ascending by
/// timestamp with identity as the tie-break. Rows that fail to decode are
/// skipped, counted, and logged rather than failing the whole query.
pub async fn conversation_between(
    pool: &DbPool,
    user_a: &str,
    user_b: &str,
) -> Result<Vec<StoredMessage>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, sender_id, receiver_id, content, timestamp, read
        FROM messages
        WHERE (sender_id = $1 AND receiver_id = $2)
           OR (sender_id = $2 AND receiver_id = $1)
        ORDER BY timestamp ASC, id ASC
        "#,
    )
    .bind(user_a)
    .bind(user_b)
    .fetch_all(pool)
    .await?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in &rows {
        match StoredMessage::from_row(row) {
            Ok(message) => messages.push(message),
            Err(e) => {
                metrics::HISTORY_ROWS_SKIPPED.inc();
                tracing::warn!(error = %e, "Skipping undecodable message row");
            }
        }
    }

    Ok(messages)
}
