use crate::broker::EnvelopePublisher;
use crate::db::DbPool;
use anyhow::Result;

pub async fn health_check(pool: &DbPool, publisher: &EnvelopePublisher) -> Result<()> {
    // Check database
    sqlx::query("SELECT 1").execute(pool).await?;

    // Check broker connection
    if !publisher.is_connected() {
        anyhow::bail!("broker connection is not open");
    }

    Ok(())
}
