//! Schema migrations, compiled into the binary from `/migrations`.
//!
//! Migrations are forward-only. Versions already recorded in
//! `_sqlx_migrations` are skipped, so applying is safe on every start.

use crate::error::BootError;
use sqlx::migrate::Migrator;
use tracing::info;

use super::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every pending migration. Returns how many were applied by this call.
pub async fn apply_pending(pool: &SqlitePool) -> Result<usize, BootError> {
    let before = applied_versions(pool).await?;
    MIGRATOR.run(pool).await?;
    let after = applied_versions(pool).await?;
    let applied = after.saturating_sub(before);
    info!(
        applied,
        known = MIGRATOR.iter().count(),
        "schema migrations up to date"
    );
    Ok(applied)
}

async fn applied_versions(pool: &SqlitePool) -> Result<usize, BootError> {
    let exists: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await?;
    if exists.is_none() {
        return Ok(0);
    }
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;
    Ok(usize::try_from(count).unwrap_or(0))
}
