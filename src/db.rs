use sqlx::PgPool;
use tracing::info;

use crate::storage::{StorageError, StorageResult};

struct Migration {
    version: u32,
    sql: &'static str,
}

// Versions must stay strictly increasing.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("../migrations/0001_init.sql"),
}];

#[cfg(test)]
fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

pub async fn init_db(database_url: &str) -> StorageResult<PgPool> {
    let pool = PgPool::connect(database_url).await?;
    apply_migrations(&pool).await?;
    Ok(pool)
}

/// Applies every migration newer than the recorded schema version.
pub async fn apply_migrations(pool: &PgPool) -> StorageResult<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(pool)
        .await?;
    let current = current as u32;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|source| StorageError::Migration {
                version: migration.version,
                source,
            })?;
        sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
            .bind(migration.version as i32)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(version = migration.version, "Applied schema migration");
    }

    Ok(())
}
