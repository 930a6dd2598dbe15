use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Builds the shared connection pool. The pool connects lazily so the
/// server can come up (and report degraded health) before the database is
/// reachable.
pub fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(&config.url)?;
    info!("configured database pool (max_connections={})", config.max_connections);
    Ok(pool)
}

/// Applies pending migrations. Failures are reported to the caller; at
/// startup they are logged and tolerated so a missing database does not
/// prevent the process from serving its health endpoint.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}

pub async fn migrate_best_effort(pool: &PgPool) {
    if let Err(e) = migrate(pool).await {
        warn!("skipping migrations, database unavailable: {}", e);
    }
}

/// Pings the pool to confirm connectivity.
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
