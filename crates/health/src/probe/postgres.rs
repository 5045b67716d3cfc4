//! PostgreSQL database probe.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::Database;
use crate::error::Result;

/// Connections kept by a probe-only pool.
const PROBE_POOL_SIZE: u32 = 2;

/// PostgreSQL-backed database probe.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Wraps an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a probe whose pool connects on first use.
    ///
    /// Only the URL is validated here, so the service can start while the
    /// database is still down and report it as unhealthy.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(PROBE_POOL_SIZE)
            .connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn execute(&self, query: &str) -> Result<bool> {
        let row = sqlx::query(query).fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }
}
