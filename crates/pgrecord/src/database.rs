//! Pooled PostgreSQL implementation of [`DataAccess`].

use crate::client::{DataAccess, execute, insert, select};
use crate::config::{DbConfig, Recycling};
use crate::error::{OrmError, OrmResult};
use crate::params::Params;
use crate::row::Record;
use crate::value::Value;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::NoTls;

/// A pooled database handle.
///
/// Create it once at startup with [`PgDatabase::connect`], pass it by
/// reference to entity operations and call [`PgDatabase::close`] on shutdown.
/// Cloning is cheap and shares the pool.
///
/// # Example
///
/// ```ignore
/// let db = pgrecord::PgDatabase::connect(&pgrecord::DbConfig::from_env()?)?;
/// let user = User::find(&db, Filter::key(1)).first().await?;
/// db.close();
/// ```
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool,
    query_timeout: Option<Duration>,
}

impl std::fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDatabase")
            .field("status", &self.pool.status())
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Build a connection pool from configuration. Connections open lazily.
pub fn create_pool(config: &DbConfig) -> OrmResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: match config.recycling {
            Recycling::Fast => RecyclingMethod::Fast,
            Recycling::Verified => RecyclingMethod::Verified,
        },
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.max_size)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))
}

impl PgDatabase {
    /// Create the pool described by `config`.
    pub fn connect(config: &DbConfig) -> OrmResult<Self> {
        let pool = create_pool(config)?;
        tracing::info!(
            target: "pgrecord.db",
            max_size = config.max_size,
            query_timeout_ms = ?config.query_timeout_ms,
            "database pool created"
        );
        Ok(Self {
            pool,
            query_timeout: config.timeout(),
        })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self {
            pool,
            query_timeout: None,
        }
    }

    /// Close the pool. Later operations fail with [`OrmError::Pool`].
    pub fn close(&self) {
        self.pool.close();
        tracing::info!(target: "pgrecord.db", "database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// The underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn with_timeout<T, F>(&self, future: F) -> OrmResult<T>
    where
        F: std::future::Future<Output = OrmResult<T>> + Send,
    {
        match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| OrmError::Timeout(timeout))?,
            None => future.await,
        }
    }
}

impl DataAccess for PgDatabase {
    async fn execute_select(&self, sql: &str, params: &Params) -> OrmResult<Vec<Record>> {
        self.with_timeout(async {
            let client = self.pool.get().await?;
            select(&client, sql, params).await
        })
        .await
    }

    async fn execute_insert(&self, sql: &str, params: &Params) -> OrmResult<Value> {
        // `lastval()` is per session, so both statements need the same connection.
        self.with_timeout(async {
            let client = self.pool.get().await?;
            insert(&client, sql, params).await
        })
        .await
    }

    async fn execute_update(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        self.with_timeout(async {
            let client = self.pool.get().await?;
            execute(&client, sql, params).await
        })
        .await
    }
}
