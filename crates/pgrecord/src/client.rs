//! Data-access trait consumed by the entity layer, and its implementation for
//! a single `tokio_postgres` connection.

use crate::error::{OrmError, OrmResult};
use crate::named::NamedSql;
use crate::params::Params;
use crate::row::Record;
use crate::value::Value;

/// SQLSTATE raised by `lastval()` when no sequence was used in the session.
const LASTVAL_NOT_YET_DEFINED: &str = "55000";

/// The four statement executions the entity layer needs.
///
/// `sql` carries named placeholders (`:name`) that must match the keys of
/// `params` exactly. Mismatches are the implementation's error to report.
/// Implementations must not retry: errors propagate unchanged.
pub trait DataAccess: Send + Sync {
    /// Execute a SELECT and return every row.
    fn execute_select(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send;

    /// Execute an INSERT and return the generated primary key.
    ///
    /// Returns [`Value::Null`] when the statement generated no key.
    fn execute_insert(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Value>> + Send;

    /// Execute an UPDATE and return the number of affected rows.
    fn execute_update(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Execute a DELETE and return the number of affected rows.
    ///
    /// The default implementation shares the UPDATE path.
    fn execute_delete(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        self.execute_update(sql, params)
    }
}

/// A single unpooled connection.
impl DataAccess for tokio_postgres::Client {
    async fn execute_select(&self, sql: &str, params: &Params) -> OrmResult<Vec<Record>> {
        select(self, sql, params).await
    }

    async fn execute_insert(&self, sql: &str, params: &Params) -> OrmResult<Value> {
        insert(self, sql, params).await
    }

    async fn execute_update(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        execute(self, sql, params).await
    }
}

pub(crate) async fn select(
    client: &tokio_postgres::Client,
    sql: &str,
    params: &Params,
) -> OrmResult<Vec<Record>> {
    let named = NamedSql::parse(sql);
    let args = named.bind(params)?;
    tracing::debug!(target: "pgrecord.db", sql = %named.sql(), param_count = args.len(), "select");
    let rows = client
        .query(named.sql(), &args)
        .await
        .map_err(OrmError::from_db_error)?;
    rows.iter().map(Record::from_pg_row).collect()
}

pub(crate) async fn execute(
    client: &tokio_postgres::Client,
    sql: &str,
    params: &Params,
) -> OrmResult<u64> {
    let named = NamedSql::parse(sql);
    let args = named.bind(params)?;
    tracing::debug!(target: "pgrecord.db", sql = %named.sql(), param_count = args.len(), "execute");
    client
        .execute(named.sql(), &args)
        .await
        .map_err(OrmError::from_db_error)
}

pub(crate) async fn insert(
    client: &tokio_postgres::Client,
    sql: &str,
    params: &Params,
) -> OrmResult<Value> {
    // `lastval()` is per session, so both statements run on `client`.
    execute(client, sql, params).await?;
    match client.query_one("SELECT lastval()", &[]).await {
        Ok(row) => {
            let id: i64 = row.try_get(0).map_err(|e| OrmError::decode("lastval", e.to_string()))?;
            Ok(Value::Int(id))
        }
        Err(e) if e.code().map(|c| c.code()) == Some(LASTVAL_NOT_YET_DEFINED) => Ok(Value::Null),
        Err(e) => Err(OrmError::from_db_error(e)),
    }
}
