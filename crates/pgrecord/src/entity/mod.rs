//! Active-record style entity layer.
//!
//! A [`Model`] names its [`Schema`]; its static operations create an
//! [`Entity`], which owns one [`QueryBuilder`](crate::qb::QueryBuilder) and a
//! placeholder map for the values its filters bind.
//!
//! ```ignore
//! use pgrecord::{Filter, Model, Schema};
//!
//! static USERS: Schema = Schema::new("users");
//!
//! struct User;
//!
//! impl Model for User {
//!     fn schema() -> &'static Schema {
//!         &USERS
//!     }
//! }
//!
//! // SELECT * FROM users WHERE status=:status AND age>:age ORDER BY id LIMIT 20
//! let rows = User::filter(&db, Filter::eq("status", "active"))
//!     .and(Filter::op("age", ">", 18))
//!     .order_by(["id"])
//!     .take(20)
//!     .fetch(&[])
//!     .await?;
//!
//! let id = User::store(&db, [("name", "alice"), ("email", "alice@example.com")]).await?;
//! let alice = User::find(&db, Filter::key(id)).first().await?;
//! ```

mod filter;
mod instance;
mod relations;
mod schema;

pub use filter::Filter;
pub use instance::Entity;
pub use schema::{Relation, RelationKind, Schema, pivot_table};

use crate::client::DataAccess;
use crate::error::OrmResult;
use crate::row::Record;
use crate::value::Value;

/// A table-backed model with static finder and mutator operations.
pub trait Model {
    fn schema() -> &'static Schema;

    /// Entity filtered by `filter`; reads best for key lookups.
    fn find<D: DataAccess>(db: &D, filter: Filter) -> Entity<'_, D> {
        Entity::new(db, Self::schema()).filter(filter)
    }

    /// Entity filtered by `filter`.
    fn filter<D: DataAccess>(db: &D, filter: Filter) -> Entity<'_, D> {
        Entity::new(db, Self::schema()).filter(filter)
    }

    /// Unfiltered entity.
    fn all<D: DataAccess>(db: &D) -> Entity<'_, D> {
        Entity::new(db, Self::schema())
    }

    /// INSERT one row and return its generated key.
    fn store<D, I, K, V>(db: &D, attrs: I) -> impl std::future::Future<Output = OrmResult<Value>> + Send
    where
        D: DataAccess,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut entity = Entity::new(db, Self::schema());
        for (name, value) in attrs {
            entity.set_attribute(name.as_ref(), value);
        }
        async move { entity.save().await.map(SaveResult::into_value) }
    }

    /// Number of rows matching `filter` (all rows when `None`).
    fn count<D: DataAccess>(
        db: &D,
        filter: Option<Filter>,
    ) -> impl std::future::Future<Output = OrmResult<i64>> + Send {
        let mut entity = Entity::new(db, Self::schema());
        if let Some(filter) = filter {
            entity = entity.filter(filter);
        }
        async move { entity.count().await }
    }

    /// Whether any row matches `filter`.
    fn exists<D: DataAccess>(
        db: &D,
        filter: Option<Filter>,
    ) -> impl std::future::Future<Output = OrmResult<bool>> + Send {
        let count = Self::count(db, filter);
        async move { Ok(count.await? > 0) }
    }

    /// Whether the table has no rows.
    fn empty<D: DataAccess>(db: &D) -> impl std::future::Future<Output = OrmResult<bool>> + Send {
        let exists = Self::exists(db, None);
        async move { Ok(!exists.await?) }
    }
}

/// Result of [`Entity::get`].
pub enum Fetched<'a, D: DataAccess> {
    /// Raw rows.
    Rows(Vec<Record>),
    /// Zero or one materialized entity, for single-result relations.
    One(Option<Entity<'a, D>>),
}

impl<D: DataAccess> std::fmt::Debug for Fetched<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fetched::Rows(rows) => f.debug_tuple("Rows").field(rows).finish(),
            Fetched::One(entity) => f.debug_tuple("One").field(entity).finish(),
        }
    }
}

impl<'a, D: DataAccess> Fetched<'a, D> {
    /// Rows regardless of shape.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Fetched::Rows(rows) => rows,
            Fetched::One(entity) => entity.and_then(Entity::into_data).into_iter().collect(),
        }
    }

    /// The single entity; `None` for raw rows.
    pub fn into_one(self) -> Option<Entity<'a, D>> {
        match self {
            Fetched::One(entity) => entity,
            Fetched::Rows(_) => None,
        }
    }
}

/// Result of [`Entity::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveResult {
    /// INSERT with the generated key.
    Inserted(Value),
    /// UPDATE with the affected row count.
    Updated(u64),
}

impl SaveResult {
    /// Generated key for inserts, affected count for updates.
    pub fn into_value(self) -> Value {
        match self {
            SaveResult::Inserted(id) => id,
            SaveResult::Updated(count) => Value::Int(count as i64),
        }
    }
}

/// Result of [`Entity::get_attribute`].
pub enum Attribute<'a, D: DataAccess> {
    Value(Value),
    Related(Entity<'a, D>),
}

impl<D: DataAccess> std::fmt::Debug for Attribute<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Attribute::Related(entity) => f.debug_tuple("Related").field(entity).finish(),
        }
    }
}

impl<'a, D: DataAccess> Attribute<'a, D> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attribute::Value(v) => Some(v),
            Attribute::Related(_) => None,
        }
    }

    pub fn into_related(self) -> Option<Entity<'a, D>> {
        match self {
            Attribute::Related(entity) => Some(entity),
            Attribute::Value(_) => None,
        }
    }
}
