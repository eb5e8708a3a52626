//! # pgrecord
//!
//! A small active-record layer for Postgres.
//!
//! ## Features
//!
//! - **Fluent query builder**: clause accumulation with AND/OR chaining, WHERE
//!   or HAVING selection and a reset after every render
//! - **Named placeholders**: values never appear in SQL text; every filter
//!   binds `:column` and the driver rewrites to `$n` at execution time
//! - **Entities**: static finders (`find`, `filter`, `store`, `count`,
//!   `exists`, `empty`) and instance operations (`get`, `first`, `save`, `set`,
//!   `update(..).with(..)`, `destroy`)
//! - **Relations**: has-many, has-one, belongs-to and many-to-many through a
//!   pivot table
//! - **Pluggable data access**: anything implementing [`DataAccess`]; a pooled
//!   Postgres implementation ships behind the `pool` feature
//!
//! ## Entities
//!
//! ```ignore
//! use pgrecord::{DbConfig, Filter, Model, PgDatabase, Schema};
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
//! let db = PgDatabase::connect(&DbConfig::from_env()?)?;
//!
//! let id = User::store(&db, [("name", "alice")]).await?;
//! let mut alice = User::find(&db, Filter::key(id)).first().await?.unwrap();
//! alice.set_attribute("name", "alice b.");
//! alice.save().await?;
//!
//! let adults = User::filter(&db, Filter::op("age", ">=", 18))
//!     .and(Filter::eq("status", "active"))
//!     .skip(10)
//!     .take(5)
//!     .rows(&["name"])
//!     .await?;
//! ```
//!
//! ## Logging
//!
//! Rendered statements are emitted at `debug` level under the `pgrecord.sql`
//! target; pool lifecycle and executed statements under `pgrecord.db`.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod named;
pub mod params;
pub mod qb;
pub mod row;
pub mod value;

pub use client::DataAccess;
pub use config::{DbConfig, Recycling};
pub use entity::{
    Attribute, Entity, Fetched, Filter, Model, Relation, RelationKind, SaveResult, Schema,
    pivot_table,
};
pub use error::{OrmError, OrmResult};
pub use named::NamedSql;
pub use params::{Params, placeholder};
pub use qb::{Chain, Operation, QueryBuilder};
pub use row::{FromRecord, Record};
pub use value::{FromValue, Value};

#[cfg(feature = "pool")]
pub mod database;

#[cfg(feature = "pool")]
pub use database::{PgDatabase, create_pool};
