//! Relationship traversal.
//!
//! Each helper returns a new [`Entity`] for the related schema, filtered by
//! the owning entity's key or foreign key. Nothing is queried until a
//! terminal operation runs on the returned entity.

use super::{Entity, Filter, RelationKind, Schema, pivot_table};
use crate::client::DataAccess;
use crate::value::Value;

impl<'a, D: DataAccess> Entity<'a, D> {
    /// Rows of `related` whose `foreign_key` equals this entity's key.
    pub fn has_many(&self, related: &'static Schema, foreign_key: &str) -> Entity<'a, D> {
        Entity::new(self.db(), related).filter(Filter::eq(foreign_key, self.key_value()))
    }

    /// Like [`has_many`](Entity::has_many), materializing zero or one entity.
    pub fn has_one(&self, related: &'static Schema, foreign_key: &str) -> Entity<'a, D> {
        self.has_many(related, foreign_key).expect_one()
    }

    /// The `related` row whose key equals this entity's `foreign_key` column.
    pub fn belongs_to(&self, related: &'static Schema, foreign_key: &str) -> Entity<'a, D> {
        let value = self
            .data()
            .and_then(|row| row.get(foreign_key))
            .or_else(|| self.input().get(&crate::params::placeholder(foreign_key)))
            .cloned()
            .unwrap_or_default();
        Entity::new(self.db(), related)
            .filter(Filter::eq(related.primary_key, value))
            .expect_one()
    }

    /// Rows of `related` linked through the pivot table.
    ///
    /// ```sql
    /// SELECT * FROM roles_users INNER JOIN roles ON roles.id = roles_users.role_id
    /// WHERE roles_users.user_id=:roles_users_user_id
    /// ```
    pub fn belongs_to_many(
        &self,
        related: &'static Schema,
        foreign_key: &str,
        related_key: &str,
    ) -> Entity<'a, D> {
        let pivot = pivot_table(self.schema.table, related.table);
        let mut entity = Entity::new(self.db(), related);
        entity.qb.set_table(pivot.as_str());
        entity.table = pivot.clone();
        entity
            .join(format!(
                "INNER JOIN {table} ON {table}.{pk} = {pivot}.{related_key}",
                table = related.table,
                pk = related.primary_key,
            ))
            .filter(Filter::eq(format!("{}.{}", pivot, foreign_key), self.key_value()))
    }

    /// Resolve a relation registered on this entity's schema by name.
    pub fn related(&self, name: &str) -> Option<Entity<'a, D>> {
        let relation = self.schema.relation(name)?;
        let entity = match relation.kind {
            RelationKind::HasMany { foreign_key } => self.has_many(relation.related, foreign_key),
            RelationKind::HasOne { foreign_key } => self.has_one(relation.related, foreign_key),
            RelationKind::BelongsTo { foreign_key } => {
                self.belongs_to(relation.related, foreign_key)
            }
            RelationKind::BelongsToMany {
                foreign_key,
                related_key,
            } => self.belongs_to_many(relation.related, foreign_key, related_key),
        };
        Some(entity)
    }

    fn key_value(&self) -> Value {
        self.id().cloned().unwrap_or_default()
    }
}
