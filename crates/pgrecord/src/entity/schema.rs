//! Static table descriptions and relation registry.

/// How a related table points back at its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `related.foreign_key = self.id`, many rows.
    HasMany { foreign_key: &'static str },
    /// `related.foreign_key = self.id`, zero or one row.
    HasOne { foreign_key: &'static str },
    /// `related.id = self.foreign_key`, zero or one row.
    BelongsTo { foreign_key: &'static str },
    /// Through a pivot table named after both tables:
    /// `pivot.foreign_key = self.id`, `pivot.related_key = related.id`.
    BelongsToMany {
        foreign_key: &'static str,
        related_key: &'static str,
    },
}

/// A named relation, resolvable through
/// [`Entity::get_attribute`](super::Entity::get_attribute).
#[derive(Debug)]
pub struct Relation {
    pub name: &'static str,
    pub kind: RelationKind,
    pub related: &'static Schema,
}

/// Table, keys and relations of a model.
///
/// Schemas are plain statics so relations can point at each other:
///
/// ```ignore
/// static USERS: Schema = Schema::new("users").with_relations(&[Relation {
///     name: "posts",
///     kind: RelationKind::HasMany { foreign_key: "user_id" },
///     related: &POSTS,
/// }]);
/// static POSTS: Schema = Schema::new("posts").with_relations(&[Relation {
///     name: "author",
///     kind: RelationKind::BelongsTo { foreign_key: "user_id" },
///     related: &USERS,
/// }]);
/// ```
#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    pub primary_key: &'static str,
    /// Column used by [`Filter::Key`](super::Filter::Key).
    pub filter_column: &'static str,
    pub relations: &'static [Relation],
}

impl Schema {
    /// Schema keyed and filtered by `id`.
    pub const fn new(table: &'static str) -> Self {
        Self {
            table,
            primary_key: "id",
            filter_column: "id",
            relations: &[],
        }
    }

    /// Set the primary key; the default filter column follows it.
    pub const fn with_primary_key(self, primary_key: &'static str) -> Self {
        Self {
            primary_key,
            filter_column: primary_key,
            ..self
        }
    }

    pub const fn with_filter_column(self, filter_column: &'static str) -> Self {
        Self {
            filter_column,
            ..self
        }
    }

    pub const fn with_relations(self, relations: &'static [Relation]) -> Self {
        Self { relations, ..self }
    }

    /// Look up a registered relation.
    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Pivot table for a many-to-many relation: both table names, sorted, joined by `_`.
pub fn pivot_table(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}
