//! Fluent query builder.
//!
//! [`QueryBuilder`] accumulates clause fragments (columns, table, joins,
//! conditions, grouping, ordering, pagination and value placeholders) and
//! renders one of four statement shapes on demand. Values never appear in the
//! rendered text: callers pass placeholders (`:name`) and bind the values
//! separately.
//!
//! # Usage
//!
//! ```ignore
//! use pgrecord::qb::{Chain, Operation, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! let sql = qb
//!     .set_operation(Operation::Select)
//!     .set_table("users")
//!     .add_condition("status", ":status")
//!     .set_chain(Chain::And)
//!     .add_condition_op("age", ">", ":age")
//!     .set_order_by(["created_at DESC"])
//!     .render()?;
//!
//! assert_eq!(sql, "SELECT * FROM users WHERE status=:status AND age>:age ORDER BY created_at DESC");
//! ```
//!
//! A successful [`QueryBuilder::render`] resets every clause except the
//! operation and table, so one builder can serve a whole sequence of queries.

mod condition;
mod operation;
mod render;

pub use condition::Chain;
pub use operation::Operation;

use crate::error::OrmResult;
use condition::Conditions;

/// Limit value meaning "no limit".
pub const UNBOUNDED_LIMIT: u64 = u64::MAX;

/// Clause accumulator for a single query lifecycle.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    /// Lowercased operation tag, validated at render time
    operation: String,
    /// Target table
    table: String,
    /// Projection or INSERT/UPDATE target columns (default ["*"])
    columns: Vec<String>,
    /// JOIN fragments
    joins: Vec<String>,
    /// WHERE or HAVING terms
    conditions: Conditions,
    /// Pending chain for the next condition
    chain: Option<Chain>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    offset: u64,
    limit: u64,
    /// Value placeholders, parallel to `columns`
    values: Vec<String>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            operation: String::new(),
            table: String::new(),
            columns: vec!["*".to_string()],
            joins: Vec::new(),
            conditions: Conditions::default(),
            chain: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: UNBOUNDED_LIMIT,
            values: Vec::new(),
        }
    }
}

impl QueryBuilder {
    /// Create an empty builder with no operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation tag (stored lowercased).
    pub fn set_operation(&mut self, op: impl AsRef<str>) -> &mut Self {
        self.operation = op.as_ref().to_lowercase();
        self
    }

    pub fn set_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    /// Replace the column list.
    pub fn set_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Current column list.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append a JOIN fragment, e.g. `INNER JOIN tags ON tags.id = post_tag.tag_id`.
    pub fn add_join(&mut self, join: impl Into<String>) -> &mut Self {
        self.joins.push(join.into());
        self
    }

    pub fn set_group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_order_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.offset = offset;
        self
    }

    /// Replace the value placeholders used by INSERT/UPDATE.
    pub fn set_values<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the keyword that joins the next condition to the previous ones.
    pub fn set_chain(&mut self, chain: Chain) -> &mut Self {
        self.chain = Some(chain);
        self
    }

    /// Pending chain keyword, if any.
    pub fn chain(&self) -> Option<Chain> {
        self.chain
    }

    /// Add `column=value`.
    ///
    /// See [`QueryBuilder::add_condition_op`] for the chaining rules.
    pub fn add_condition(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add_condition_op(column, "=", value)
    }

    /// Add `column<operator>value`.
    ///
    /// With a pending chain the condition is appended and the chain is
    /// consumed. Without one it replaces every condition accumulated so far.
    /// A chain set before the first condition is ignored.
    pub fn add_condition_op(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let column = column.into();
        let discarded = self.conditions.push(
            self.chain.take(),
            column.clone(),
            operator.into(),
            value.into(),
        );
        if discarded > 0 {
            tracing::debug!(
                target: "pgrecord.sql",
                column = %column,
                discarded,
                "unchained condition replaced previous conditions"
            );
        }
        self
    }

    /// Whether any condition has been added since the last reset.
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Render the statement for the current operation and reset clause state.
    ///
    /// # Errors
    ///
    /// - [`OrmError::UnsupportedOperation`](crate::OrmError::UnsupportedOperation)
    ///   when the operation is unset or unknown.
    /// - [`OrmError::ArityMismatch`](crate::OrmError::ArityMismatch) when
    ///   INSERT/UPDATE columns and values differ in length.
    ///
    /// On error the accumulated state is left untouched.
    pub fn render(&mut self) -> OrmResult<String> {
        let operation: Operation = self.operation.parse()?;
        let sql = match operation {
            Operation::Select => self.render_select(),
            Operation::Insert => self.render_insert()?,
            Operation::Update => self.render_update()?,
            Operation::Delete => self.render_delete(),
        };

        tracing::debug!(
            target: "pgrecord.sql",
            operation = %operation,
            table = %self.table,
            sql = %sql,
            "rendered query"
        );

        self.reset();
        Ok(sql)
    }

    /// Reset every clause to its default, keeping operation and table.
    pub fn reset(&mut self) {
        self.columns = vec!["*".to_string()];
        self.joins.clear();
        self.conditions.clear();
        self.chain = None;
        self.group_by.clear();
        self.order_by.clear();
        self.offset = 0;
        self.limit = UNBOUNDED_LIMIT;
        self.values.clear();
    }
}

#[cfg(test)]
mod tests;
