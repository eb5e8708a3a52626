//! Statement rendering.

use super::{QueryBuilder, UNBOUNDED_LIMIT};
use crate::error::{OrmError, OrmResult};

/// Join non-empty fragments with single spaces.
fn join_parts(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl QueryBuilder {
    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.render())
        }
    }

    fn limit_clause(&self) -> String {
        if self.offset == 0 && self.limit == UNBOUNDED_LIMIT {
            return String::new();
        }
        let limit = if self.limit == UNBOUNDED_LIMIT {
            "ALL".to_string()
        } else {
            self.limit.to_string()
        };
        if self.offset == 0 {
            format!("LIMIT {}", limit)
        } else {
            format!("LIMIT {} OFFSET {}", limit, self.offset)
        }
    }

    fn check_arity(&self) -> OrmResult<()> {
        if self.columns.len() != self.values.len() {
            return Err(OrmError::arity_mismatch(
                self.columns.len(),
                self.values.len(),
            ));
        }
        Ok(())
    }

    /// `SELECT cols FROM t [joins] [WHERE c] [GROUP BY g] [HAVING c] [ORDER BY o] [LIMIT n [OFFSET m]]`
    ///
    /// Conditions go to HAVING instead of WHERE once grouping is set.
    pub(super) fn render_select(&self) -> String {
        let grouped = !self.group_by.is_empty();
        let mut parts = vec![
            format!("SELECT {} FROM {}", self.columns.join(","), self.table),
            self.joins.join(" "),
        ];
        if !grouped {
            parts.push(self.where_clause());
        } else {
            parts.push(format!("GROUP BY {}", self.group_by.join(",")));
            if !self.conditions.is_empty() {
                parts.push(format!("HAVING {}", self.conditions.render()));
            }
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by.join(",")));
        }
        parts.push(self.limit_clause());
        join_parts(parts)
    }

    /// `INSERT INTO t (a,b) values (:a,:b)`
    pub(super) fn render_insert(&self) -> OrmResult<String> {
        self.check_arity()?;
        Ok(format!(
            "INSERT INTO {} ({}) values ({})",
            self.table,
            self.columns.join(","),
            self.values.join(",")
        ))
    }

    /// `UPDATE t SET a=:a,b=:b [WHERE c]`
    pub(super) fn render_update(&self) -> OrmResult<String> {
        self.check_arity()?;
        let assignments = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(col, val)| format!("{}={}", col, val))
            .collect::<Vec<_>>()
            .join(",");
        Ok(join_parts(vec![
            format!("UPDATE {} SET {}", self.table, assignments),
            self.where_clause(),
        ]))
    }

    /// `DELETE FROM t [WHERE c]`
    pub(super) fn render_delete(&self) -> String {
        join_parts(vec![
            format!("DELETE FROM {}", self.table),
            self.where_clause(),
        ])
    }
}
