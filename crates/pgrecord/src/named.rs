//! Named placeholder translation.
//!
//! Statements produced by the entity layer use `:name` placeholders, while
//! PostgreSQL expects positional `$1, $2, ...`. [`NamedSql::parse`] rewrites
//! the text once and remembers which name sits at which position; repeated
//! names share one position.
//!
//! Quoted literals, quoted identifiers, comments and `::` casts are copied
//! through untouched.

use crate::error::{OrmError, OrmResult};
use crate::params::Params;
use tokio_postgres::types::ToSql;

/// A statement rewritten to positional placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSql {
    sql: String,
    /// Placeholder names (with marker) by position; `names[0]` is `$1`.
    names: Vec<String>,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl NamedSql {
    /// Rewrite `:name` placeholders into `$n`.
    pub fn parse(sql: &str) -> Self {
        let chars: Vec<char> = sql.chars().collect();
        let mut out = String::with_capacity(sql.len());
        let mut names: Vec<String> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' => {
                    // Copy through the closing quote; a doubled quote is an escape.
                    out.push(c);
                    i += 1;
                    while i < chars.len() {
                        out.push(chars[i]);
                        if chars[i] == c {
                            if i + 1 < chars.len() && chars[i + 1] == c {
                                out.push(c);
                                i += 2;
                                continue;
                            }
                            i += 1;
                            break;
                        }
                        i += 1;
                    }
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    while i < chars.len() && chars[i] != '\n' {
                        out.push(chars[i]);
                        i += 1;
                    }
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    out.push_str("/*");
                    i += 2;
                    while i < chars.len() {
                        if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                            out.push_str("*/");
                            i += 2;
                            break;
                        }
                        out.push(chars[i]);
                        i += 1;
                    }
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    out.push_str("::");
                    i += 2;
                }
                ':' if chars.get(i + 1).copied().is_some_and(is_name_start) => {
                    let start = i;
                    i += 1;
                    while i < chars.len() && is_name_char(chars[i]) {
                        i += 1;
                    }
                    let name: String = chars[start..i].iter().collect();
                    let position = match names.iter().position(|n| *n == name) {
                        Some(pos) => pos + 1,
                        None => {
                            names.push(name);
                            names.len()
                        }
                    };
                    out.push('$');
                    out.push_str(&position.to_string());
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        Self { sql: out, names }
    }

    /// The rewritten statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in positional order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve positional arguments from `params`.
    ///
    /// Fails when a placeholder has no bound value or a bound value is not
    /// referenced by the statement.
    pub fn bind<'p>(&self, params: &'p Params) -> OrmResult<Vec<&'p (dyn ToSql + Sync)>> {
        if let Some(unused) = params.names().find(|name| !self.names.iter().any(|n| n == name)) {
            return Err(OrmError::validation(format!(
                "parameter '{}' is not referenced by the statement",
                unused
            )));
        }

        self.names
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .map(|v| v as &(dyn ToSql + Sync))
                    .ok_or_else(|| {
                        OrmError::validation(format!("no value bound for placeholder '{}'", name))
                    })
            })
            .collect()
    }
}
