use crate::value::Value;

/// One filter condition, in one of three shapes.
///
/// ```ignore
/// Filter::key(7)                  // <filter_column>=:<filter_column>
/// Filter::eq("email", "a@b.c")    // email=:email
/// Filter::op("age", ">=", 18)     // age>=:age
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality on the schema's default filter column.
    Key(Value),
    /// Equality on a named column.
    Eq(String, Value),
    /// Explicit operator on a named column.
    Op(String, String, Value),
}

impl Filter {
    pub fn key(value: impl Into<Value>) -> Self {
        Filter::Key(value.into())
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn op(column: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Op(column.into(), operator.into(), value.into())
    }

    /// Split into `(column, operator, value)`.
    pub(crate) fn into_parts(self, default_column: &str) -> (String, String, Value) {
        match self {
            Filter::Key(value) => (default_column.to_string(), "=".to_string(), value),
            Filter::Eq(column, value) => (column, "=".to_string(), value),
            Filter::Op(column, operator, value) => (column, operator, value),
        }
    }
}
