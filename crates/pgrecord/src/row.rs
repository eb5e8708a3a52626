//! Fetched rows and row mapping traits

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// A fetched row with named field access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Get a field by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    /// Get a field converted to `T`.
    ///
    /// A missing column is a decode error; a present NULL decodes into `Option<T>`.
    pub fn try_get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))?;
        T::from_value(column, value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode a `tokio_postgres` row into a record.
    pub fn from_pg_row(row: &Row) -> OrmResult<Self> {
        let mut record = Record::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let name = column.name();
            let value = decode_column(row, idx, name, column.type_())?;
            record.fields.push((name.to_string(), value));
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

fn get_opt<'a, T>(row: &'a Row, idx: usize, name: &str) -> OrmResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| OrmError::decode(name, e.to_string()))
}

fn decode_column(row: &Row, idx: usize, name: &str, ty: &Type) -> OrmResult<Value> {
    let value = if *ty == Type::BOOL {
        get_opt::<bool>(row, idx, name)?.into()
    } else if *ty == Type::INT2 {
        get_opt::<i16>(row, idx, name)?.into()
    } else if *ty == Type::INT4 {
        get_opt::<i32>(row, idx, name)?.into()
    } else if *ty == Type::INT8 {
        get_opt::<i64>(row, idx, name)?.into()
    } else if *ty == Type::OID {
        get_opt::<u32>(row, idx, name)?.into()
    } else if *ty == Type::FLOAT4 {
        get_opt::<f32>(row, idx, name)?.into()
    } else if *ty == Type::FLOAT8 {
        get_opt::<f64>(row, idx, name)?.into()
    } else if *ty == Type::BYTEA {
        get_opt::<Vec<u8>>(row, idx, name)?.into()
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get_opt::<serde_json::Value>(row, idx, name)?.into()
    } else if *ty == Type::UUID {
        get_opt::<uuid::Uuid>(row, idx, name)?.into()
    } else if *ty == Type::DATE {
        get_opt::<NaiveDate>(row, idx, name)?.into()
    } else if *ty == Type::TIMESTAMP {
        get_opt::<NaiveDateTime>(row, idx, name)?.into()
    } else if *ty == Type::TIMESTAMPTZ {
        get_opt::<DateTime<Utc>>(row, idx, name)?.into()
    } else {
        // text, varchar, bpchar, name, citext and anything else with a text form
        get_opt::<String>(row, idx, name)?.into()
    };
    Ok(value)
}

/// Trait for converting a fetched record into a Rust struct.
///
/// # Example
///
/// ```ignore
/// use pgrecord::{FromRecord, OrmResult, Record};
///
/// struct User {
///     id: i64,
///     username: String,
///     email: Option<String>,
/// }
///
/// impl FromRecord for User {
///     fn from_record(record: &Record) -> OrmResult<Self> {
///         Ok(Self {
///             id: record.try_get("id")?,
///             username: record.try_get("username")?,
///             email: record.try_get("email")?,
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> OrmResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> OrmResult<Self> {
        Ok(record.clone())
    }
}
