//! Dynamically typed column values.
//!
//! Bound parameters and fetched fields both travel as [`Value`], so the entity
//! layer can keep them in maps keyed by placeholder or column name.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A single SQL value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Value {
    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view (accepts integral floats).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::TimestampTz(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            // The server infers parameter types from the statement, so integers
            // are narrowed or widened to whatever the column expects. Every arm
            // goes through `to_sql_checked` so a mismatch fails as `WrongType`.
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::OID {
                    u32::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql_checked(ty, out)
                } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
                    v.to_string().to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => {
                if *ty == Type::JSON || *ty == Type::JSONB {
                    serde_json::from_str::<serde_json::Value>(v)?.to_sql_checked(ty, out)
                } else if *ty == Type::UUID {
                    uuid::Uuid::parse_str(v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::TimestampTz(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Conversion from a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// Convert `value` read from `column`.
    fn from_value(column: &str, value: &Value) -> OrmResult<Self>;
}

fn mismatch(column: &str, expected: &str, value: &Value) -> OrmError {
    OrmError::decode(
        column,
        format!("expected {}, found {}", expected, value.kind()),
    )
}

impl FromValue for Value {
    fn from_value(_column: &str, value: &Value) -> OrmResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

impl FromValue for i64 {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        value
            .as_i64()
            .ok_or_else(|| mismatch(column, "int", value))
    }
}

impl FromValue for i32 {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        let v = i64::from_value(column, value)?;
        i32::try_from(v).map_err(|e| OrmError::decode(column, e.to_string()))
    }
}

impl FromValue for f64 {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        value
            .as_f64()
            .ok_or_else(|| mismatch(column, "float", value))
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(column, "bool", value))
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Bytes(v) => Ok(v.clone()),
            other => Err(mismatch(column, "bytes", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            other => Err(mismatch(column, "json", other)),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Uuid(v) => Ok(*v),
            Value::Text(v) => {
                uuid::Uuid::parse_str(v).map_err(|e| OrmError::decode(column, e.to_string()))
            }
            other => Err(mismatch(column, "uuid", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Date(v) => Ok(*v),
            other => Err(mismatch(column, "date", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::TimestampTz(v) => Ok(*v),
            other => Err(mismatch(column, "timestamptz", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn integral_float_reads_as_int() {
        assert_eq!(i64::from_value("n", &Value::Float(3.0)).unwrap(), 3);
        assert!(i64::from_value("n", &Value::Float(3.5)).is_err());
    }

    #[test]
    fn decode_mismatch_names_column() {
        let err = String::from_value("name", &Value::Int(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'name': expected text, found int"
        );
    }

    #[test]
    fn option_reads_null_as_none() {
        let v: Option<i64> = FromValue::from_value("n", &Value::Null).unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn int_binds_to_int4_column() {
        let mut out = BytesMut::new();
        let res = Value::Int(7).to_sql(&Type::INT4, &mut out).unwrap();
        assert!(matches!(res, IsNull::No));
        assert_eq!(&out[..], &7i32.to_be_bytes());
    }

    #[test]
    fn int_overflowing_int2_is_rejected() {
        let mut out = BytesMut::new();
        assert!(Value::Int(70_000).to_sql(&Type::INT2, &mut out).is_err());
    }

    #[test]
    fn text_is_rejected_for_int4_column() {
        let mut out = BytesMut::new();
        let err = Value::Text("1234".into())
            .to_sql(&Type::INT4, &mut out)
            .err().unwrap();
        assert!(err.is::<tokio_postgres::types::WrongType>());
        assert!(out.is_empty());
    }

    #[test]
    fn int_is_rejected_for_numeric_column() {
        let mut out = BytesMut::new();
        let err = Value::Int(5).to_sql(&Type::NUMERIC, &mut out).err().unwrap();
        assert!(err.is::<tokio_postgres::types::WrongType>());
        assert!(out.is_empty());
    }

    #[test]
    fn bool_is_rejected_for_int8_column() {
        let mut out = BytesMut::new();
        assert!(Value::Bool(true).to_sql(&Type::INT8, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn text_binds_to_uuid_and_varchar_columns() {
        let mut out = BytesMut::new();
        let id = uuid::Uuid::new_v4();
        Value::Text(id.to_string())
            .to_sql(&Type::UUID, &mut out)
            .unwrap();
        assert_eq!(&out[..], id.as_bytes());

        let mut out = BytesMut::new();
        Value::Text("abc".into())
            .to_sql(&Type::VARCHAR, &mut out)
            .unwrap();
        assert_eq!(&out[..], b"abc");
    }
}
