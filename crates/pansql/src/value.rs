//! Argument and column values.
//!
//! [`Value`] is what a [`Statement`](crate::Statement) collects as positional
//! arguments and what a [`ScanTarget`](crate::ScanTarget) hands back for each
//! scanned column. [`FromValue`] converts a scanned value into a Rust type;
//! every `FromValue` type is also a [`ColumnSlot`], the destination a row is
//! scanned into.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A single SQL value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`
    #[default]
    Null,
    Bool(bool),
    /// Any integer column, widened to 64 bits
    Int(i64),
    /// Any floating point column, widened to 64 bits
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    /// JSON or JSONB document
    Json(serde_json::Value),
    Date(NaiveDate),
    /// Timestamp normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(bytes) => {
                f.write_str("\\x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Json(j) => write!(f, "{j}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),* => $conv:expr) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant($conv(v))
                }
            }
        )*
    };
}

value_from!(Bool: bool => std::convert::identity);
value_from!(Int: i8, i16, i32, i64, u8, u16, u32 => i64::from);
value_from!(Float: f32, f64 => f64::from);
value_from!(Text: String => std::convert::identity);
value_from!(Bytes: Vec<u8> => std::convert::identity);
value_from!(Uuid: Uuid => std::convert::identity);
value_from!(Json: serde_json::Value => std::convert::identity);
value_from!(Date: NaiveDate => std::convert::identity);
value_from!(Timestamp: DateTime<Utc> => std::convert::identity);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v.and_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a scanned [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! int_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|_| Error::conversion(stringify!($ty), "out-of-range integer")),
                        other => Err(Error::conversion(stringify!($ty), other.kind())),
                    }
                }
            }
        )*
    };
}

int_from_value!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            // MySQL reports BOOLEAN columns as TINYINT.
            Value::Int(i) => Ok(i != 0),
            other => Err(Error::conversion("bool", other.kind())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(Error::conversion("f64", other.kind())),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value)
            .map(|x| x as f32)
            .map_err(|e| match e {
                Error::Conversion { found, .. } => Error::conversion("f32", found),
                other => other,
            })
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(Error::conversion("String", other.kind())),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(Error::conversion("Vec<u8>", other.kind())),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => Uuid::parse_str(&s).map_err(|e| Error::decode("uuid", e.to_string())),
            other => Err(Error::conversion("Uuid", other.kind())),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Text(s) => serde_json::from_str(&s).map_err(|e| Error::decode("json", e.to_string())),
            other => Err(Error::conversion("serde_json::Value", other.kind())),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(Error::conversion("NaiveDate", other.kind())),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            other => Err(Error::conversion("DateTime<Utc>", other.kind())),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok(ts.naive_utc()),
            other => Err(Error::conversion("NaiveDateTime", other.kind())),
        }
    }
}

/// A destination a scanned column value is written into.
///
/// Implemented for every [`FromValue`] type, so `&mut field` of a record can be
/// handed to [`ScanTarget::scan_into`](crate::ScanTarget::scan_into) directly.
pub trait ColumnSlot {
    fn assign(&mut self, value: Value) -> Result<()>;
}

impl<T: FromValue> ColumnSlot for T {
    fn assign(&mut self, value: Value) -> Result<()> {
        *self = T::from_value(value)?;
        Ok(())
    }
}
