//! `tokio-postgres` integration.
//!
//! - [`Value`] implements `ToSql`, so [`Statement::params_ref`] can be passed
//!   straight to `Client::query` together with [`Statement::postgres_sql`].
//! - `tokio_postgres::Row` implements [`ScanTarget`], so rows can be copied
//!   into records with [`copy_row_into`](crate::copy_row_into).

use crate::error::{Error, Result};
use crate::mapper::ScanTarget;
use crate::statement::Statement;
use crate::value::{ColumnSlot, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            // Integers are widened to i64; narrow them to the declared width.
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                _ => x.to_sql(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql(ty, out),
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
            Value::Uuid(u) => u.to_sql(ty, out),
            Value::Json(j) => j.to_sql(ty, out),
            Value::Date(d) => d.to_sql(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Accept all types; each variant delegates to its own ToSql impl.
        true
    }

    to_sql_checked!();
}

impl Statement {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args()
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

fn read_value(row: &Row, idx: usize) -> Result<Value> {
    let column = &row.columns()[idx];
    let decode = |e: tokio_postgres::Error| Error::decode(column.name(), e.to_string());

    let value = match *column.type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(decode)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map_err(decode)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map_err(decode)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(decode)?.map(Value::Int),
        Type::OID => row.try_get::<_, Option<u32>>(idx).map_err(decode)?.map(Value::from),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map_err(decode)?.map(Value::from),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(decode)?.map(Value::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => row
            .try_get::<_, Option<String>>(idx)
            .map_err(decode)?
            .map(Value::Text),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(decode)?
            .map(Value::Bytes),
        Type::UUID => row.try_get::<_, Option<Uuid>>(idx).map_err(decode)?.map(Value::Uuid),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .map_err(decode)?
            .map(Value::Json),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(decode)?
            .map(Value::Date),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(decode)?
            .map(Value::from),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(decode)?
            .map(Value::Timestamp),
        ref other => {
            return Err(Error::decode(
                column.name(),
                format!("unsupported column type {other}"),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

impl ScanTarget for Row {
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self.columns().iter().map(|c| c.name().to_string()).collect())
    }

    fn scan_into(&self, dest: &mut [&mut dyn ColumnSlot]) -> Result<()> {
        if dest.len() != self.len() {
            return Err(Error::ScanArity {
                expected: self.len(),
                found: dest.len(),
            });
        }
        for (idx, slot) in dest.iter_mut().enumerate() {
            let value = read_value(self, idx)?;
            slot.assign(value).map_err(|e| match e {
                err @ Error::Conversion { .. } => {
                    Error::decode(self.columns()[idx].name(), err.to_string())
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
