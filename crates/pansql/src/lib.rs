//! # pansql
//!
//! A small SQL statement builder with struct-to-column mapping.
//!
//! ## Features
//!
//! - **Fragment-based building**: expressions are buffered and committed with a joiner
//! - **Dialect rendering**: `?` placeholders become `$1, $2, ...` for PostgreSQL
//! - **Checked argument counts**: rendering fails if placeholders and arguments differ
//! - **Column mapping**: `#[derive(Record)]` describes a struct's columns at compile time
//! - **Row copy-back**: scanned columns are matched to fields by name
//!
//! ## Example
//!
//! ```ignore
//! use pansql::prelude::*;
//!
//! #[derive(Record)]
//! #[pansql(table = "users")]
//! pub struct User {
//!     pub id: i64,
//!     #[sql_column = "user_name"]
//!     pub name: String,
//! }
//!
//! let user = User { id: 1, name: "alice".into() };
//!
//! let mut q = Statement::select(&user, &[Flag::Full]);
//! q.where_().comparison(&user, "name", "=", "alice")?.flush(" AND ");
//!
//! assert_eq!(
//!     q.postgres_sql()?,
//!     "SELECT users.id, users.user_name FROM users WHERE users.user_name = $1;"
//! );
//!
//! // with the `postgres` feature
//! let rows = client.query(&q.postgres_sql()?, &q.params_ref()).await?;
//! let mut found = User { id: 0, name: String::new() };
//! pansql::copy_row_into(&rows[0], &mut found, Vec::new())?;
//! ```

pub mod error;
pub mod mapper;
pub mod prelude;
pub mod record;
pub mod statement;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{Error, Result};
pub use mapper::{
    ColumnSet, FieldCache, ScanTarget, column_of, columns_of, copy_row_into, infer_column,
    placeholders, scan_value, table_name_of, to_snake, valid_column_tag, values_of,
};
pub use record::{FieldDef, Flag, OMIT, Record};
pub use statement::{Dialect, Statement};
pub use value::{ColumnSlot, FromValue, Value};

#[cfg(feature = "derive")]
pub use pansql_derive::Record;
