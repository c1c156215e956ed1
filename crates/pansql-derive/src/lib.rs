//! Derive macros for pansql
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive the `Record` trait for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use pansql::Record;
///
/// #[derive(Record)]
/// #[pansql(table = "users")]
/// pub struct User {
///     pub id: i64,
///     #[sql_column = "email_address"]
///     pub email: Option<String>,
///     #[sql_column = "-"]
///     pub display_name: String,
///     password_hash: String,
/// }
/// ```
///
/// # Attributes
///
/// Struct level:
/// - `#[pansql(table = "name")]` - Table name (defaults to the struct name in snake_case)
///
/// Field level:
/// - `#[sql_column = "name"]` - Map field to a different column name
/// - `#[sql_column = "-"]` - Leave the field out of the mapping
///
/// Only `pub` fields are mapped. Every mapped field type must convert into
/// `pansql::Value` and implement `pansql::FromValue`.
#[proc_macro_derive(Record, attributes(pansql, sql_column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
