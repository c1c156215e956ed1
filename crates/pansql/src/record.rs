//! The record capability and its per-field descriptor.

use crate::mapper::{infer_column, valid_column_tag};
use crate::value::{ColumnSlot, Value};

/// Annotation value that removes a field from the column mapping.
pub const OMIT: &str = "-";

/// Trait for structs that map to a table row.
///
/// This trait should typically be derived using `#[derive(Record)]`
/// from the `pansql-derive` crate.
///
/// # Example
///
/// ```ignore
/// use pansql::Record;
///
/// #[derive(Record)]
/// #[pansql(table = "posts")]
/// pub struct Post {
///     pub id: i64,
///     #[sql_column = "author_id"]
///     pub author: i64,
///     #[sql_column = "-"]
///     pub cached_html: String,
/// }
/// ```
///
/// Implementations must keep [`values`](Record::values) and
/// [`slots`](Record::slots) aligned with the mapped entries of
/// [`fields`](Record::fields): one entry per field whose
/// [`FieldDef::column`] is `Some`, in declaration order.
pub trait Record {
    /// Table this record is stored in.
    fn table_name(&self) -> &str;

    /// Every declared field, in declaration order.
    fn fields() -> &'static [FieldDef];

    /// Current values of the mapped fields.
    fn values(&self) -> Vec<Value>;

    /// Writable destinations for the mapped fields.
    fn slots(&mut self) -> Vec<&mut dyn ColumnSlot>;
}

/// Compile-time description of one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Rust identifier of the field (without any `r#` prefix)
    pub name: &'static str,
    /// Raw `sql_column` annotation, if present
    pub sql_column: Option<&'static str>,
    /// Whether the field is `pub`
    pub public: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, sql_column: Option<&'static str>, public: bool) -> Self {
        Self {
            name,
            sql_column,
            public,
        }
    }

    /// Whether the field is explicitly annotated `-`.
    pub fn is_omitted(&self) -> bool {
        self.sql_column == Some(OMIT)
    }

    /// Whether the field takes part in column lists, values and scans.
    pub fn is_mapped(&self) -> bool {
        self.public && !self.is_omitted()
    }

    /// Column name for a mapped field, or `None` if the field is skipped.
    pub fn column(&self) -> Option<String> {
        if !self.is_mapped() {
            return None;
        }
        Some(self.column_name())
    }

    /// Column name ignoring visibility: the valid annotation, else the inferred name.
    pub(crate) fn column_name(&self) -> String {
        match self.sql_column {
            Some(tag) if valid_column_tag(tag) => tag.to_string(),
            _ => infer_column(self.name),
        }
    }
}

/// Modification applied to columns returned by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `table.column`
    Full,
    /// Quote names with backticks, like `` `column` ``
    Ticked,
    /// Quote names with double quotes, like `"column"`
    DoubleQuoted,
}
