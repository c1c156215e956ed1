//! Field-to-column mapping.
//!
//! Column names come from a record's [`FieldDef`]s: a valid `sql_column`
//! annotation wins, otherwise the field identifier is transliterated to
//! `lower_snake_case`. Bare column lists are cached per record type in a
//! [`FieldCache`]; decoration ([`Flag`]) is applied on every call.
//!
//! # Example
//! ```ignore
//! let cols = pansql::columns_of(&post, &[Flag::Full]);
//! assert_eq!(cols.to_string(), "posts.id, posts.author_id");
//! ```

use crate::error::{Error, Result};
use crate::record::{FieldDef, Flag, Record};
use crate::value::{ColumnSlot, Value};
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};


/// Whether an `sql_column` annotation can be used verbatim as a column name.
///
/// Valid annotations are non-empty and contain only letters, digits, `_`, `.` and `-`.
pub fn valid_column_tag(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| is_letter_or_digit(c) || c == '_' || c == '.' || c == '-')
}

/// Letters and ASCII digits. Letter-like numbers (`Ⅰ`) and other numerics (`²`) are excluded.
fn is_letter_or_digit(c: char) -> bool {
    c.is_ascii_digit() || (c.is_alphabetic() && !c.is_numeric())
}

/// Transliterate a mixed-case name to lower case with underscores.
///
/// Characters that are neither letters nor digits are dropped, and an upper-case
/// letter that follows a lower-case one starts a new `_`-separated word.
pub fn to_snake(s: &str) -> String {
    let mut snake = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;
    for c in s.chars() {
        if !is_letter_or_digit(c) {
            continue;
        }
        if c.is_lowercase() {
            prev_was_lower = true;
            snake.push(c);
        } else if c.is_uppercase() {
            if prev_was_lower {
                snake.push('_');
            }
            prev_was_lower = false;
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Infer a column name from a Rust field identifier.
///
/// Each `_`-separated word goes through [`to_snake`], so both `my_string` and
/// `myString` become `my_string`.
pub fn infer_column(ident: &str) -> String {
    let words: Vec<String> = ident
        .split('_')
        .map(to_snake)
        .filter(|w| !w.is_empty())
        .collect();
    words.join("_")
}

/// A comma-joined list of `n` `?` placeholders.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn push_name(out: &mut String, name: &str, quote: Option<char>) {
    match quote {
        Some(q) => {
            out.push(q);
            for c in name.chars() {
                if c == q {
                    out.push(q);
                }
                out.push(c);
            }
            out.push(q);
        }
        None => out.push_str(name),
    }
}

/// Apply decoration flags to a bare column name.
///
/// When both quoting flags are present the last one wins.
pub(crate) fn decorate(table: &str, column: &str, flags: &[Flag]) -> String {
    let quote = flags.iter().rev().find_map(|flag| match flag {
        Flag::Ticked => Some('`'),
        Flag::DoubleQuoted => Some('"'),
        Flag::Full => None,
    });
    let mut out = String::with_capacity(table.len() + column.len() + 5);
    if flags.contains(&Flag::Full) {
        push_name(&mut out, table, quote);
        out.push('.');
    }
    push_name(&mut out, column, quote);
    out
}

/// An ordered list of column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet(Vec<String>);

impl Deref for ColumnSet {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ColumnSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Columns joined by `", "`, ready to be placed in SQL text.
impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// A result row that can report its column order and be scanned.
///
/// Implemented by whatever data-access layer executes the rendered SQL.
pub trait ScanTarget {
    /// Column names, in the order the row returns them.
    fn column_names(&self) -> Result<Vec<String>>;

    /// Write the row's values, in column order, into `dest`.
    fn scan_into(&self, dest: &mut [&mut dyn ColumnSlot]) -> Result<()>;
}

/// Per-type cache of bare column names.
///
/// Entries are computed on first sight of a record type and kept for the
/// lifetime of the cache. Readers share the lock; populating an entry takes it
/// exclusively.
#[derive(Debug, Default)]
pub struct FieldCache {
    columns: RwLock<HashMap<TypeId, Arc<[String]>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by the free functions of this module.
    pub fn global() -> &'static FieldCache {
        static GLOBAL: OnceLock<FieldCache> = OnceLock::new();
        GLOBAL.get_or_init(FieldCache::new)
    }

    /// Number of record types cached so far.
    pub fn len(&self) -> usize {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bare_columns<R: Record + 'static>(&self) -> Arc<[String]> {
        let key = TypeId::of::<R>();
        if let Some(cached) = self
            .columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(cached);
        }

        // Computed outside the write lock; a racing thread may insert first.
        let computed: Arc<[String]> = R::fields().iter().filter_map(FieldDef::column).collect();
        tracing::trace!(
            record = type_name::<R>(),
            columns = computed.len(),
            "caching record columns"
        );

        let mut map = self.columns.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(key).or_insert(computed))
    }

    /// Mapped columns of `record`, decorated with `flags`.
    pub fn columns_of<R: Record + 'static>(&self, record: &R, flags: &[Flag]) -> ColumnSet {
        let table = record.table_name();
        self.bare_columns::<R>()
            .iter()
            .map(|column| decorate(table, column, flags))
            .collect()
    }

    /// Scan `row` into the fields of `dest`, matching columns by name.
    ///
    /// Fields whose column the row does not report are left untouched; `extra`
    /// destinations are appended after the matched fields, for columns the
    /// record does not map.
    pub fn copy_row_into<'a, R, S>(
        &self,
        row: &S,
        dest: &'a mut R,
        extra: Vec<&'a mut dyn ColumnSlot>,
    ) -> Result<()>
    where
        R: Record + 'static,
        S: ScanTarget + ?Sized,
    {
        let columns = self.bare_columns::<R>();
        let order = row.column_names()?;

        let slots = dest.slots();
        debug_assert_eq!(
            columns.len(),
            slots.len(),
            "Record::slots must match the mapped fields of {}",
            type_name::<R>()
        );

        let mut matched: Vec<(usize, &'a mut dyn ColumnSlot)> = columns
            .iter()
            .zip(slots)
            .filter_map(|(column, slot)| {
                order
                    .iter()
                    .position(|name| name == column)
                    .map(|pos| (pos, slot))
            })
            .collect();
        matched.sort_by_key(|(pos, _)| *pos);

        tracing::trace!(
            record = type_name::<R>(),
            matched = matched.len(),
            skipped = columns.len() - matched.len(),
            extra = extra.len(),
            "scanning row into record"
        );

        let mut addrs: Vec<&'a mut dyn ColumnSlot> = matched
            .into_iter()
            .map(|(_, slot)| slot)
            .chain(extra)
            .collect();
        row.scan_into(&mut addrs)
    }
}

/// Mapped columns of `record`, using the global cache.
pub fn columns_of<R: Record + 'static>(record: &R, flags: &[Flag]) -> ColumnSet {
    FieldCache::global().columns_of(record, flags)
}

/// Column of the field named `field` (the Rust identifier), decorated with `flags`.
///
/// Fails with [`Error::FieldNotFound`] if the record has no such field or the
/// field is annotated `-`. Non-`pub` fields still resolve.
pub fn column_of<R: Record>(record: &R, field: &str, flags: &[Flag]) -> Result<String> {
    R::fields()
        .iter()
        .find(|def| def.name == field && !def.is_omitted())
        .map(|def| decorate(record.table_name(), &def.column_name(), flags))
        .ok_or_else(|| Error::FieldNotFound {
            record: type_name::<R>(),
            field: field.to_string(),
        })
}

/// Values of the mapped fields, in [`columns_of`] order.
pub fn values_of<R: Record>(record: &R) -> Vec<Value> {
    record.values()
}

pub fn table_name_of<R: Record>(record: &R) -> &str {
    record.table_name()
}

/// [`FieldCache::copy_row_into`] using the global cache.
pub fn copy_row_into<'a, R, S>(
    row: &S,
    dest: &'a mut R,
    extra: Vec<&'a mut dyn ColumnSlot>,
) -> Result<()>
where
    R: Record + 'static,
    S: ScanTarget + ?Sized,
{
    FieldCache::global().copy_row_into(row, dest, extra)
}

/// Scan a single-column row straight into a non-record destination.
pub fn scan_value<S: ScanTarget + ?Sized>(row: &S, dest: &mut dyn ColumnSlot) -> Result<()> {
    row.scan_into(&mut [dest])
}
