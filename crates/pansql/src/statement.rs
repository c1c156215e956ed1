//! Statement builder.
//!
//! A [`Statement`] is an SQL string plus a buffer of pending expressions.
//! Expressions are added to the buffer and committed to the SQL text by
//! [`Statement::flush`]; the statement must be flushed before it is rendered.
//! Placeholders are always written as `?` and translated per [`Dialect`] at
//! render time.
//!
//! # Example
//!
//! ```ignore
//! use pansql::Statement;
//!
//! let mut q = Statement::select(&post, &[Flag::Full]);
//! q.where_()
//!     .comparison(&post, "author", "=", 1)?
//!     .flush(" ")
//!     .order_by_desc("created")
//!     .limit(20)
//!     .flush(" ");
//!
//! let sql = q.postgres_sql()?;
//! // SELECT posts.id, ... FROM posts WHERE posts.author_id = $1 ORDER BY created DESC LIMIT $2;
//! ```
//!
//! `Statement` is not synchronized; share it across threads only behind your
//! own lock.

use crate::error::{Error, Result};
use crate::mapper::{column_of, columns_of, placeholders};
use crate::record::{Flag, Record};
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;

#[cfg(test)]
mod tests;

/// The placeholder token written into statement text.
pub const PLACEHOLDER: char = '?';

/// Appended to every rendered statement.
pub const TERMINATOR: char = ';';

const MISSING_ARG: &str = "!{MISSING}";

/// Placeholder convention used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Numbered placeholders: `$1`, `$2`, ...
    Postgres,
    /// A bare `?` for every argument (MySQL, SQLite)
    MySql,
}

impl Dialect {
    /// Renders the placeholder for the given 1-based argument index.
    #[inline]
    pub fn placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::Postgres => Cow::Owned(format!("${index}")),
            Dialect::MySql => Cow::Borrowed("?"),
        }
    }
}

#[derive(Debug, Clone)]
struct Fragment {
    sql: String,
    /// Glued to the preceding text without a joiner (`, col` of an ORDER BY list).
    continuation: bool,
}

impl Fragment {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            continuation: false,
        }
    }
}

/// An SQL statement under construction.
#[must_use]
#[derive(Debug, Clone)]
pub struct Statement {
    text: String,
    pending: Vec<Fragment>,
    args: Vec<Value>,
    has_where: bool,
    has_order: bool,
    has_limit: bool,
    has_offset: bool,
    column_flags: Vec<Flag>,
}

impl Statement {
    /// Create a statement starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            text: prefix.into(),
            pending: Vec::new(),
            args: Vec::new(),
            has_where: false,
            has_order: false,
            has_limit: false,
            has_offset: false,
            column_flags: vec![Flag::Full],
        }
    }

    /// `INSERT INTO <table> (<columns>) VALUES (?,..), (?,..)` for `records`.
    ///
    /// Table and columns are taken from the first record, so every record should
    /// be of the same table. Fails with [`Error::NoRecords`] for an empty slice.
    pub fn insert<R: Record + 'static>(records: &[R]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Err(Error::NoRecords);
        };
        let mut stmt = Statement::new(format!(
            "INSERT INTO {} ({}) VALUES",
            first.table_name(),
            columns_of(first, &[])
        ));
        for record in records {
            let values = record.values();
            stmt.expression(format!("({})", placeholders(values.len())), values);
        }
        stmt.flush(", ");
        Ok(stmt)
    }

    /// `UPDATE <table> SET a = ?, b = ?` assigning every mapped column of `record`.
    pub fn update<R: Record + 'static>(record: &R) -> Self {
        let mut stmt = Statement::new(format!("UPDATE {} SET", record.table_name()));
        for (column, value) in columns_of(record, &[]).into_iter().zip(record.values()) {
            stmt.expression(format!("{column} = ?"), [value]);
        }
        stmt.flush(", ");
        stmt
    }

    /// `SELECT <columns> FROM <table>` for the mapped columns of `record`.
    pub fn select<R: Record + 'static>(record: &R, flags: &[Flag]) -> Self {
        Statement::new(format!(
            "SELECT {} FROM {}",
            columns_of(record, flags),
            record.table_name()
        ))
    }

    /// Decoration used when `comparison`, `in_list` and `assign` resolve a column.
    ///
    /// Defaults to `[Flag::Full]`.
    pub fn with_column_flags(&mut self, flags: &[Flag]) -> &mut Self {
        self.column_flags = flags.to_vec();
        self
    }

    /// Add a raw expression and its arguments to the buffer.
    ///
    /// The placeholder count is only checked against the whole statement at
    /// render time.
    pub fn expression<I>(&mut self, fragment: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.pending.push(Fragment::new(fragment));
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Add a raw expression without arguments to the buffer.
    pub fn raw(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.pending.push(Fragment::new(fragment));
        self
    }

    /// Commit the buffered expressions to the SQL text, joined by `joiner`.
    ///
    /// The text is separated from the expressions by a single space.
    pub fn flush(&mut self, joiner: &str) -> &mut Self {
        if self.pending.is_empty() {
            return self;
        }
        let flushed = self.pending.len();

        let end = self.text.trim_end().len();
        self.text.truncate(end);
        for (i, fragment) in self.pending.drain(..).enumerate() {
            if !fragment.continuation {
                self.text.push_str(if i == 0 { " " } else { joiner });
            }
            self.text.push_str(fragment.sql.trim());
        }

        tracing::trace!(fragments = flushed, sql = %self.text, "flushed statement buffer");
        self
    }

    /// Add `WHERE` and flush. Only the first call has an effect.
    pub fn where_(&mut self) -> &mut Self {
        if self.has_where {
            return self;
        }
        self.raw("WHERE");
        self.flush(" ");
        self.has_where = true;
        self
    }

    fn push_order(&mut self, column: &str, descending: bool) -> &mut Self {
        let dir = if descending { " DESC" } else { "" };
        let fragment = if self.has_order {
            Fragment {
                sql: format!(", {column}{dir}"),
                continuation: true,
            }
        } else {
            self.has_order = true;
            Fragment::new(format!("ORDER BY {column}{dir}"))
        };
        self.pending.push(fragment);
        self
    }

    /// Order by `column`. Later calls extend the same `ORDER BY` list.
    pub fn order_by(&mut self, column: &str) -> &mut Self {
        self.push_order(column, false)
    }

    /// Order by `column` descending. Later calls extend the same `ORDER BY` list.
    pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
        self.push_order(column, true)
    }

    /// Add `LIMIT ?`. Only the first call has an effect.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        if self.has_limit {
            tracing::debug!(limit, "statement already has a LIMIT; ignoring");
            return self;
        }
        self.has_limit = true;
        self.expression("LIMIT ?", [limit])
    }

    /// Add `OFFSET ?`. Only the first call has an effect.
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        if self.has_offset {
            tracing::debug!(offset, "statement already has an OFFSET; ignoring");
            return self;
        }
        self.has_offset = true;
        self.expression("OFFSET ?", [offset])
    }

    /// Add `<column> <operator> ?` for the field named `field` of `record`.
    pub fn comparison<R: Record>(
        &mut self,
        record: &R,
        field: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let column = column_of(record, field, &self.column_flags)?;
        Ok(self.expression(format!("{column} {operator} ?"), [value.into()]))
    }

    /// Add `<column> IN(?,?,..)` with one placeholder per value.
    ///
    /// An empty list renders `IN(NULL)`, which matches no rows.
    pub fn in_list<R, I>(&mut self, record: &R, field: &str, values: I) -> Result<&mut Self>
    where
        R: Record,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let column = column_of(record, field, &self.column_flags)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Ok(self.raw(format!("{column} IN(NULL)")));
        }
        Ok(self.expression(format!("{column} IN({})", placeholders(values.len())), values))
    }

    /// Add `<column> = ?` for the field named `field` of `record`.
    pub fn assign<R: Record>(
        &mut self,
        record: &R,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let column = column_of(record, field, &self.column_flags)?;
        Ok(self.expression(format!("{column} = ?"), [value.into()]))
    }

    /// Arguments collected so far, in placeholder order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The committed SQL text, with `?` placeholders and no terminator.
    pub fn sql(&self) -> &str {
        &self.text
    }

    /// Whether expressions are waiting for a flush.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Consume the statement into its committed text and arguments.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.args)
    }

    fn validate(&self) -> Result<()> {
        if !self.pending.is_empty() {
            tracing::debug!(
                pending = self.pending.len(),
                "render attempted before flush"
            );
            return Err(Error::NeedsFlush);
        }
        let expected = self.text.matches(PLACEHOLDER).count();
        let found = self.args.len();
        if expected != found {
            tracing::debug!(expected, found, sql = %self.text, "placeholder count mismatch");
            return Err(Error::ArgumentCountMismatch { expected, found });
        }
        Ok(())
    }

    /// Render the statement for `dialect`, terminated with `;`.
    ///
    /// Fails with [`Error::NeedsFlush`] while expressions are pending and with
    /// [`Error::ArgumentCountMismatch`] when placeholders and arguments differ.
    pub fn render(&self, dialect: Dialect) -> Result<String> {
        self.validate()?;

        let mut out = String::with_capacity(self.text.len() + 2 * self.args.len() + 1);
        let mut parts = self.text.split(PLACEHOLDER);
        if let Some(head) = parts.next() {
            out.push_str(head);
        }
        for (i, part) in parts.enumerate() {
            out.push_str(&dialect.placeholder(i + 1));
            out.push_str(part);
        }
        out.push(TERMINATOR);
        Ok(out)
    }

    /// Render with `$1, $2, ...` placeholders.
    pub fn postgres_sql(&self) -> Result<String> {
        self.render(Dialect::Postgres)
    }

    /// Render with `?` placeholders.
    pub fn mysql_sql(&self) -> Result<String> {
        self.render(Dialect::MySql)
    }

    /// The SQL text with every placeholder replaced by its argument.
    ///
    /// No escaping is done and the result is usually not valid SQL; use it
    /// for logs only.
    pub fn debug_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.text.split(PLACEHOLDER);
        if let Some(head) = parts.next() {
            f.write_str(head)?;
        }
        for (i, part) in parts.enumerate() {
            match self.args.get(i) {
                Some(arg) => write!(f, "{arg}")?,
                None => f.write_str(MISSING_ARG)?,
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}
