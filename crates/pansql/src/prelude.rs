//! Glob-import for the common types: `use pansql::prelude::*;`

pub use crate::error::{Error, Result};
pub use crate::mapper::{ColumnSet, ScanTarget, columns_of, copy_row_into};
pub use crate::record::{Flag, Record};
pub use crate::statement::{Dialect, Statement};
pub use crate::value::{ColumnSlot, Value};

#[cfg(feature = "derive")]
pub use pansql_derive::Record;
