//! Row mapping traits and utilities

use crate::error::{StoreError, StoreResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// # Example
///
/// ```ignore
/// use catalog_store::{FromRow, RowExt, StoreResult};
///
/// struct Tag {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for Tag {
///     fn from_row(row: &Row) -> StoreResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> StoreResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning [`StoreError::Decode`] on failure
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Like [`RowExt::try_get_column`], but a SQL NULL array decodes as empty.
    fn try_get_ids(&self, column: &str) -> StoreResult<Vec<i64>> {
        let ids: Option<Vec<i64>> = self.try_get_column(column)?;
        Ok(ids.unwrap_or_default())
    }
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| StoreError::decode(column, e.to_string()))
    }
}
