//! Paginated entity description.

use crate::value::Value;

/// Primary key column shared by every paginated table.
pub const ID_COLUMN: &str = "id";

/// A sort key exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    /// External (camelCase) name accepted in `sortBy`.
    pub key: &'static str,
    /// Column it orders by.
    pub column: &'static str,
    /// Whether the column may hold NULL.
    pub nullable: bool,
}

impl SortField {
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            nullable: false,
        }
    }

    pub const fn nullable(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            nullable: true,
        }
    }
}

/// A many-to-many relation stored in a junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManyToMany {
    pub junction: &'static str,
    /// Junction column pointing at the paginated row.
    pub owner_key: &'static str,
    /// Junction column pointing at the related row.
    pub related_key: &'static str,
}

/// A row type the engine can filter, order and page through.
///
/// `SELECT` is the full projection (`SELECT ... FROM table`) a row source
/// extends with WHERE / ORDER BY / LIMIT; every column named in a filter or a
/// [`SortField`] must also be readable through [`Entity::value`].
pub trait Entity: Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    const SELECT: &'static str;
    /// Allow-list for `sortBy`.
    const SORTABLE: &'static [SortField];

    fn id(&self) -> i64;

    /// Column value by name; unknown columns read as NULL.
    fn value(&self, column: &str) -> Value;

    /// Ids linked to this row through `relation`.
    fn related_ids(&self, relation: &ManyToMany) -> &[i64] {
        let _ = relation;
        &[]
    }

    fn sort_field(key: &str) -> Option<&'static SortField> {
        Self::SORTABLE.iter().find(|f| f.key == key)
    }
}
