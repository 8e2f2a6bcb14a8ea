//! Sort resolution.
//!
//! A requested `sortBy` / `sortOrder` pair resolves to a [`Sorting`]: the sort
//! column followed by an `id` tie-break in the same direction, which makes the
//! order total and lets a cursor pin an exact position in it.

use crate::entity::{Entity, ID_COLUMN, SortField};
use crate::value::Value;
use catalog_store::{NullsOrder, OrderBy, OrderItem, SortDir};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Requested sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl From<SortOrder> for SortDir {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => SortDir::Asc,
            SortOrder::Desc => SortDir::Desc,
        }
    }
}

/// One key of a [`Sorting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub item: OrderItem,
    pub nullable: bool,
}

impl SortKey {
    fn new(column: &str, dir: SortDir, nullable: bool) -> Self {
        Self {
            item: OrderItem::new(column, dir),
            nullable,
        }
    }

    pub fn column(&self) -> &str {
        &self.item.column
    }

    /// Relative position of two values in this key's sequence.
    ///
    /// NULLs are equal to each other and sit at the end given by
    /// [`OrderItem::effective_nulls`].
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match self.item.effective_nulls() {
                NullsOrder::First => Ordering::Less,
                NullsOrder::Last => Ordering::Greater,
            },
            (false, true) => match self.item.effective_nulls() {
                NullsOrder::First => Ordering::Greater,
                NullsOrder::Last => Ordering::Less,
            },
            (false, false) => {
                let ord = a.compare(b).unwrap_or(Ordering::Equal);
                match self.item.dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            }
        }
    }

    fn reversed(&self) -> Self {
        Self {
            item: self.item.reversed(),
            nullable: self.nullable,
        }
    }
}

/// A total order over an entity's rows; always ends with the `id` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorting {
    keys: Vec<SortKey>,
}

impl Default for Sorting {
    fn default() -> Self {
        Self::by_id(SortDir::Asc)
    }
}

impl Sorting {
    /// `id` in the given direction.
    pub fn by_id(dir: SortDir) -> Self {
        Self {
            keys: vec![SortKey::new(ID_COLUMN, dir, false)],
        }
    }

    /// Order by `field`, tie-broken by `id` in the same direction.
    ///
    /// A nullable field sorted descending gets an explicit `NULLS LAST`; an
    /// ascending sort already puts NULLs last.
    pub fn by_field(field: &SortField, order: SortOrder) -> Self {
        let dir = SortDir::from(order);
        if field.column == ID_COLUMN {
            return Self::by_id(dir);
        }

        let mut key = SortKey::new(field.column, dir, field.nullable);
        if field.nullable && dir == SortDir::Desc {
            key.item = key.item.nulls(NullsOrder::Last);
        }
        Self {
            keys: vec![key, SortKey::new(ID_COLUMN, dir, false)],
        }
    }

    /// Resolve a client's `sortBy` / `sortOrder` against `E`'s allow-list.
    ///
    /// Absent and unknown fields both fall back to `id ASC`; unknown ones are
    /// logged, never rejected.
    pub fn resolve<E: Entity>(sort_by: Option<&str>, order: Option<SortOrder>) -> Self {
        let Some(sort_by) = sort_by else {
            return Self::default();
        };
        match E::sort_field(sort_by) {
            Some(field) => Self::by_field(field, order.unwrap_or_default()),
            None => {
                tracing::warn!(
                    target: "catalog.relay",
                    table = E::TABLE,
                    sort_by,
                    "unknown sort field, ordering by id ASC"
                );
                Self::default()
            }
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// True when the only key is `id`.
    pub fn is_id_only(&self) -> bool {
        self.keys.len() == 1 && self.keys[0].column() == ID_COLUMN
    }

    /// The exact reverse sequence.
    pub fn reversed(&self) -> Self {
        Self {
            keys: self.keys.iter().map(SortKey::reversed).collect(),
        }
    }

    pub fn to_order_by(&self) -> OrderBy {
        self.keys
            .iter()
            .fold(OrderBy::new(), |order, key| order.add(key.item.clone()))
    }

    /// The row's value for each key, in key order.
    pub fn values_of<E: Entity>(&self, row: &E) -> Vec<Value> {
        self.keys.iter().map(|k| row.value(k.column())).collect()
    }

    /// Compare key value tuples lexicographically.
    pub fn compare_values(&self, a: &[Value], b: &[Value]) -> Ordering {
        self.keys
            .iter()
            .zip(a.iter().zip(b))
            .map(|(key, (a, b))| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Compare two rows.
    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        self.compare_values(&self.values_of(a), &self.values_of(b))
    }
}
