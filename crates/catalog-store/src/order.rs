//! ORDER BY building blocks.
//!
//! Besides rendering, an ordering knows how to flip itself so that a page can be
//! read backwards from a cursor and then restored to display order.

use crate::sql::Sql;

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }

    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// NULLS ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

impl NullsOrder {
    fn to_sql(self) -> &'static str {
        match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        }
    }

    fn flip(self) -> Self {
        match self {
            NullsOrder::First => NullsOrder::Last,
            NullsOrder::Last => NullsOrder::First,
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub column: String,
    pub dir: SortDir,
    pub nulls: Option<NullsOrder>,
}

impl OrderItem {
    pub fn new(column: impl Into<String>, dir: SortDir) -> Self {
        Self {
            column: column.into(),
            dir,
            nulls: None,
        }
    }

    /// Set NULLS ordering.
    pub fn nulls(mut self, order: NullsOrder) -> Self {
        self.nulls = Some(order);
        self
    }

    /// Where NULLs land for this item once Postgres applies its defaults.
    ///
    /// Postgres sorts NULL as larger than every value, so an unqualified `ASC`
    /// puts them last and an unqualified `DESC` puts them first.
    pub fn effective_nulls(&self) -> NullsOrder {
        self.nulls.unwrap_or(match self.dir {
            SortDir::Asc => NullsOrder::Last,
            SortDir::Desc => NullsOrder::First,
        })
    }

    /// The item that yields exactly the reverse sequence.
    pub fn reversed(&self) -> Self {
        Self {
            column: self.column.clone(),
            dir: self.dir.flip(),
            nulls: self.nulls.map(NullsOrder::flip),
        }
    }

    fn append_to_sql(&self, sql: &mut Sql) {
        sql.push(&self.column);
        sql.push(" ");
        sql.push(self.dir.to_sql());
        if let Some(nulls) = self.nulls {
            sql.push(" ");
            sql.push(nulls.to_sql());
        }
    }
}

/// ORDER BY clause builder.
///
/// # Example
/// ```ignore
/// use catalog_store::{NullsOrder, OrderBy, OrderItem, SortDir};
///
/// let order = OrderBy::new()
///     .add(OrderItem::new("bust", SortDir::Desc).nulls(NullsOrder::Last))
///     .add(OrderItem::new("id", SortDir::Desc));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    items: Vec<OrderItem>,
}

impl OrderBy {
    /// Create a new empty OrderBy builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom order item.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Check if this OrderBy is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append this ORDER BY clause to a SQL builder.
    ///
    /// Does nothing if the OrderBy is empty.
    pub fn append_to_sql(&self, sql: &mut Sql) {
        if self.is_empty() {
            return;
        }
        sql.push(" ORDER BY ");
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            item.append_to_sql(sql);
        }
    }

    /// Build the ORDER BY clause as a string.
    pub fn to_sql(&self) -> String {
        let mut sql = Sql::empty();
        self.append_to_sql(&mut sql);
        sql.to_sql().trim_start().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_items_in_order() {
        let order = OrderBy::new()
            .add(OrderItem::new("bust", SortDir::Desc).nulls(NullsOrder::Last))
            .add(OrderItem::new("id", SortDir::Desc));
        assert_eq!(order.to_sql(), "ORDER BY bust DESC NULLS LAST, id DESC");
        assert_eq!(order.items().len(), 2);
    }

    #[test]
    fn empty_renders_nothing() {
        assert_eq!(OrderBy::new().to_sql(), "");
    }

    #[test]
    fn reversal_flips_direction_and_explicit_nulls() {
        let bust = OrderItem::new("bust", SortDir::Desc).nulls(NullsOrder::Last);
        let order = OrderBy::new()
            .add(bust.reversed())
            .add(OrderItem::new("id", SortDir::Asc).reversed());
        assert_eq!(order.to_sql(), "ORDER BY bust ASC NULLS FIRST, id DESC");
        assert_eq!(bust.reversed().reversed(), bust);
    }

    #[test]
    fn effective_nulls_follow_postgres_defaults() {
        assert_eq!(
            OrderItem::new("bust", SortDir::Asc).effective_nulls(),
            NullsOrder::Last
        );
        assert_eq!(
            OrderItem::new("bust", SortDir::Desc).effective_nulls(),
            NullsOrder::First
        );
        assert_eq!(
            OrderItem::new("bust", SortDir::Desc)
                .nulls(NullsOrder::Last)
                .effective_nulls(),
            NullsOrder::Last
        );
        // Reversing an unqualified item keeps it consistent: ASC (last) -> DESC (first).
        let asc = OrderItem::new("bust", SortDir::Asc);
        assert_eq!(asc.reversed().effective_nulls(), NullsOrder::First);
    }
}
