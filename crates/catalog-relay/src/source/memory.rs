//! In-memory row source.

use super::RowSource;
use crate::entity::Entity;
use crate::error::RelayResult;
use crate::filter::Filter;
use crate::window::Window;

/// Evaluates windows over a `Vec` of rows.
///
/// Text compares by byte order, not a database collation.
#[derive(Debug, Clone, Default)]
pub struct MemorySource<E> {
    rows: Vec<E>,
}

impl<E: Entity> MemorySource<E> {
    pub fn new(rows: Vec<E>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[E] {
        &self.rows
    }
}

impl<E: Entity> FromIterator<E> for MemorySource<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<E: Entity> RowSource<E> for MemorySource<E> {
    async fn fetch(&self, window: &Window) -> RelayResult<Vec<E>> {
        let mut rows: Vec<E> = self
            .rows
            .iter()
            .filter(|row| window.filter.matches(*row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| window.sorting.compare(a, b));
        rows.truncate(usize::try_from(window.limit).unwrap_or(0));
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> RelayResult<i64> {
        let n = self.rows.iter().filter(|row| filter.matches(*row)).count();
        Ok(n as i64)
    }

    async fn exists(&self, filter: &Filter) -> RelayResult<bool> {
        Ok(self.rows.iter().any(|row| filter.matches(row)))
    }

    async fn find(&self, id: i64) -> RelayResult<Option<E>> {
        Ok(self.rows.iter().find(|row| row.id() == id).cloned())
    }
}
