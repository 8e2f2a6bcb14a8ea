//! Row sources: where pages are read from.

pub mod memory;
pub mod postgres;

use crate::entity::Entity;
use crate::error::RelayResult;
use crate::filter::Filter;
use crate::window::Window;

pub use memory::MemorySource;
pub use postgres::PgSource;

/// Read access to the rows of one entity.
///
/// Every method takes an immutable query description; implementations must
/// agree on filter and ordering semantics, NULL handling included.
pub trait RowSource<E: Entity>: Send + Sync {
    /// Rows matching `window.filter`, in `window.sorting`, at most `window.limit`.
    fn fetch(
        &self,
        window: &Window,
    ) -> impl std::future::Future<Output = RelayResult<Vec<E>>> + Send;

    /// Number of rows matching `filter`.
    fn count(
        &self,
        filter: &Filter,
    ) -> impl std::future::Future<Output = RelayResult<i64>> + Send;

    /// Whether any row matches `filter`.
    fn exists(
        &self,
        filter: &Filter,
    ) -> impl std::future::Future<Output = RelayResult<bool>> + Send;

    /// Row with the given id, if present.
    fn find(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = RelayResult<Option<E>>> + Send;
}
