//! Total count over the filtered, unpaged set.

use crate::entity::Entity;
use crate::error::RelayResult;
use crate::filter::Filter;
use crate::source::RowSource;

/// Count every row matching `filter`.
///
/// `filter` must be the base predicate: no cursor bounds and no limit.
pub async fn count_total<E, S>(source: &S, filter: &Filter) -> RelayResult<i64>
where
    E: Entity,
    S: RowSource<E>,
{
    let total = source.count(filter).await?;
    tracing::trace!(target: "catalog.relay", table = E::TABLE, total, "counted");
    Ok(total)
}
