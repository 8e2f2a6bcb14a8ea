//! One pagination request, end to end.

use crate::config::PaginationConfig;
use crate::connection::Connection;
use crate::count::count_total;
use crate::entity::Entity;
use crate::error::{RelayError, RelayResult};
use crate::filter::{Filter, Seek};
use crate::sort::Sorting;
use crate::source::RowSource;
use crate::value::Value;
use crate::window::{PageArgs, PagePlan, Window};

/// A resolved request: base predicate, display order and page arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub filter: Filter,
    pub sorting: Sorting,
    pub args: PageArgs,
}

/// A cursor position: the ordering it is expressed in and the cursor row's
/// value for each key of it.
struct Anchor {
    sorting: Sorting,
    values: Vec<Value>,
}

/// Read one page and its totals.
///
/// The window, the total count and (for forward pages with `after`) the
/// previous-page probe run concurrently; any row source failure is returned
/// as-is.
pub async fn paginate<E, S>(
    source: &S,
    config: &PaginationConfig,
    request: &PageRequest,
) -> RelayResult<Connection<E>>
where
    E: Entity,
    S: RowSource<E>,
{
    let plan = PagePlan::new(&request.args, config)?;
    let base = &request.filter;
    let sorting = &request.sorting;

    let after = match plan.after {
        Some(id) => Some(anchor::<E, S>(source, sorting, id).await?),
        None => None,
    };
    let before = match plan.before {
        Some(id) => Some(anchor::<E, S>(source, sorting, id).await?),
        None => None,
    };

    let mut page_filter = base.clone();
    if let Some(a) = &after {
        page_filter = page_filter.with(Seek::after(&a.sorting, &a.values));
    }
    if let Some(b) = &before {
        page_filter = page_filter.with(Seek::before(&b.sorting, &b.values));
    }

    let window = Window {
        filter: page_filter,
        sorting: if plan.is_backward() {
            sorting.reversed()
        } else {
            sorting.clone()
        },
        limit: plan.fetch_limit(),
    };

    let probe = match (&after, plan.is_backward()) {
        (Some(a), false) => Some(base.with(Seek::at_or_before(&a.sorting, &a.values))),
        _ => None,
    };

    let (rows, total_count, earlier_rows) = futures_util::try_join!(
        source.fetch(&window),
        count_total::<E, S>(source, base),
        async {
            match &probe {
                Some(filter) => source.exists(filter).await,
                None => Ok(false),
            }
        },
    )?;

    let (rows, has_more) = plan.trim(rows);
    let (has_next_page, has_previous_page) = if plan.is_backward() {
        (false, has_more)
    } else {
        (has_more, earlier_rows)
    };

    tracing::debug!(
        target: "catalog.relay",
        table = E::TABLE,
        direction = ?plan.direction,
        limit = plan.limit,
        rows = rows.len(),
        total_count,
        has_next_page,
        has_previous_page,
        "page assembled"
    );

    Ok(Connection::assemble(
        rows,
        has_next_page,
        has_previous_page,
        total_count,
    ))
}

/// Locate a cursor in `sorting`.
///
/// `id`-only orderings need nothing but the id. Otherwise the cursor row is
/// read for its sort values. A cursor whose row has since been deleted has no
/// position in a custom order and is rejected as invalid.
async fn anchor<E, S>(source: &S, sorting: &Sorting, id: i64) -> RelayResult<Anchor>
where
    E: Entity,
    S: RowSource<E>,
{
    if sorting.is_id_only() {
        return Ok(Anchor {
            sorting: sorting.clone(),
            values: vec![Value::Int(id)],
        });
    }
    match source.find(id).await? {
        Some(row) => Ok(Anchor {
            sorting: sorting.clone(),
            values: sorting.values_of(&row),
        }),
        None => {
            tracing::warn!(
                target: "catalog.relay",
                table = E::TABLE,
                id,
                "cursor row no longer exists"
            );
            Err(RelayError::invalid_cursor(format!(
                "row {id} behind the cursor no longer exists"
            )))
        }
    }
}
