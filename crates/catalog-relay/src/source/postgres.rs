//! Postgres row source.

use super::RowSource;
use crate::entity::{Entity, ID_COLUMN};
use crate::error::RelayResult;
use crate::filter::Filter;
use crate::value::Value;
use crate::window::Window;
use catalog_store::{FromRow, GenericClient, Sql, sql};

/// Reads rows through any [`GenericClient`]: a connection, a pooled client, a
/// transaction or a [`catalog_store::TracedClient`].
#[derive(Debug, Clone)]
pub struct PgSource<C> {
    client: C,
}

impl<C: GenericClient> PgSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

/// `SELECT ... WHERE ... ORDER BY ... LIMIT $n` for a window.
pub fn window_sql<E: Entity>(window: &Window) -> Sql {
    let mut q = sql(E::SELECT);
    window.filter.append_where(&mut q);
    window.sorting.to_order_by().append_to_sql(&mut q);
    q.limit(window.limit);
    q
}

/// `SELECT COUNT(*)` over the filtered table.
pub fn count_sql<E: Entity>(filter: &Filter) -> Sql {
    let mut q = sql(format!("SELECT COUNT(*) FROM {}", E::TABLE));
    filter.append_where(&mut q);
    q
}

/// Existence probe body; [`Sql::exists`] wraps it in `SELECT EXISTS(...)`.
pub fn exists_sql<E: Entity>(filter: &Filter) -> Sql {
    let mut q = sql(format!("SELECT 1 FROM {}", E::TABLE));
    filter.append_where(&mut q);
    q
}

fn find_sql<E: Entity>(id: i64) -> Sql {
    let mut q = sql(E::SELECT);
    q.push(" WHERE ").push(ID_COLUMN).push(" = ");
    Value::Int(id).push_to(&mut q);
    q
}

impl<C, E> RowSource<E> for PgSource<C>
where
    C: GenericClient,
    E: Entity + FromRow,
{
    async fn fetch(&self, window: &Window) -> RelayResult<Vec<E>> {
        let rows = window_sql::<E>(window).fetch_all_as(&self.client).await?;
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> RelayResult<i64> {
        let total = count_sql::<E>(filter).fetch_scalar_one(&self.client).await?;
        Ok(total)
    }

    async fn exists(&self, filter: &Filter) -> RelayResult<bool> {
        let found = exists_sql::<E>(filter).exists(&self.client).await?;
        Ok(found)
    }

    async fn find(&self, id: i64) -> RelayResult<Option<E>> {
        let row = find_sql::<E>(id).fetch_opt_as(&self.client).await?;
        Ok(row)
    }
}
