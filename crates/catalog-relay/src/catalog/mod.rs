//! The two catalog connections and single-row lookups.

pub mod item;
pub mod performer;

pub use item::{ITEM_PERFORMERS, ITEM_TAGS, Item, ItemQueryOptions};
pub use performer::{Performer, PerformerQueryOptions};

use crate::config::PaginationConfig;
use crate::connection::Connection;
use crate::engine::{PageRequest, paginate};
use crate::entity::Entity;
use crate::error::RelayResult;
use crate::filter::{Filter, Fragment};
use crate::sort::Sorting;
use crate::source::RowSource;
use crate::window::Window;

/// Upstream feed identifier column, unique where present.
const DMM_ID_COLUMN: &str = "dmm_id";

/// Catalog read service over a row source.
///
/// # Example
///
/// ```ignore
/// use catalog_relay::{Catalog, ItemQueryOptions, PgSource};
///
/// let client = pool.get().await?;
/// let catalog = Catalog::new(PgSource::new(client));
/// let page = catalog.items(&ItemQueryOptions::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    source: S,
    config: PaginationConfig,
}

impl<S> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: PaginationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PaginationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Page through items.
    pub async fn items(&self, options: &ItemQueryOptions) -> RelayResult<Connection<Item>>
    where
        S: RowSource<Item>,
    {
        let request = PageRequest {
            filter: options.filter()?,
            sorting: options.sorting(),
            args: options.page.clone(),
        };
        paginate(&self.source, &self.config, &request).await
    }

    pub async fn item(&self, id: i64) -> RelayResult<Option<Item>>
    where
        S: RowSource<Item>,
    {
        RowSource::<Item>::find(&self.source, id).await
    }

    pub async fn item_by_dmm_id(&self, dmm_id: &str) -> RelayResult<Option<Item>>
    where
        S: RowSource<Item>,
    {
        find_by_dmm_id::<Item, S>(&self.source, dmm_id).await
    }

    /// Page through performers.
    pub async fn performers(
        &self,
        options: &PerformerQueryOptions,
    ) -> RelayResult<Connection<Performer>>
    where
        S: RowSource<Performer>,
    {
        let request = PageRequest {
            filter: options.filter()?,
            sorting: options.sorting(),
            args: options.page.clone(),
        };
        paginate(&self.source, &self.config, &request).await
    }

    pub async fn performer(&self, id: i64) -> RelayResult<Option<Performer>>
    where
        S: RowSource<Performer>,
    {
        RowSource::<Performer>::find(&self.source, id).await
    }

    pub async fn performer_by_dmm_id(&self, dmm_id: &str) -> RelayResult<Option<Performer>>
    where
        S: RowSource<Performer>,
    {
        find_by_dmm_id::<Performer, S>(&self.source, dmm_id).await
    }
}

async fn find_by_dmm_id<E, S>(source: &S, dmm_id: &str) -> RelayResult<Option<E>>
where
    E: Entity,
    S: RowSource<E>,
{
    let window = Window {
        filter: Filter::new().with(Fragment::eq(DMM_ID_COLUMN, dmm_id)),
        sorting: Sorting::default(),
        limit: 1,
    };
    let rows = source.fetch(&window).await?;
    Ok(rows.into_iter().next())
}
