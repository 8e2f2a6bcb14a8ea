//! # catalog-relay
//!
//! Relay-style cursor pagination over the catalog.
//!
//! A request resolves into a base [`Filter`] (an immutable conjunction of
//! predicate fragments) and a [`Sorting`] (the requested key plus an `id`
//! tie-break). The engine then reads one window of `limit + 1` rows past the
//! cursor, counts the whole filtered set and, for forward pages, probes for
//! rows before the cursor, all concurrently, and packages the result as a
//! [`Connection`].
//!
//! ```ignore
//! use catalog_relay::{Catalog, ItemQueryOptions, PgSource};
//!
//! let catalog = Catalog::new(PgSource::new(client));
//! let options: ItemQueryOptions = serde_json::from_str(
//!     r#"{"first": 10, "performerIds": [3, 8], "sortBy": "releaseDate", "sortOrder": "DESC"}"#,
//! )?;
//! let page = catalog.items(&options).await?;
//! println!("{} of {}", page.edges.len(), page.total_count);
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod count;
pub mod cursor;
pub mod engine;
pub mod entity;
pub mod error;
pub mod filter;
pub mod sort;
pub mod source;
pub mod value;
pub mod window;

pub use catalog::{Catalog, Item, ItemQueryOptions, Performer, PerformerQueryOptions};
pub use config::PaginationConfig;
pub use connection::{Connection, Edge, PageInfo};
pub use engine::{PageRequest, paginate};
pub use entity::{Entity, ManyToMany, SortField};
pub use error::{RelayError, RelayResult};
pub use filter::{CompareOp, Filter, Fragment, Membership, Seek};
pub use sort::{SortOrder, Sorting};
pub use source::{MemorySource, PgSource, RowSource};
pub use value::{Loose, Value};
pub use window::{Direction, PageArgs, PagePlan, Window};
