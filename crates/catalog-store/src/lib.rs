//! # catalog-store
//!
//! Postgres plumbing shared by the catalog services.
//!
//! - **SQL first**: statements are composed with [`Sql`], values are always bound
//! - **Row mapping**: Row → struct via [`FromRow`] and [`RowExt`]
//! - **Client agnostic**: anything implementing [`GenericClient`] runs a query,
//!   including transactions and pooled connections
//! - **Observable**: wrap a client in [`TracedClient`] to log every statement
//!
//! ```ignore
//! use catalog_store::{OrderBy, OrderItem, SortDir, sql};
//!
//! let mut q = sql("SELECT id, title FROM items WHERE publisher_id = ");
//! q.push_bind(7_i64);
//! OrderBy::new()
//!     .add(OrderItem::new("release_date", SortDir::Desc))
//!     .add(OrderItem::new("id", SortDir::Desc))
//!     .append_to_sql(&mut q);
//! q.limit(21);
//! let rows = q.fetch_all(&client).await?;
//! ```

pub mod client;
pub mod error;
pub mod order;
pub mod row;
pub mod sql;
pub mod trace;

pub use client::GenericClient;
pub use error::{StoreError, StoreResult};
pub use order::{NullsOrder, OrderBy, OrderItem, SortDir};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};
pub use trace::{TraceConfig, TracedClient};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "pool")]
pub use deadpool_postgres;

pub use tokio_postgres;
