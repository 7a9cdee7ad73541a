//! Catalog access for pgdeps
//!
//! Adapters that read object lists, view/function source text and
//! foreign-key constraints from a database's system catalogs.
//!
//! ## Features
//!
//! - `postgres` (default) - PostgreSQL support via `tokio-postgres`
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgdeps_catalog::{CatalogAdapter, PostgresCatalog};
//!
//! let catalog = PostgresCatalog::connect("localhost", 5432, "mydb", "me", None).await?;
//! let objects = catalog.list_objects("sales").await?;
//! ```

pub mod adapter;
pub mod mock;
pub mod postgres;

pub use adapter::{CatalogAdapter, CatalogError};
pub use mock::{MockCatalog, MockCatalogBuilder};
pub use postgres::PostgresCatalog;
