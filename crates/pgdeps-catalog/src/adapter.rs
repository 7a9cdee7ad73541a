//! Catalog adapter trait for reading object metadata

use pgdeps_core::{ForeignKeyRef, ObjectDefinition, ObjectRef};

/// Errors that can occur when reading the catalog
///
/// Every variant is fatal to a run; nothing is retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Query failed: {0}")]
    QueryFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Read-only access to the system catalogs
///
/// Implementations apply the configured namespace and function-name
/// exclusions in `fetch_definitions`, so callers never see reserved
/// objects as dependency sources.
#[async_trait::async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Get the adapter name (e.g., "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Test the connection to the database
    async fn test_connection(&self) -> Result<(), CatalogError>;

    /// List the tables and views of a schema, ordered by name
    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectRef>, CatalogError>;

    /// Fetch the normalized definition of every view and function that may
    /// reference another object
    async fn fetch_definitions(&self) -> Result<Vec<ObjectDefinition>, CatalogError>;

    /// Fetch the foreign keys whose target is `object`
    ///
    /// One entry per constraint, columns in declaration order, ordered by
    /// referencing schema and table.
    async fn foreign_keys_to(&self, object: &ObjectRef) -> Result<Vec<ForeignKeyRef>, CatalogError>;

    /// Find a table or view of a schema by name
    async fn find_object(&self, schema: &str, name: &str) -> Result<ObjectRef, CatalogError> {
        self.list_objects(schema)
            .await?
            .into_iter()
            .find(|o| o.is(schema, name))
            .ok_or_else(|| CatalogError::ObjectNotFound(format!("{}.{}", schema, name)))
    }
}
