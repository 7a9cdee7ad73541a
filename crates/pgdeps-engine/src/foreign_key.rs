//! Foreign-key lookup
//!
//! Single hop only: tables referencing the referencing tables are not
//! followed.

use pgdeps_catalog::{CatalogAdapter, CatalogError};
use pgdeps_core::{ForeignKeyRef, ObjectRef};

/// Tables holding foreign keys to one object
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeys {
    /// The referenced object
    pub object: ObjectRef,

    /// One entry per constraint, ordered by referencing schema and table
    pub references: Vec<ForeignKeyRef>,
}

impl ForeignKeys {
    /// Number of referencing constraints
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Check if nothing references the object
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Resolves foreign-key references through a catalog
pub struct ForeignKeyResolver<'a> {
    catalog: &'a dyn CatalogAdapter,
}

impl<'a> ForeignKeyResolver<'a> {
    /// Create a resolver over a catalog
    pub fn new(catalog: &'a dyn CatalogAdapter) -> Self {
        Self { catalog }
    }

    /// Foreign keys whose target is `object`
    ///
    /// Returns an empty list when nothing references the object.
    pub async fn foreign_key_references_to(&self, object: &ObjectRef) -> Result<ForeignKeys, CatalogError> {
        let references = self.catalog.foreign_keys_to(object).await?;

        if !references.is_empty() {
            tracing::debug!("OBJECT: {}", object);
            for fk in &references {
                tracing::debug!("\t- REFERENCED BY: {} ({})", fk.table, fk.column_label());
            }
        }

        Ok(ForeignKeys {
            object: object.clone(),
            references,
        })
    }
}
