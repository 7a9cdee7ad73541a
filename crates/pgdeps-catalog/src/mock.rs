//! In-memory catalog for testing
//!
//! Holds tables, views, functions and foreign keys without connecting to
//! any database. Exclusions are applied the same way the PostgreSQL
//! adapter applies them in SQL, so resolver tests see identical behavior.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pgdeps_catalog::{MockCatalog, CatalogAdapter};
//!
//! let catalog = MockCatalog::builder()
//!     .with_table("s", "t")
//!     .with_view("s", "v", "SELECT * FROM s.t")
//!     .with_foreign_key("s", "t", "s", "u", ["id"])
//!     .build();
//!
//! let objects = catalog.list_objects("s").await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! let catalog = MockCatalog::new().with_connection_failure();
//! assert!(catalog.test_connection().await.is_err());
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use pgdeps_core::{CatalogConfig, ForeignKeyRef, ObjectDefinition, ObjectKind, ObjectRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Catalog contents shared between clones
#[derive(Debug, Default)]
struct MockState {
    /// Tables and views, in insertion order
    relations: Vec<ObjectRef>,

    /// View and function bodies
    definitions: Vec<ObjectDefinition>,

    /// Foreign keys keyed by the qualified name of the referenced table
    foreign_keys: HashMap<String, Vec<ForeignKeyRef>>,

    /// Errors to return for specific qualified names
    errors: HashMap<String, CatalogError>,
}

/// Mock catalog adapter for testing
pub struct MockCatalog {
    state: Arc<RwLock<MockState>>,

    /// Number of `fetch_definitions` calls served
    definition_fetches: Arc<AtomicUsize>,

    /// Namespace and function exclusions
    exclusions: CatalogConfig,

    /// Simulate connection failure
    fail_connection: bool,
}

impl MockCatalog {
    /// Create an empty mock catalog with default exclusions
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            definition_fetches: Arc::new(AtomicUsize::new(0)),
            exclusions: CatalogConfig::default(),
            fail_connection: false,
        }
    }

    /// Start building a mock catalog
    pub fn builder() -> MockCatalogBuilder {
        MockCatalogBuilder::new()
    }

    /// Add a table or view to its schema listing
    pub async fn add_relation(&self, object: ObjectRef) {
        self.state.write().await.relations.push(object);
    }

    /// Add a view or function body
    ///
    /// Views are also listed as relations of their schema.
    pub async fn add_definition(&self, object: ObjectRef, definition: &str) {
        let mut state = self.state.write().await;
        if object.kind == ObjectKind::View {
            state.relations.push(object.clone());
        }
        state.definitions.push(ObjectDefinition::new(object, definition));
    }

    /// Add a foreign key from `fk.table` to `target`
    pub async fn add_foreign_key(&self, target: &ObjectRef, fk: ForeignKeyRef) {
        self.state
            .write()
            .await
            .foreign_keys
            .entry(target.qualified_name())
            .or_default()
            .push(fk);
    }

    /// Configure an error for queries about a specific object or schema
    ///
    /// The key is either `schema` (for `list_objects`) or `schema.name`
    /// (for `foreign_keys_to`).
    pub async fn add_error(&self, key: impl Into<String>, error: CatalogError) {
        self.state.write().await.errors.insert(key.into(), error);
    }

    /// Replace the namespace and function exclusions
    pub fn with_exclusions(mut self, exclusions: CatalogConfig) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Number of times the definitions were fetched
    pub fn definition_fetches(&self) -> usize {
        self.definition_fetches.load(Ordering::SeqCst)
    }

    async fn check_error(&self, key: &str) -> Result<(), CatalogError> {
        match self.state.read().await.errors.get(key) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockCatalog {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            definition_fetches: Arc::clone(&self.definition_fetches),
            exclusions: self.exclusions.clone(),
            fail_connection: self.fail_connection,
        }
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {

        if self.fail_connection {
            Err(CatalogError::ConnectionFailure(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectRef>, CatalogError> {
        self.check_error(schema).await?;

        let state = self.state.read().await;
        let mut objects: Vec<ObjectRef> = state
            .relations
            .iter()
            .filter(|o| o.schema == schema)
            .cloned()
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        objects.dedup();
        Ok(objects)
    }

    async fn fetch_definitions(&self) -> Result<Vec<ObjectDefinition>, CatalogError> {
        self.definition_fetches.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        Ok(state
            .definitions
            .iter()
            .filter(|d| !self.exclusions.is_schema_excluded(&d.object.schema))
            .filter(|d| {
                d.object.kind != ObjectKind::Function
                    || !self.exclusions.is_function_excluded(&d.object.name)
            })
            .cloned()
            .collect())
    }

    async fn foreign_keys_to(&self, object: &ObjectRef) -> Result<Vec<ForeignKeyRef>, CatalogError> {
        let key = object.qualified_name();
        self.check_error(&key).await?;

        let state = self.state.read().await;
        let mut fks = state.foreign_keys.get(&key).cloned().unwrap_or_default();
        fks.sort_by(|a, b| {
            (&a.table.schema, &a.table.name).cmp(&(&b.table.schema, &b.table.name))
        });
        Ok(fks)
    }
}

/// Builder for creating a MockCatalog with predefined contents
///
/// # Example
///
/// ```rust,ignore
/// let catalog = MockCatalogBuilder::new()
///     .with_table("sales", "orders")
///     .with_view("sales", "open_orders", "SELECT * FROM sales.orders WHERE NOT closed")
///     .with_function("sales", "close_order", "UPDATE sales.orders SET closed = true")
///     .build();
/// ```
pub struct MockCatalogBuilder {
    state: MockState,
    exclusions: CatalogConfig,
    fail_connection: bool,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            state: MockState::default(),
            exclusions: CatalogConfig::default(),
            fail_connection: false,
        }
    }

    /// Add a base table
    pub fn with_table(mut self, schema: &str, name: &str) -> Self {
        self.state.relations.push(ObjectRef::table(schema, name));
        self
    }

    /// Add a view and its definition
    pub fn with_view(mut self, schema: &str, name: &str, definition: &str) -> Self {
        let view = ObjectRef::view(schema, name);
        self.state.relations.push(view.clone());
        self.state.definitions.push(ObjectDefinition::new(view, definition));
        self
    }

    /// Add a function and its definition
    pub fn with_function(mut self, schema: &str, name: &str, definition: &str) -> Self {
        self.state
            .definitions
            .push(ObjectDefinition::new(ObjectRef::function(schema, name), definition));
        self
    }

    /// Add a foreign key on `columns` of `schema.table` referencing
    /// `target_schema.target`
    pub fn with_foreign_key<I, S>(
        mut self,
        target_schema: &str,
        target: &str,
        schema: &str,
        table: &str,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .foreign_keys
            .entry(format!("{}.{}", target_schema, target))
            .or_default()
            .push(ForeignKeyRef::new(ObjectRef::table(schema, table), columns));
        self
    }

    /// Add an error for a schema or qualified object name
    pub fn with_error(mut self, key: &str, error: CatalogError) -> Self {
        self.state.errors.insert(key.to_string(), error);
        self
    }

    /// Replace the exclusions
    pub fn with_exclusions(mut self, exclusions: CatalogConfig) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Build the MockCatalog
    pub fn build(self) -> MockCatalog {
        MockCatalog {
            state: Arc::new(RwLock::new(self.state)),
            definition_fetches: Arc::new(AtomicUsize::new(0)),
            exclusions: self.exclusions,
            fail_connection: self.fail_connection,
        }
    }
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_objects_filters_and_sorts() {
        let catalog = MockCatalog::builder()
            .with_table("s", "zeta")
            .with_view("s", "alpha", "SELECT 1")
            .with_table("other", "beta")
            .with_function("s", "f", "SELECT 1")
            .build();

        let objects = catalog.list_objects("s").await.unwrap();
        let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(objects[0].kind, ObjectKind::View);
    }

    #[tokio::test]
    async fn test_definitions_respect_exclusions() {
        let catalog = MockCatalog::builder()
            .with_view("public", "pv", "SELECT * FROM s.t")
            .with_view("s", "v", "SELECT * FROM s.t")
            .with_function("s", "nmul", "SELECT * FROM s.t")
            .with_function("s", "f", "SELECT * FROM s.t")
            .build();

        let defs = catalog.fetch_definitions().await.unwrap();
        let names: Vec<String> = defs.iter().map(|d| d.object.qualified_name()).collect();
        assert_eq!(names, vec!["s.v", "s.f"]);
        assert_eq!(catalog.definition_fetches(), 1);
    }

    #[tokio::test]
    async fn test_custom_exclusions() {
        let catalog = MockCatalog::builder()
            .with_view("public", "pv", "SELECT 1")
            .with_view("audit", "av", "SELECT 1")
            .with_exclusions(CatalogConfig {
                excluded_schemas: vec!["audit".to_string()],
                excluded_functions: Vec::new(),
            })
            .build();

        let defs = catalog.fetch_definitions().await.unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].object.schema, "public");
    }

    #[tokio::test]
    async fn test_foreign_keys_sorted_by_table() {
        let catalog = MockCatalog::builder()
            .with_foreign_key("s", "t", "s", "zed", ["t_id"])
            .with_foreign_key("s", "t", "s", "abc", ["a", "b"])
            .build();

        let fks = catalog.foreign_keys_to(&ObjectRef::table("s", "t")).await.unwrap();
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].table.name, "abc");
        assert_eq!(fks[0].columns, vec!["a", "b"]);

        let none = catalog.foreign_keys_to(&ObjectRef::table("s", "u")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_configured_errors() {
        let catalog = MockCatalog::builder()
            .with_error("broken", CatalogError::QueryFailure("boom".to_string()))
            .build();

        let result = catalog.list_objects("broken").await;
        assert!(matches!(result, Err(CatalogError::QueryFailure(_))));
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let catalog = MockCatalog::new();
        let clone = catalog.clone();
        clone.add_relation(ObjectRef::table("s", "t")).await;
        clone.add_definition(ObjectRef::view("s", "v"), "SELECT * FROM s.t").await;

        assert_eq!(catalog.list_objects("s").await.unwrap().len(), 2);
        assert_eq!(catalog.fetch_definitions().await.unwrap().len(), 1);
        assert_eq!(clone.definition_fetches(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let catalog = MockCatalog::new().with_connection_failure();
        assert!(matches!(
            catalog.test_connection().await,
            Err(CatalogError::ConnectionFailure(_))
        ));
    }
}
