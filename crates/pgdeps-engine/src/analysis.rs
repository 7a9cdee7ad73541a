//! Cascaded analysis of one root object

use pgdeps_catalog::CatalogAdapter;
use pgdeps_core::{DependencyGraph, ObjectRef};
use crate::builder::GraphBuilder;
use crate::error::ResolveError;
use crate::foreign_key::{ForeignKeyResolver, ForeignKeys};
use crate::resolver::{Dependents, DependencyResolver};

/// Everything resolved for one root object
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The root, as found in the catalog
    pub root: ObjectRef,

    /// Text-reference dependents, in breadth-first order
    pub dependents: Vec<Dependents>,

    /// Tables referencing the root through foreign keys
    pub foreign_keys: ForeignKeys,

    /// Merged graph, root first
    pub graph: DependencyGraph,
}

impl Analysis {
    /// Number of distinct objects depending on the root
    pub fn dependent_count(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }
}

/// Resolve the dependents and foreign keys of `schema.name` and merge them
/// into one graph
///
/// Fails with `ObjectNotFound` when the schema has no such table or view;
/// nothing else is queried in that case.
pub async fn analyze(
    catalog: &dyn CatalogAdapter,
    schema: &str,
    name: &str,
) -> Result<Analysis, ResolveError> {
    let root = catalog.find_object(schema, name).await?;
    tracing::info!(root = %root, kind = %root.kind, "analyzing dependents");

    let dependents = DependencyResolver::new(catalog).transitive_children(&root).await?;
    let foreign_keys = ForeignKeyResolver::new(catalog)
        .foreign_key_references_to(&root)
        .await?;

    let mut builder = GraphBuilder::with_root(&root);
    builder.add_dependents(&dependents).add_foreign_keys(&foreign_keys);
    let graph = builder.build();

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "dependency graph built"
    );

    Ok(Analysis {
        root,
        dependents,
        foreign_keys,
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgdeps_catalog::MockCatalog;

    #[tokio::test]
    async fn unknown_root_is_not_found() {
        let catalog = MockCatalog::builder().with_table("s", "t").build();

        let err = analyze(&catalog, "s", "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(catalog.definition_fetches(), 0);
    }

    #[tokio::test]
    async fn isolated_table_has_only_root() {
        let catalog = MockCatalog::builder().with_table("s", "t").build();

        let analysis = analyze(&catalog, "s", "t").await.unwrap();
        assert_eq!(analysis.graph.nodes(), &[ObjectRef::table("s", "t")]);
        assert_eq!(analysis.dependent_count(), 0);
        assert!(analysis.dependents.is_empty());
        assert!(analysis.foreign_keys.is_empty());
    }

    #[tokio::test]
    async fn view_as_root() {
        let catalog = MockCatalog::builder()
            .with_table("s", "t")
            .with_view("s", "v", " SELECT * FROM s.t")
            .with_function("s", "report", "RETURN QUERY SELECT * FROM s.v;")
            .build();

        let analysis = analyze(&catalog, "s", "v").await.unwrap();
        assert_eq!(analysis.root, ObjectRef::view("s", "v"));
        assert_eq!(analysis.graph.nodes()[0].kind, pgdeps_core::ObjectKind::View);
        assert_eq!(analysis.dependent_count(), 1);
    }
}
