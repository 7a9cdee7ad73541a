//! Graph assembly from resolver output

use pgdeps_core::{DependencyEdge, DependencyGraph, ObjectRef};
use crate::foreign_key::ForeignKeys;
use crate::resolver::Dependents;

/// Merges dependents and foreign keys into one [`DependencyGraph`]
///
/// Nodes are inserted if absent, so an object reached several ways is
/// declared once, with the kind it was first seen with.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DependencyGraph,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose first node is `root`
    ///
    /// The root then appears in the graph even when nothing depends on it.
    pub fn with_root(root: &ObjectRef) -> Self {
        let mut builder = Self::new();
        builder.graph.insert_node(root.clone());
        builder
    }

    /// Add text-reference edges for every resolved level
    pub fn add_dependents(&mut self, levels: &[Dependents]) -> &mut Self {
        for level in levels {
            self.graph.insert_node(level.object.clone());

            for child in &level.children {
                self.graph.insert_node(child.clone());
                self.graph
                    .add_edge(DependencyEdge::text_reference(level.object.clone(), child.clone()));
            }
        }
        self
    }

    /// Add one foreign-key edge per referencing constraint
    pub fn add_foreign_keys(&mut self, foreign_keys: &ForeignKeys) -> &mut Self {
        self.graph.insert_node(foreign_keys.object.clone());

        for fk in &foreign_keys.references {
            self.graph.insert_node(fk.table.clone());
            self.graph.add_edge(DependencyEdge::foreign_key(
                foreign_keys.object.clone(),
                fk.table.clone(),
                fk.columns.clone(),
            ));
        }
        self
    }

    /// Finish building
    pub fn build(self) -> DependencyGraph {
        self.graph
    }
}
