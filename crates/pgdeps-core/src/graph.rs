//! Dependency graph model
//!
//! Nodes are unique by object identity and kept in insertion order so
//! that rendering is deterministic. Edges always point from the
//! referenced object to its dependent.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::object::ObjectRef;

/// Why one object depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The dependent's definition mentions the referenced object
    TextReference,

    /// The dependent table declares a foreign key to the referenced table
    ForeignKey,
}

/// A directed edge between two objects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Referenced object
    pub from: ObjectRef,

    /// Dependent object
    pub to: ObjectRef,

    /// Kind of relation
    pub relation: Relation,

    /// Constrained columns (foreign keys only)
    pub columns: Vec<String>,
}

impl DependencyEdge {
    /// Create a text-reference edge
    pub fn text_reference(from: ObjectRef, to: ObjectRef) -> Self {
        Self {
            from,
            to,
            relation: Relation::TextReference,
            columns: Vec::new(),
        }
    }

    /// Create a foreign-key edge carrying its column list
    pub fn foreign_key(from: ObjectRef, to: ObjectRef, columns: Vec<String>) -> Self {
        Self {
            from,
            to,
            relation: Relation::ForeignKey,
            columns,
        }
    }

    /// Edge label for rendering, if any
    pub fn label(&self) -> Option<String> {
        match self.relation {
            Relation::TextReference => None,
            Relation::ForeignKey => Some(self.columns.join(", ")),
        }
    }
}

/// Set of unique objects plus the edges between them
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in insertion order
    nodes: Vec<ObjectRef>,

    /// Position of each node in `nodes`
    index: HashMap<ObjectRef, usize>,

    /// Edges in insertion order
    edges: Vec<DependencyEdge>,

    /// Seen edges, for deduplication
    edge_set: HashSet<DependencyEdge>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if absent
    ///
    /// Returns `false` when an object with the same identity is already
    /// present; the first insertion wins, including its kind.
    pub fn insert_node(&mut self, node: ObjectRef) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }

        self.index.insert(node.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge, inserting both endpoints if needed
    ///
    /// Returns `false` if an identical edge (same endpoints, relation and
    /// columns) already exists.
    pub fn add_edge(&mut self, edge: DependencyEdge) -> bool {
        if self.edge_set.contains(&edge) {
            return false;
        }

        self.insert_node(edge.from.clone());
        self.insert_node(edge.to.clone());
        self.edge_set.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    /// Look up the stored node for an identity
    pub fn node(&self, object: &ObjectRef) -> Option<&ObjectRef> {
        self.index.get(object).map(|&i| &self.nodes[i])
    }

    /// Check whether the graph holds an object
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.index.contains_key(object)
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> &[ObjectRef] {
        &self.nodes
    }

    /// All edges, in insertion order
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectRef;

    #[test]
    fn node_insertion_is_idempotent() {
        let mut graph = DependencyGraph::new();
        assert!(graph.insert_node(ObjectRef::table("s", "t")));
        assert!(!graph.insert_node(ObjectRef::table("s", "t")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn first_insertion_keeps_its_kind() {
        let mut graph = DependencyGraph::new();
        graph.insert_node(ObjectRef::view("s", "v"));
        graph.insert_node(ObjectRef::table("s", "v"));

        let stored = graph.node(&ObjectRef::table("s", "v")).unwrap();
        assert_eq!(stored.kind, crate::object::ObjectKind::View);
    }

    #[test]
    fn edges_insert_their_endpoints() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(DependencyEdge::text_reference(
            ObjectRef::table("s", "t"),
            ObjectRef::view("s", "v"),
        ));

        assert!(graph.contains(&ObjectRef::table("s", "t")));
        assert!(graph.contains(&ObjectRef::view("s", "v")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn text_and_foreign_key_edges_coexist() {
        let t = ObjectRef::table("s", "t");
        let u = ObjectRef::table("s", "u");
        let mut graph = DependencyGraph::new();

        assert!(graph.add_edge(DependencyEdge::text_reference(t.clone(), u.clone())));
        assert!(graph.add_edge(DependencyEdge::foreign_key(t.clone(), u.clone(), vec!["id".into()])));
        assert!(!graph.add_edge(DependencyEdge::foreign_key(t.clone(), u.clone(), vec!["id".into()])));
        assert!(graph.add_edge(DependencyEdge::foreign_key(t, u, vec!["other_id".into()])));

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn edge_labels() {
        let t = ObjectRef::table("s", "t");
        let u = ObjectRef::table("s", "u");
        let fk = DependencyEdge::foreign_key(t.clone(), u.clone(), vec!["a".into(), "b".into()]);
        assert_eq!(fk.label().as_deref(), Some("a, b"));
        assert_eq!(DependencyEdge::text_reference(t, u).label(), None);
    }
}
