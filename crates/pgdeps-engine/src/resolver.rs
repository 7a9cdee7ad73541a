//! Dependency resolution
//!
//! Finds the views and functions whose definitions reference an object,
//! then walks those dependents breadth-first to build the transitive
//! closure.

use std::collections::{HashSet, VecDeque};
use pgdeps_catalog::CatalogAdapter;
use pgdeps_core::{ObjectDefinition, ObjectRef};
use crate::error::ResolveError;
use crate::matcher::ReferencePattern;

/// Objects already expanded during one resolution run
///
/// Lives only as long as the `transitive_children` call that owns it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<ObjectRef>,
}

impl VisitedSet {
    /// Create a set holding only `root`
    pub fn with_root(root: &ObjectRef) -> Self {
        let mut set = Self::default();
        set.insert(root);
        set
    }

    /// Mark an object as visited; returns `false` if it already was
    pub fn insert(&mut self, object: &ObjectRef) -> bool {
        if self.seen.contains(object) {
            return false;
        }
        self.seen.insert(object.clone())
    }

    /// Check if an object was visited
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.seen.contains(object)
    }

    /// Number of visited objects
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing was visited
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Direct dependents of one object
#[derive(Debug, Clone, PartialEq)]
pub struct Dependents {
    /// The referenced object
    pub object: ObjectRef,

    /// Views and functions referencing it, ordered by kind, schema, name
    pub children: Vec<ObjectRef>,
}

/// Resolves text-reference dependents through a catalog
pub struct DependencyResolver<'a> {
    catalog: &'a dyn CatalogAdapter,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over a catalog
    pub fn new(catalog: &'a dyn CatalogAdapter) -> Self {
        Self { catalog }
    }

    /// Direct dependents of `object`
    pub async fn children_of(&self, object: &ObjectRef) -> Result<Vec<ObjectRef>, ResolveError> {
        let definitions = self.catalog.fetch_definitions().await?;
        children_in(&definitions, object)
    }

    /// All dependents of `root`, level by level
    ///
    /// Definitions are read once and reused for every level. Each object is
    /// expanded at most once, so reference cycles terminate. Only objects
    /// with at least one dependent produce an entry.
    pub async fn transitive_children(&self, root: &ObjectRef) -> Result<Vec<Dependents>, ResolveError> {
        let definitions = self.catalog.fetch_definitions().await?;
        transitive_children_in(&definitions, root)
    }
}

/// Direct dependents of `object` among `definitions`
///
/// The object's own definition is never counted, so a recursive function
/// is not its own dependent. Overloads sharing a name collapse into one
/// entry.
pub fn children_in(
    definitions: &[ObjectDefinition],
    object: &ObjectRef,
) -> Result<Vec<ObjectRef>, ResolveError> {
    let pattern = ReferencePattern::new(&object.schema, &object.name).map_err(|source| {
        ResolveError::Pattern {
            object: object.qualified_name(),
            source,
        }
    })?;

    let mut children: Vec<ObjectRef> = definitions
        .iter()
        .filter(|d| &d.object != object)
        .filter(|d| pattern.matches(&d.definition, &d.object.schema))
        .map(|d| d.object.clone())
        .collect();

    children.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut seen = HashSet::new();
    children.retain(|c| seen.insert(c.clone()));

    Ok(children)
}

/// Breadth-first closure of dependents of `root` among `definitions`
pub fn transitive_children_in(
    definitions: &[ObjectDefinition],
    root: &ObjectRef,
) -> Result<Vec<Dependents>, ResolveError> {
    let mut visited = VisitedSet::with_root(root);
    let mut queue = VecDeque::from([root.clone()]);
    let mut result = Vec::new();

    while let Some(current) = queue.pop_front() {
        let children = children_in(definitions, &current)?;
        if children.is_empty() {
            continue;
        }

        tracing::debug!("OBJECT: {}", current);
        for child in &children {
            tracing::debug!("\t- USED IN {}: {}", child.kind, child);

            if visited.insert(child) {
                queue.push_back(child.clone());
            }
        }

        result.push(Dependents {
            object: current,
            children,
        });
    }

    tracing::debug!(root = %root, expanded = visited.len(), "resolved dependents");
    Ok(result)
}
