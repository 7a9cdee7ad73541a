//! pgdeps engine - dependency resolution and rendering
//!
//! This crate implements the main logic of pgdeps:
//! - Lexical reference matching
//! - Breadth-first dependent resolution
//! - Foreign-key lookup
//! - Graph assembly and DOT rendering
//! - Whole-schema summaries

pub mod analysis;
pub mod builder;
pub mod dot;
pub mod error;
pub mod foreign_key;
pub mod matcher;
pub mod render;
pub mod resolver;
pub mod summary;

pub use analysis::{analyze, Analysis};
pub use builder::GraphBuilder;
pub use dot::{node_style, to_dot, DotGenerator, NodeStyle};
pub use error::{RenderError, ResolveError};
pub use foreign_key::{ForeignKeyResolver, ForeignKeys};
pub use matcher::{matches, ReferencePattern};
pub use render::Renderer;
pub use resolver::{children_in, transitive_children_in, Dependents, DependencyResolver, VisitedSet};
pub use summary::summarize_schema;
