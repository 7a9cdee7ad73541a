//! pgdeps core
//!
//! Domain model shared by every pgdeps crate: catalog objects, the
//! dependency graph, configuration and the schema summary report.

pub mod object;
pub mod graph;
pub mod report;
pub mod config;

pub use object::{ObjectRef, ObjectKind, ObjectDefinition, ForeignKeyRef, UnknownObjectKind, normalize_definition};
pub use graph::{DependencyGraph, DependencyEdge, Relation};
pub use report::{SchemaReport, SummaryRow, ReportVersion};
pub use config::{Config, ConfigError, ConnectionConfig, CatalogConfig, RenderConfig, OutputFormat};
