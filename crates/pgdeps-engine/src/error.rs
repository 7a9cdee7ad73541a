//! Engine error types

use pgdeps_catalog::CatalogError;

/// Errors raised while resolving dependencies
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Cannot build reference pattern for {object}: {source}")]
    Pattern {
        object: String,
        #[source]
        source: regex::Error,
    },
}

impl ResolveError {
    /// Check whether the error means the requested object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Catalog(CatalogError::ObjectNotFound(_)))
    }
}

/// Errors raised while writing or rendering a graph
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graphviz executable '{0}' not found. Install Graphviz or use --format dot")]
    GraphvizNotFound(String),

    #[error("Graphviz failed ({status}): {stderr}")]
    GraphvizFailed { status: String, stderr: String },
}
