//! Whole-schema summary report
//!
//! This schema is versioned. Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::object::{ObjectKind, ObjectRef};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// One-hop counts for a single table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Object name (without schema)
    pub name: String,

    /// Table or view
    pub kind: ObjectKind,

    /// Number of views and functions referencing the object directly
    pub first_stage_links: usize,

    /// Number of foreign keys pointing at the object
    pub foreign_keys: usize,
}

impl SummaryRow {
    /// Create a row for an object
    pub fn new(object: &ObjectRef, first_stage_links: usize, foreign_keys: usize) -> Self {
        Self {
            name: object.name.clone(),
            kind: object.kind,
            first_stage_links,
            foreign_keys,
        }
    }
}

/// Summary of every table and view in one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Inspected schema
    pub schema: String,

    /// One row per object, ordered by name
    pub rows: Vec<SummaryRow>,
}

impl SchemaReport {
    /// Create a report from computed rows
    pub fn new(schema: impl Into<String>, rows: Vec<SummaryRow>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            schema: schema.into(),
            rows,
        }
    }

    /// Find the row of an object
    pub fn row(&self, name: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Total first-stage links across the schema
    pub fn total_links(&self) -> usize {
        self.rows.iter().map(|r| r.first_stage_links).sum()
    }

    /// Total foreign keys across the schema
    pub fn total_foreign_keys(&self) -> usize {
        self.rows.iter().map(|r| r.foreign_keys).sum()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
