//! Database object model
//!
//! Catalog rows are turned into these typed value objects as soon as they
//! leave the database adapter. Nothing downstream sees raw rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Kind of a catalog object
///
/// Variant order is significant: it is the ordering used when sorting
/// dependents, so functions come before views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Stored function or procedure
    Function,

    /// Base table
    Table,

    /// View (plain or materialized)
    View,
}

impl ObjectKind {
    /// Stable upper-case label, as used by the catalog queries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "FUNCTION",
            Self::Table => "TABLE",
            Self::View => "VIEW",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a catalog kind label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown object kind: {0}")]
pub struct UnknownObjectKind(pub String);

impl FromStr for ObjectKind {
    type Err = UnknownObjectKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FUNCTION" | "PROCEDURE" => Ok(Self::Function),
            "TABLE" | "BASE TABLE" => Ok(Self::Table),
            "VIEW" | "MATERIALIZED VIEW" => Ok(Self::View),
            _ => Err(UnknownObjectKind(s.to_string())),
        }
    }
}

/// Reference to a table, view or function
///
/// Identity is `(schema, name)`. The kind only drives matching and
/// rendering, so two refs that differ only by kind compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Schema (namespace) name
    pub schema: String,

    /// Object name
    pub name: String,

    /// Object kind
    pub kind: ObjectKind,
}

impl ObjectRef {
    /// Create a new object reference
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
        }
    }

    /// Shorthand for a table reference
    pub fn table(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(schema, name, ObjectKind::Table)
    }

    /// Shorthand for a view reference
    pub fn view(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(schema, name, ObjectKind::View)
    }

    /// Shorthand for a function reference
    pub fn function(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(schema, name, ObjectKind::Function)
    }

    /// Get the qualified name (`schema.name`)
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Check whether this ref names the given object
    pub fn is(&self, schema: &str, name: &str) -> bool {
        self.schema == schema && self.name == name
    }

    /// Key used to order dependents deterministically
    pub fn sort_key(&self) -> (ObjectKind, &str, &str) {
        (self.kind, self.schema.as_str(), self.name.as_str())
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.name == other.name
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Source text of a view or function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// The object the text belongs to
    pub object: ObjectRef,

    /// Definition with line breaks collapsed to single spaces
    pub definition: String,
}

impl ObjectDefinition {
    /// Create a definition, normalizing its text
    pub fn new(object: ObjectRef, definition: impl AsRef<str>) -> Self {
        Self {
            object,
            definition: normalize_definition(definition.as_ref()),
        }
    }
}

/// Collapse every run of `\r`/`\n` into a single space
///
/// Other whitespace is kept as is.
pub fn normalize_definition(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;

    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }

    out
}

/// A foreign-key constraint pointing at some table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// The referencing table
    pub table: ObjectRef,

    /// Constrained columns of the referencing table, in declaration order
    pub columns: Vec<String>,
}

impl ForeignKeyRef {
    /// Create a new foreign-key reference
    pub fn new<I, S>(table: ObjectRef, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Columns joined for display (`a, b`)
    pub fn column_label(&self) -> String {
        self.columns.join(", ")
    }
}
