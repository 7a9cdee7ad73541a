//! Configuration schema (pgdeps.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Role to connect as (defaults to `$USER`)
    #[serde(default)]
    pub user: Option<String>,

    /// Database to connect to (defaults to `$USER`)
    #[serde(default)]
    pub database: Option<String>,

    /// Password, if stored in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Connect over TLS
    #[serde(default)]
    pub tls: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            database: None,
            password: None,
            tls: false,
        }
    }
}

/// Namespaces and names excluded from dependency sources
///
/// Objects matching these rules are filtered out by the catalog query and
/// never reported as dependents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Schemas whose views and functions are ignored
    #[serde(default = "default_excluded_schemas")]
    pub excluded_schemas: Vec<String>,

    /// Function names that are ignored in every schema
    #[serde(default = "default_excluded_functions")]
    pub excluded_functions: Vec<String>,
}

fn default_excluded_schemas() -> Vec<String> {
    vec![
        "public".to_string(),
        "information_schema".to_string(),
        "pg_catalog".to_string(),
    ]
}

fn default_excluded_functions() -> Vec<String> {
    vec!["nmul".to_string()]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            excluded_schemas: default_excluded_schemas(),
            excluded_functions: default_excluded_functions(),
        }
    }
}

impl CatalogConfig {
    /// Check if objects of a schema may act as dependency sources
    pub fn is_schema_excluded(&self, schema: &str) -> bool {
        self.excluded_schemas.iter().any(|s| s == schema)
    }

    /// Check if a function name is reserved
    pub fn is_function_excluded(&self, name: &str) -> bool {
        self.excluded_functions.iter().any(|f| f == name)
    }
}

/// Output format of a rendered graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PDF document
    #[default]
    Pdf,

    /// PNG image
    Png,

    /// SVG image
    Svg,

    /// Raw DOT source, no Graphviz run
    Dot,
}

impl OutputFormat {
    /// File extension and Graphviz `-T` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Dot => "dot",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "dot" | "gv" => Ok(Self::Dot),
            other => Err(ConfigError::ParseError(format!(
                "Unsupported output format '{}'. Supported: pdf, png, svg, dot",
                other
            ))),
        }
    }
}

/// Graph rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory the rendered file is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Graphviz rank direction
    #[serde(default = "default_rankdir")]
    pub rankdir: String,

    /// Graphviz page size, in inches
    #[serde(default = "default_size")]
    pub size: String,

    /// Keep the intermediate DOT file next to the output
    #[serde(default)]
    pub keep_dot: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_rankdir() -> String {
    "LR".to_string()
}

fn default_size() -> String {
    "8,5".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output_dir: default_output_dir(),
            rankdir: default_rankdir(),
            size: default_size(),
            keep_dot: false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Catalog filtering rules
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rendering settings
    #[serde(default)]
    pub render: RenderConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.render.format, OutputFormat::Pdf);
        assert_eq!(config.render.rankdir, "LR");
        assert!(config.catalog.is_schema_excluded("pg_catalog"));
        assert!(config.catalog.is_function_excluded("nmul"));
        assert!(!config.catalog.is_schema_excluded("sales"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [connection]
            host = "db.internal"
            user = "reporter"

            [render]
            format = "svg"
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.host, "db.internal");
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.connection.user.as_deref(), Some("reporter"));
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert_eq!(config.render.size, "8,5");
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn custom_exclusions() {
        let config = Config::from_toml(
            r#"
            [catalog]
            excluded_schemas = ["audit"]
            excluded_functions = []
            "#,
        )
        .unwrap();

        assert!(config.catalog.is_schema_excluded("audit"));
        assert!(!config.catalog.is_schema_excluded("public"));
        assert!(!config.catalog.is_function_excluded("nmul"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("[connection\nhost = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("gv".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert!("jpeg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgdeps.toml");

        let mut config = Config::default();
        config.connection.database = Some("warehouse".to_string());
        config.render.keep_dot = true;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
