//! PostgreSQL catalog adapter
//!
//! Reads object lists from `information_schema.tables`, view and function
//! source text from `pg_views`, `pg_matviews` and `pg_proc`, and foreign
//! keys from `pg_constraint`. All queries are parameterized and read-only.
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Using direct credentials
//! let catalog = PostgresCatalog::connect(
//!     "localhost",
//!     5432,
//!     "mydb",
//!     "username",
//!     Some("password"),
//! ).await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use pgdeps_core::{CatalogConfig, ForeignKeyRef, ObjectDefinition, ObjectKind, ObjectRef};

#[cfg(feature = "postgres")]
use tokio_postgres::{Client, Config as PgConfig, NoTls};

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

/// Tables, views and materialized views of one schema
const LIST_OBJECTS_SQL: &str = r#"
    SELECT
        table_schema::text AS schema_name,
        table_name::text AS name,
        table_type::text AS kind
    FROM information_schema.tables
    WHERE table_schema::text = $1
      AND table_type IN ('BASE TABLE', 'VIEW')
    UNION ALL
    SELECT
        schemaname::text,
        matviewname::text,
        'MATERIALIZED VIEW'::text
    FROM pg_catalog.pg_matviews
    WHERE schemaname::text = $1
    ORDER BY name ASC
"#;

/// Source text of every candidate dependent
///
/// `$1` is the list of excluded schemas, `$2` the reserved function names.
/// Aggregates and window functions have no body and are skipped.
const DEFINITIONS_SQL: &str = r#"
    SELECT
        'FUNCTION'::text AS kind,
        n.nspname::text AS schema_name,
        p.proname::text AS name,
        pg_get_functiondef(p.oid) AS definition
    FROM pg_catalog.pg_proc p
        INNER JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname::text <> ALL($1::text[])
      AND n.nspname NOT LIKE 'pg\_toast%'
      AND p.proname::text <> ALL($2::text[])
      AND p.prokind IN ('f', 'p')
    UNION ALL
    SELECT
        'VIEW'::text,
        v.schemaname::text,
        v.viewname::text,
        v.definition
    FROM pg_catalog.pg_views v
    WHERE v.schemaname::text <> ALL($1::text[])
    UNION ALL
    SELECT
        'VIEW'::text,
        m.schemaname::text,
        m.matviewname::text,
        m.definition
    FROM pg_catalog.pg_matviews m
    WHERE m.schemaname::text <> ALL($1::text[])
"#;

/// Foreign keys targeting one table, columns in declaration order
const FOREIGN_KEYS_SQL: &str = r#"
    SELECT
        src_ns.nspname::text AS schema_name,
        src.relname::text AS table_name,
        array_agg(att.attname::text ORDER BY key.ord) AS columns
    FROM pg_catalog.pg_constraint con
        INNER JOIN pg_catalog.pg_class src ON src.oid = con.conrelid
        INNER JOIN pg_catalog.pg_namespace src_ns ON src_ns.oid = src.relnamespace
        INNER JOIN pg_catalog.pg_class tgt ON tgt.oid = con.confrelid
        INNER JOIN pg_catalog.pg_namespace tgt_ns ON tgt_ns.oid = tgt.relnamespace
        CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS key(attnum, ord)
        INNER JOIN pg_catalog.pg_attribute att
            ON att.attrelid = con.conrelid AND att.attnum = key.attnum
    WHERE con.contype = 'f'
      AND tgt_ns.nspname::text = $1
      AND tgt.relname::text = $2
    GROUP BY con.oid, con.conname, src_ns.nspname, src.relname
    ORDER BY src_ns.nspname, src.relname, con.conname
"#;

/// PostgreSQL catalog adapter
///
/// Holds a single connection for the lifetime of the adapter. Queries are
/// issued one at a time.
pub struct PostgresCatalog {
    /// PostgreSQL client (only available with postgres feature)
    #[cfg(feature = "postgres")]
    client: Client,

    /// Namespace and function exclusions
    #[cfg_attr(not(feature = "postgres"), allow(dead_code))]
    exclusions: CatalogConfig,
}

impl PostgresCatalog {
    /// Connect with direct credentials
    ///
    /// # Arguments
    ///
    /// * `host` - PostgreSQL server hostname or IP
    /// * `port` - PostgreSQL server port (usually 5432)
    /// * `database` - Database name to connect to
    /// * `user` - Role to connect as
    /// * `password` - Password, if the server asks for one
    #[cfg(feature = "postgres")]
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let config = Self::build_config(host.into(), port, database.into(), user.into(), password);
        Self::connect_config(config, false).await
    }

    /// Connect with direct credentials over TLS
    #[cfg(feature = "postgres")]
    pub async fn connect_with_tls(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let config = Self::build_config(host.into(), port, database.into(), user.into(), password);
        Self::connect_config(config, true).await
    }

    #[cfg(feature = "postgres")]
    fn build_config(
        host: String,
        port: u16,
        database: String,
        user: String,
        password: Option<&str>,
    ) -> PgConfig {
        let mut config = PgConfig::new();
        config
            .host(&host)
            .port(port)
            .dbname(&database)
            .user(&user)
            .application_name("pgdeps");

        if let Some(password) = password {
            config.password(password);
        }

        config
    }

    #[cfg(feature = "postgres")]
    async fn connect_config(config: PgConfig, tls: bool) -> Result<Self, CatalogError> {
        // Extract connection info for logging
        let host = config
            .get_hosts()
            .first()
            .map(|h| match h {
                tokio_postgres::config::Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                tokio_postgres::config::Host::Unix(path) => path.display().to_string(),
            })
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.get_ports().first().copied().unwrap_or(5432);
        let database = config.get_dbname().unwrap_or("postgres").to_string();

        tracing::debug!(%host, port, %database, tls, "connecting to PostgreSQL");

        let client = if tls {
            let connector = TlsConnector::builder()
                .build()
                .map_err(|e| CatalogError::ConfigError(format!("Failed to create TLS connector: {}", e)))?;

            let (client, connection) = config
                .connect(MakeTlsConnector::new(connector))
                .await
                .map_err(|e| connection_failure(&host, port, e))?;

            // Spawn connection handler in background
            let (h, p) = (host.clone(), port);
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL TLS connection error ({}:{}): {}", h, p, e);
                }
            });

            client
        } else {
            let (client, connection) = config
                .connect(NoTls)
                .await
                .map_err(|e| connection_failure(&host, port, e))?;

            let (h, p) = (host.clone(), port);
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL connection error ({}:{}): {}", h, p, e);
                }
            });

            client
        };

        Ok(Self {
            client,
            exclusions: CatalogConfig::default(),
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: Option<&str>,
    ) -> Result<Self, CatalogError> {
        Err(not_compiled())
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect_with_tls(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: Option<&str>,
    ) -> Result<Self, CatalogError> {
        Err(not_compiled())
    }

    /// Replace the namespace and function exclusions
    pub fn with_exclusions(mut self, exclusions: CatalogConfig) -> Self {
        self.exclusions = exclusions;
        self
    }
}

/// Turn a catalog kind label into an object kind
fn parse_kind(label: &str) -> Result<ObjectKind, CatalogError> {
    label
        .parse()
        .map_err(|e: pgdeps_core::UnknownObjectKind| CatalogError::QueryFailure(e.to_string()))
}

#[cfg(feature = "postgres")]
fn connection_failure(host: &str, port: u16, e: tokio_postgres::Error) -> CatalogError {
    CatalogError::ConnectionFailure(format!(
        "Failed to connect to PostgreSQL at {}:{}: {}",
        host, port, e
    ))
}

#[cfg(feature = "postgres")]
fn query_failure(e: tokio_postgres::Error) -> CatalogError {
    if e.is_closed() {
        CatalogError::ConnectionFailure(e.to_string())
    } else {
        match e.as_db_error() {
            Some(db) => CatalogError::QueryFailure(format!("{}: {}", db.code().code(), db.message())),
            None => CatalogError::QueryFailure(e.to_string()),
        }
    }
}

#[cfg(not(feature = "postgres"))]
fn not_compiled() -> CatalogError {
    CatalogError::ConfigError(
        "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres".to_string(),
    )
}

#[async_trait::async_trait]
impl CatalogAdapter for PostgresCatalog {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    #[cfg(feature = "postgres")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| CatalogError::ConnectionFailure(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(feature = "postgres")]
    async fn list_objects(&self, schema: &str) -> Result<Vec<ObjectRef>, CatalogError> {
        let rows = self
            .client
            .query(LIST_OBJECTS_SQL, &[&schema])
            .await
            .map_err(query_failure)?;

        rows.iter()
            .map(|row| {
                let schema: String = row.get(0);
                let name: String = row.get(1);
                let kind = parse_kind(row.get(2))?;
                Ok(ObjectRef::new(schema, name, kind))
            })
            .collect()
    }

    #[cfg(feature = "postgres")]
    async fn fetch_definitions(&self) -> Result<Vec<ObjectDefinition>, CatalogError> {
        let rows = self
            .client
            .query(
                DEFINITIONS_SQL,
                &[&self.exclusions.excluded_schemas, &self.exclusions.excluded_functions],
            )
            .await
            .map_err(query_failure)?;

        let mut definitions = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind = parse_kind(row.get(0))?;
            let schema: String = row.get(1);
            let name: String = row.get(2);
            // pg_views reports NULL for views the role cannot read
            let text: Option<String> = row.get(3);

            definitions.push(ObjectDefinition::new(
                ObjectRef::new(schema, name, kind),
                text.unwrap_or_default(),
            ));
        }

        tracing::debug!(count = definitions.len(), "fetched object definitions");
        Ok(definitions)
    }

    #[cfg(feature = "postgres")]
    async fn foreign_keys_to(&self, object: &ObjectRef) -> Result<Vec<ForeignKeyRef>, CatalogError> {
        let rows = self
            .client
            .query(FOREIGN_KEYS_SQL, &[&object.schema, &object.name])
            .await
            .map_err(query_failure)?;

        Ok(rows
            .iter()
            .map(|row| {
                let schema: String = row.get(0);
                let table: String = row.get(1);
                let columns: Vec<String> = row.get(2);
                ForeignKeyRef::new(ObjectRef::table(schema, table), columns)
            })
            .collect())
    }

    #[cfg(not(feature = "postgres"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_objects(&self, _schema: &str) -> Result<Vec<ObjectRef>, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn fetch_definitions(&self) -> Result<Vec<ObjectDefinition>, CatalogError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "postgres"))]
    async fn foreign_keys_to(&self, _object: &ObjectRef) -> Result<Vec<ForeignKeyRef>, CatalogError> {
        Err(not_compiled())
    }
}
