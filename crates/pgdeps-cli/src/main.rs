use anyhow::{Context, Result};
use clap::{Args, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pgdeps_catalog::{CatalogAdapter, PostgresCatalog};
use pgdeps_core::{CatalogConfig, Config, ConnectionConfig, OutputFormat, RenderConfig, SchemaReport};
use pgdeps_engine::{analyze, summarize_schema, Analysis, RenderError, Renderer};

/// Config file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "pgdeps.toml";

/// pgdeps - Inspect what depends on the tables of a PostgreSQL schema
#[derive(Parser, Debug)]
#[command(name = "pgdeps")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Schema to inspect
    schema: String,

    /// Table or view whose cascaded dependencies are rendered as a graph
    #[arg(short, long)]
    table: Option<String>,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Also save the schema summary as JSON (summary mode only)
    #[arg(long, value_name = "PATH", conflicts_with = "table")]
    json: Option<PathBuf>,

    /// Path to config file (default: pgdeps.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every resolved dependency
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// Database server host
    #[arg(short = 'h', long, env = "PGHOST")]
    host: Option<String>,

    /// Database server port
    #[arg(short, long, env = "PGPORT")]
    port: Option<u16>,

    /// Role to connect as (default: $USER)
    #[arg(short, long, env = "PGUSER")]
    user: Option<String>,

    /// Database to connect to (default: the role name)
    #[arg(short, long, env = "PGDATABASE")]
    database: Option<String>,

    /// Password for the role (prompted for when none is available)
    #[arg(short = 'P', long, value_name = "PASSWORD")]
    password: Option<String>,

    /// Connect over TLS
    #[arg(long)]
    tls: bool,
}

#[derive(Args, Debug, Default)]
struct RenderArgs {
    /// Graph output format: pdf, png, svg or dot
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory the graph is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep the intermediate DOT file
    #[arg(long)]
    keep_dot: bool,
}

/// Fully resolved connection parameters
#[derive(Debug, PartialEq)]
struct ConnectionTarget {
    host: String,
    port: u16,
    user: String,
    database: String,
    tls: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let target = resolve_connection(&cli.connection, &config.connection, std::env::var("USER").ok())?;
    let password = resolve_password(
        cli.connection.password.clone(),
        std::env::var("PGPASSWORD").ok(),
        config.connection.password.clone(),
        &target,
    )?;

    let catalog = connect(&target, password.as_deref(), config.catalog.clone()).await?;

    match &cli.table {
        Some(table) => {
            let render = resolve_render(&cli.render, &config.render);
            graph_command(&catalog, &cli.schema, table, render).await
        }
        None => summary_command(&catalog, &cli.schema, cli.json.as_deref()).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,pgdeps=debug,pgdeps_engine=debug,pgdeps_catalog=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        Config::from_file(default_path)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_FILE))
    } else {
        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }
}

/// Merge flags (and the PG* variables clap already folded in) over the
/// config file and defaults
fn resolve_connection(
    args: &ConnectionArgs,
    file: &ConnectionConfig,
    login: Option<String>,
) -> Result<ConnectionTarget> {
    let user = args
        .user
        .clone()
        .or_else(|| file.user.clone())
        .or(login)
        .context("No database user given. Pass --user or set PGUSER")?;

    let database = args
        .database
        .clone()
        .or_else(|| file.database.clone())
        .unwrap_or_else(|| user.clone());

    Ok(ConnectionTarget {
        host: args.host.clone().unwrap_or_else(|| file.host.clone()),
        port: args.port.unwrap_or(file.port),
        user,
        database,
        tls: args.tls || file.tls,
    })
}

/// Pick the password: `--password`, then PGPASSWORD, then the config
/// file, then a prompt
///
/// An empty answer means no password. Without a terminal the prompt is
/// skipped.
fn resolve_password(
    flag: Option<String>,
    env: Option<String>,
    file: Option<String>,
    target: &ConnectionTarget,
) -> Result<Option<String>> {
    if let Some(password) = flag.or(env).or(file) {
        return Ok(Some(password));
    }

    let prompt = format!("Password for {}@{}: ", target.user, target.host);
    match rpassword::prompt_password(prompt) {
        Ok(password) if password.is_empty() => Ok(None),
        Ok(password) => Ok(Some(password)),
        Err(e) => {
            tracing::debug!("Skipping password prompt: {}", e);
            Ok(None)
        }
    }
}

fn resolve_render(args: &RenderArgs, file: &RenderConfig) -> RenderConfig {
    let mut render = file.clone();
    if let Some(format) = args.format {
        render.format = format;
    }
    if let Some(dir) = &args.output_dir {
        render.output_dir = dir.clone();
    }
    render.keep_dot |= args.keep_dot;
    render
}

async fn connect(
    target: &ConnectionTarget,
    password: Option<&str>,
    exclusions: CatalogConfig,
) -> Result<PostgresCatalog> {
    tracing::debug!(
        host = %target.host,
        port = target.port,
        database = %target.database,
        user = %target.user,
        tls = target.tls,
        "connecting"
    );

    let connected = if target.tls {
        PostgresCatalog::connect_with_tls(&target.host, target.port, &target.database, &target.user, password)
            .await
    } else {
        PostgresCatalog::connect(&target.host, target.port, &target.database, &target.user, password).await
    };
    let catalog = connected
        .with_context(|| format!("Failed to connect to {}:{}", target.host, target.port))?;

    catalog
        .test_connection()
        .await
        .with_context(|| format!("Failed to connect to {}:{}", target.host, target.port))?;

    Ok(catalog.with_exclusions(exclusions))
}

/// Summary command - one-hop counts for every table and view of a schema
async fn summary_command(catalog: &dyn CatalogAdapter, schema: &str, json: Option<&Path>) -> Result<()> {
    let report = summarize_schema(catalog, schema)
        .await
        .with_context(|| format!("Failed to summarize schema '{}'", schema))?;

    if report.rows.is_empty() {
        eprintln!("{} {}", "No tables or views in schema".yellow(), schema.bold());
    } else {
        println!("{}", summary_table(&report));
    }

    if let Some(path) = json {
        report.save_to_file(path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    Ok(())
}

fn summary_table(report: &SchemaReport) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        format!("In schema {}", report.schema),
        "first stage links".to_string(),
        "foreign keys".to_string(),
    ]);

    for row in &report.rows {
        builder.push_record([
            row.name.clone(),
            row.first_stage_links.to_string(),
            row.foreign_keys.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// Graph command - cascaded dependents of one object, rendered with Graphviz
async fn graph_command(
    catalog: &dyn CatalogAdapter,
    schema: &str,
    table: &str,
    render: RenderConfig,
) -> Result<()> {
    let analysis = analyze(catalog, schema, table).await.map_err(|e| {
        if e.is_not_found() {
            anyhow::anyhow!("No table or view '{}' in schema '{}'", table, schema)
        } else {
            anyhow::Error::new(e).context(format!("Failed to resolve dependents of {}.{}", schema, table))
        }
    })?;

    print_analysis(&analysis);

    let renderer = Renderer::new(render);
    match renderer.render(&analysis.graph, table) {
        Ok(path) => {
            eprintln!("{} {}", "Graph saved to:".green(), path.display());
            Ok(())
        }
        Err(e @ RenderError::GraphvizNotFound(_)) => Err(e.into()),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to render graph")),
    }
}

fn print_analysis(analysis: &Analysis) {
    println!();
    println!("{}", "Dependency Analysis".bold().bright_blue());
    println!("{}", "=".repeat(60));
    println!();
    println!("{} {} ({})", "Object:".bold(), analysis.root.to_string().green(), analysis.root.kind);
    println!("{} {}", "Dependents:".bold(), analysis.dependent_count());
    println!();

    if analysis.dependents.is_empty() && analysis.foreign_keys.is_empty() {
        println!("{}", "✓ Nothing depends on this object".green());
        return;
    }

    for level in &analysis.dependents {
        println!("  {}", level.object.to_string().bold());
        for child in &level.children {
            println!("    {} {} {}", "←".dimmed(), child.kind.as_str().cyan(), child);
        }
    }

    if !analysis.foreign_keys.is_empty() {
        println!();
        println!("{}", "Referenced by foreign keys:".bold());
        for fk in &analysis.foreign_keys.references {
            println!("    {} {} ({})", "←".dimmed(), fk.table, fk.column_label().yellow());
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgdeps_core::{ObjectRef, SummaryRow};
    use pretty_assertions::assert_eq;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_follow_psql() {
        let cli = Cli::try_parse_from([
            "pgdeps", "-h", "db.internal", "-p", "6432", "-u", "alice", "-d", "shop", "-t", "orders",
            "-f", "svg", "-o", "out", "-v", "sales",
        ])
        .unwrap();

        assert_eq!(cli.schema, "sales");
        assert_eq!(cli.table.as_deref(), Some("orders"));
        assert_eq!(cli.connection.host.as_deref(), Some("db.internal"));
        assert_eq!(cli.connection.port, Some(6432));
        assert_eq!(cli.connection.user.as_deref(), Some("alice"));
        assert_eq!(cli.connection.database.as_deref(), Some("shop"));
        assert_eq!(cli.render.format, Some(OutputFormat::Svg));
        assert_eq!(cli.render.output_dir, Some(PathBuf::from("out")));
        assert!(cli.verbose);
    }

    #[test]
    fn schema_is_required() {
        assert!(Cli::try_parse_from(["pgdeps", "-t", "orders"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["pgdeps", "-f", "bmp", "sales"]).is_err());
    }

    #[test]
    fn connection_defaults_to_login() {
        let target = resolve_connection(
            &ConnectionArgs::default(),
            &ConnectionConfig::default(),
            Some("alice".to_string()),
        )
        .unwrap();

        assert_eq!(
            target,
            ConnectionTarget {
                host: "localhost".to_string(),
                port: 5432,
                user: "alice".to_string(),
                database: "alice".to_string(),
                tls: false,
            }
        );
    }

    #[test]
    fn flags_override_config_file() {
        let file = ConnectionConfig {
            host: "db.internal".to_string(),
            port: 6432,
            user: Some("reporting".to_string()),
            database: Some("warehouse".to_string()),
            password: None,
            tls: true,
        };
        let args = ConnectionArgs {
            host: Some("replica".to_string()),
            user: Some("alice".to_string()),
            ..ConnectionArgs::default()
        };

        let target = resolve_connection(&args, &file, Some("bob".to_string())).unwrap();
        assert_eq!(target.host, "replica");
        assert_eq!(target.port, 6432);
        assert_eq!(target.user, "alice");
        assert_eq!(target.database, "warehouse");
        assert!(target.tls);
    }

    #[test]
    fn missing_user_is_an_error() {
        let result = resolve_connection(&ConnectionArgs::default(), &ConnectionConfig::default(), None);
        assert!(result.is_err());
    }

    #[test]
    fn password_flag_takes_a_value() {
        let cli = Cli::try_parse_from(["pgdeps", "-P", "secret", "sales"]).unwrap();
        assert_eq!(cli.connection.password.as_deref(), Some("secret"));
        assert_eq!(cli.schema, "sales");

        let cli = Cli::try_parse_from(["pgdeps", "--password", "s3cret", "sales"]).unwrap();
        assert_eq!(cli.connection.password.as_deref(), Some("s3cret"));

        let cli = Cli::try_parse_from(["pgdeps", "sales"]).unwrap();
        assert_eq!(cli.connection.password, None);
    }

    #[test]
    fn password_precedence() {
        let target = resolve_connection(
            &ConnectionArgs::default(),
            &ConnectionConfig::default(),
            Some("alice".to_string()),
        )
        .unwrap();
        let some = |s: &str| Some(s.to_string());

        let password = resolve_password(some("flag"), some("env"), some("file"), &target).unwrap();
        assert_eq!(password.as_deref(), Some("flag"));

        let password = resolve_password(None, some("env"), some("file"), &target).unwrap();
        assert_eq!(password.as_deref(), Some("env"));

        let password = resolve_password(None, None, some("file"), &target).unwrap();
        assert_eq!(password.as_deref(), Some("file"));
    }

    #[test]
    fn json_conflicts_with_table() {
        let err = Cli::try_parse_from(["pgdeps", "--json", "report.json", "-t", "orders", "sales"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["pgdeps", "--json", "report.json", "sales"]).unwrap();
        assert_eq!(cli.json, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn render_flags_override_config() {
        let args = RenderArgs {
            format: Some(OutputFormat::Png),
            output_dir: None,
            keep_dot: true,
        };
        let file = RenderConfig {
            output_dir: PathBuf::from("graphs"),
            ..RenderConfig::default()
        };

        let render = resolve_render(&args, &file);
        assert_eq!(render.format, OutputFormat::Png);
        assert_eq!(render.output_dir, PathBuf::from("graphs"));
        assert!(render.keep_dot);
        assert_eq!(render.rankdir, "LR");
    }

    #[test]
    fn summary_table_has_headers_and_rows() {
        let report = SchemaReport::new(
            "s",
            vec![
                SummaryRow::new(&ObjectRef::table("s", "t"), 1, 1),
                SummaryRow::new(&ObjectRef::view("s", "v"), 0, 0),
            ],
        );

        let table = summary_table(&report);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("In schema s"));
        assert!(lines[0].contains("first stage links"));
        assert!(lines[0].contains("foreign keys"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains('t') && lines[2].contains('1'));
    }
}
