mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use logging::{LogFormat, init_logging};
use rowseed_catalog::PostgresCatalog;
use rowseed_core::{SchemaCatalog, TableRef};
use rowseed_generate::{GenerationOptions, RowGenerator, TableSettings};
use rowseed_load::{LoadError, Loader, PostgresConnectionFactory, tables_from_plan};
use rowseed_plan::{PlanError, load_plan, plan_json_schema};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("catalog error: {0}")]
    Catalog(#[from] rowseed_core::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "rowseed", version, about = "Seed database tables with generated rows")]
struct Cli {
    /// Log line format on stderr.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,
    /// Also append JSON log lines to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and load the tables of a plan.
    Load(LoadArgs),
    /// Validate a plan without touching the database.
    Validate(ValidateArgs),
    /// Show what the loader sees for the given tables.
    Describe(DescribeArgs),
    /// Print the JSON Schema of plan files.
    PlanSchema(PlanSchemaArgs),
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Plan file (.toml or .json).
    #[arg(long)]
    plan: PathBuf,
    /// Write the load report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Plan file (.toml or .json).
    #[arg(long)]
    plan: PathBuf,
}

#[derive(Args, Debug)]
struct DescribeArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Tables to describe ("schema.table" or "table").
    #[arg(long = "table", value_name = "TABLE", required = true)]
    tables: Vec<String>,
}

#[derive(Args, Debug)]
struct PlanSchemaArgs {
    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_file.as_deref()).map_err(CliError::Logging)?;

    match cli.command {
        Command::Load(args) => run_load(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args).await,
        Command::PlanSchema(args) => run_plan_schema(args),
    }
}

async fn run_load(args: LoadArgs) -> Result<(), CliError> {
    let plan = load_plan(&args.plan)?;
    for warning in &plan.warnings {
        tracing::warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
    }

    let pool = connect(&args.conn).await?;
    let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
    let factory = Arc::new(PostgresConnectionFactory::new(pool.clone()));

    let loader = Loader::from_plan(&plan, catalog, factory).await?;
    tracing::info!(
        plan = %args.plan.display(),
        tables = plan.plan.tables.len(),
        strategy = loader.strategy_name(),
        execute = plan.plan.defaults.execute,
        "load started"
    );

    let report = loader.load(tables_from_plan(&plan)).await;
    pool.close().await;
    let report = report?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    if let Some(script) = &report.script {
        tracing::info!(path = %script.display(), "script written");
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let plan = load_plan(&args.plan)?;
    for warning in &plan.warnings {
        println!("warning {} at {}: {}", warning.code, warning.path, warning.message);
    }
    println!(
        "plan ok: {} table(s), output {}",
        plan.plan.tables.len(),
        plan.output
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct TableDescription {
    table: String,
    primary_key: Vec<String>,
    columns: Vec<ColumnDescription>,
    associations: Vec<String>,
    unique_indexes: Vec<IndexDescription>,
    /// Columns the loader writes when the table has no overrides.
    generated_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    setup_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ColumnDescription {
    name: String,
    kind: String,
    sql_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    nullable: bool,
    has_default: bool,
    generated: bool,
}

#[derive(Debug, Serialize)]
struct IndexDescription {
    name: String,
    columns: Vec<String>,
}

async fn run_describe(args: DescribeArgs) -> Result<(), CliError> {
    let pool = connect(&args.conn).await?;
    let catalog = PostgresCatalog::new(pool.clone());

    let mut descriptions = Vec::with_capacity(args.tables.len());
    for table in &args.tables {
        descriptions.push(describe_table(&catalog, TableRef::parse(table)).await?);
    }
    pool.close().await;

    println!("{}", serde_json::to_string_pretty(&descriptions)?);
    Ok(())
}

async fn describe_table(
    catalog: &PostgresCatalog,
    table: TableRef,
) -> Result<TableDescription, CliError> {
    let columns = catalog.columns(&table).await?;
    if columns.is_empty() {
        return Err(CliError::InvalidConfig(format!("table '{table}' not found")));
    }
    let primary_key = catalog.primary_key(&table).await?;
    let associations = catalog
        .foreign_keys(&table)
        .await?
        .iter()
        .map(|association| {
            format!("{} ({})", association.name(), association.columns().join(", "))
        })
        .collect();
    let unique_indexes = catalog
        .unique_indexes(&table)
        .await?
        .into_iter()
        .map(|index| IndexDescription {
            name: index.name,
            columns: index.columns,
        })
        .collect();

    let (generated_columns, setup_error) = match RowGenerator::prepare(
        catalog,
        TableSettings::new(table.clone()),
        &GenerationOptions::default(),
    )
    .await
    {
        Ok(generator) => (generator.columns().to_vec(), None),
        Err(err) => (Vec::new(), Some(err.to_string())),
    };

    Ok(TableDescription {
        table: table.to_string(),
        primary_key,
        columns: columns
            .into_iter()
            .map(|column| ColumnDescription {
                kind: column.kind.label().to_string(),
                name: column.name,
                sql_type: column.sql_type,
                limit: column.limit,
                nullable: column.nullable,
                has_default: column.has_default,
                generated: column.generated,
            })
            .collect(),
        associations,
        unique_indexes,
        generated_columns,
        setup_error,
    })
}

fn run_plan_schema(args: PlanSchemaArgs) -> Result<(), CliError> {
    let schema = serde_json::to_string_pretty(&plan_json_schema())?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, schema)?;
            tracing::info!(path = %path.display(), "plan schema written");
        }
        None => println!("{schema}"),
    }
    Ok(())
}

async fn connect(conn: &str) -> Result<PgPool, CliError> {
    detect_engine(conn)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(pool)
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(redact(conn)))
    }
}

/// Drop credentials before a connection string reaches an error message.
fn redact(conn: &str) -> String {
    match (conn.find("://"), conn.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***{}", &conn[..scheme], &conn[at..])
        }
        _ => conn.to_string(),
    }
}
