use std::path::Path;
use std::sync::Arc;
use std::{env, fs};

use anyhow::{Context, Result};
use rowseed_catalog::PostgresCatalog;
use rowseed_core::{Eligibility, SamplingPolicy};
use rowseed_generate::{GenerationOptions, MinimalFaker, TableSettings};
use rowseed_load::{BulkInsertStrategy, Loader, LoaderConfig, PostgresConnectionFactory};
use sqlx::{PgPool, postgres::PgPoolOptions};

const FIXTURE: &str = "../../fixtures/sql/postgres/001_schema.sql";

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn run_fixture(pool: &PgPool) -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(FIXTURE);
    let script = fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;

    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {sql}"))?;
    }

    Ok(())
}

// Each run gets its own customer so runs never share (customer_id, code) pairs.
fn orders(rows: u64, filter: &str) -> TableSettings {
    TableSettings::new("rowseed_it.orders")
        .rows(rows)
        .batch_size(20)
        .belongs_to(
            "customer_id",
            Some(Eligibility::new(filter)),
            Some(SamplingPolicy::RandomCycle),
        )
}

#[tokio::test]
async fn loads_orders_through_copy_and_insert() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL for integration tests");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    run_fixture(&pool).await?;

    let options = GenerationOptions::default()
        .with_seed(11)
        .with_faker(MinimalFaker);
    let config = LoaderConfig {
        statement_timeout: Some("2min".to_string()),
        ..LoaderConfig::default()
    };
    let loader = Loader::new(
        Arc::new(PostgresCatalog::new(pool.clone())),
        Arc::new(PostgresConnectionFactory::new(pool.clone())),
        options.clone(),
        config.clone(),
    )
    .await?;
    assert_eq!(loader.strategy_name(), "COPY");

    let report = loader.load(vec![orders(50, "active and id = 1")]).await?;
    assert_eq!(report.tables[0].rows_loaded, 50);
    assert_eq!(report.tables[0].batches, 3);

    let inserting = Loader::new(
        Arc::new(PostgresCatalog::new(pool.clone())),
        Arc::new(PostgresConnectionFactory::new(pool.clone())),
        options,
        config,
    )
    .await?
    .with_strategy(Box::new(BulkInsertStrategy));
    inserting.load(vec![orders(10, "active and id = 3")]).await?;

    let total: i64 = sqlx::query_scalar("select count(*) from rowseed_it.orders")
        .fetch_one(&pool)
        .await?;
    assert_eq!(total, 60);

    let inactive: i64 =
        sqlx::query_scalar("select count(*) from rowseed_it.orders where customer_id = 2")
            .fetch_one(&pool)
            .await?;
    assert_eq!(inactive, 0);

    let restored: bool = sqlx::query_scalar(
        "select setting = reset_val from pg_settings where name = 'statement_timeout'",
    )
    .fetch_one(&pool)
    .await?;
    assert!(restored);

    Ok(())
}
