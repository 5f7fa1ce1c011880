use std::path::Path;
use std::{env, fs};

use anyhow::{Context, Result, anyhow};
use rowseed_catalog::PostgresCatalog;
use rowseed_core::{AssociationSpec, ColumnKind, Eligibility, SchemaCatalog, TableRef, Value};
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

#[tokio::test]
async fn reads_columns_keys_and_indexes() -> Result<()> {
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
    let catalog = PostgresCatalog::new(pool);

    let customers = TableRef::parse("rowseed_it.customers");
    let orders = TableRef::parse("rowseed_it.orders");

    let columns = catalog.columns(&orders).await?;
    let names: Vec<&str> = columns.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "customer_id", "kind", "code", "placed_at", "total_cents"]
    );

    let kind = columns
        .iter()
        .find(|col| col.name == "kind")
        .ok_or_else(|| anyhow!("expected kind column"))?;
    assert_eq!(
        kind.kind,
        ColumnKind::Enum(vec!["web".into(), "phone".into(), "store".into()])
    );

    let code = columns
        .iter()
        .find(|col| col.name == "code")
        .ok_or_else(|| anyhow!("expected code column"))?;
    assert_eq!(code.limit, Some(2));

    let total = columns
        .iter()
        .find(|col| col.name == "total_cents")
        .ok_or_else(|| anyhow!("expected total_cents column"))?;
    assert!(total.generated);

    let email = catalog
        .columns(&customers)
        .await?
        .into_iter()
        .find(|col| col.name == "email")
        .ok_or_else(|| anyhow!("expected email column"))?;
    assert_eq!(email.limit, Some(40));
    assert!(!email.nullable);

    assert_eq!(catalog.primary_key(&orders).await?, vec!["id"]);

    let fks = catalog.foreign_keys(&orders).await?;
    assert_eq!(fks.len(), 1);
    match &fks[0] {
        AssociationSpec::BelongsTo(spec) => {
            assert_eq!(spec.column, "customer_id");
            assert_eq!(spec.target.qualified(), "rowseed_it.customers");
        }
        other => return Err(anyhow!("unexpected association {other:?}")),
    }

    let indexes = catalog.unique_indexes(&orders).await?;
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].columns, vec!["customer_id", "code"]);

    let all = catalog.primary_key_values(&customers, None).await?;
    assert_eq!(all, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    let active = catalog
        .primary_key_values(&customers, Some(&Eligibility::new("active")))
        .await?;
    assert_eq!(active, vec![Value::Int(1), Value::Int(3)]);

    Ok(())
}
