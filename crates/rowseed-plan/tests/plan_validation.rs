use std::path::{Path, PathBuf};

use rowseed_core::SamplingPolicy;
use rowseed_plan::{
    ColumnOverride, Locale, PlanError, load_plan, plan_json_schema, read_plan_document,
    validate_output, validate_plan, validate_plan_json,
};
use serde_json::json;

fn plan_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../plans/examples")
        .join(name)
}

#[test]
fn toml_plan_validates_and_resolves_defaults() {
    let validated = load_plan(&plan_path("orders.plan.toml")).expect("plan should validate");
    let plan = validated.plan;

    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(validated.output, None);
    assert_eq!(plan.defaults.batch_size, 500);
    assert_eq!(plan.defaults.seed, Some(42));
    assert_eq!(plan.defaults.locale, Locale::EnUs);
    assert!(!plan.defaults.raise_on_duplicates);
    assert_eq!(plan.tables.len(), 3);

    let orders = &plan.tables[1];
    assert_eq!(orders.table.qualified(), "public.orders");
    assert_eq!(orders.rows_or(&plan.defaults), 1000);
    assert_eq!(orders.batch_size_or(&plan.defaults), 500);
    assert_eq!(
        orders.columns.get("reference"),
        Some(&ColumnOverride::Template("order-{row}".to_string()))
    );
    assert_eq!(orders.belongs_to[0].policy, Some(SamplingPolicy::RandomCycle));

    let comments = &plan.tables[2];
    assert!(comments.raise_on_duplicates_or(&plan.defaults));
    let polymorphic = &comments.polymorphic[0];
    assert_eq!(polymorphic.targets.len(), 2);
    assert_eq!(polymorphic.targets[0].type_value(), "Customer");
}

#[test]
fn json_plan_applies_builtin_defaults() {
    let validated = load_plan(&plan_path("minimal.plan.json")).expect("plan should validate");
    let defaults = &validated.plan.defaults;

    assert_eq!(defaults.batch_size, 100_000);
    assert_eq!(defaults.max_duplicate_retries, 5);
    assert_eq!(defaults.statement_timeout(), Some("2min"));
    assert!(!defaults.execute);
    assert_eq!(validated.output, Some(PathBuf::from("seed.sql")));
}

#[test]
fn table_names_are_strings_in_the_plan_schema() {
    let schema = serde_json::to_value(plan_json_schema()).expect("schema json");
    let table = &schema["definitions"]["TableTarget"]["properties"]["table"];
    assert_eq!(table["type"], json!("string"));

    let document = json!({
        "tables": [
            { "table": "public.customers", "rows": 2 },
            { "table": "orders" }
        ]
    });
    let report = validate_plan_json(&document).expect("schema compiles");
    assert!(report.is_ok(), "{}", report.summary());

    let plan = validate_plan(&document).expect("plan should validate");
    assert_eq!(plan.plan.tables[0].table.qualified(), "public.customers");
    assert_eq!(plan.plan.tables[1].table.qualified(), "public.orders");
}

#[test]
fn unknown_fields_are_structural_errors() {
    let document = json!({
        "defaults": { "batch_sise": 10 },
        "tables": []
    });

    let report = validate_plan_json(&document).expect("schema compiles");
    assert!(!report.is_ok());
    assert_eq!(report.errors[0].code, "schema_violation");
}

#[test]
fn execute_without_output_is_rejected() {
    let document = json!({
        "defaults": { "execute": false, "output": "   " },
        "tables": [{ "table": "users" }]
    });

    let report = validate_plan(&document).expect_err("plan should fail");
    assert!(report.errors.iter().any(|issue| issue.code == "nothing_to_do"));
}

#[test]
fn zero_batch_size_and_empty_polymorphic_targets_are_rejected() {
    let document = json!({
        "defaults": { "batch_size": 0 },
        "tables": [{
            "table": "comments",
            "polymorphic": [{ "name": "commentable", "targets": [] }]
        }]
    });

    let report = validate_plan(&document).expect_err("plan should fail");
    let codes: Vec<&str> = report.errors.iter().map(|issue| issue.code.as_str()).collect();
    assert!(codes.contains(&"invalid_batch_size"));
    assert!(codes.contains(&"no_polymorphic_targets"));
}

#[test]
fn output_must_name_a_script_file() {
    assert_eq!(validate_output(None).expect("none"), None);
    assert_eq!(validate_output(Some("")).expect("blank"), None);
    assert_eq!(
        validate_output(Some("out/seed.sql")).expect("file"),
        Some(PathBuf::from("out/seed.sql"))
    );

    let dir = std::env::temp_dir();
    let err = validate_output(dir.to_str()).expect_err("directory");
    assert!(matches!(err, PlanError::Output(_)));
    assert!(
        err.to_string()
            .starts_with("output configuration must be a filename for the SQL script")
    );

    assert!(validate_output(Some("rows.csv")).is_err());
}

#[test]
fn unknown_extensions_are_rejected() {
    let path = std::env::temp_dir().join(format!("rowseed-{}.yaml", std::process::id()));
    std::fs::write(&path, "defaults: {}").expect("write plan");
    let result = read_plan_document(&path);
    let _ = std::fs::remove_file(&path);
    assert!(matches!(result, Err(PlanError::Format(ext)) if ext == "yaml"));
}
