mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::{Call, RecordingFactory, catalog, options, temp_dir};
use rowseed_generate::TableSettings;
use rowseed_load::{Loader, LoaderConfig, ScriptWriter};
use rowseed_plan::validate_plan;
use serde_json::json;

fn script_only(output: &Path) -> LoaderConfig {
    LoaderConfig {
        statement_timeout: Some("2min".to_string()),
        output: Some(output.to_path_buf()),
        execute: false,
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read script")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn script_is_bracketed_by_the_timeout_commands() {
    let dir = temp_dir();
    let script = dir.join("seed.sql");
    let factory = RecordingFactory::new();
    let loader = Loader::new(
        Arc::new(catalog()),
        Arc::new(factory.clone()),
        options(),
        script_only(&script),
    )
    .await
    .expect("loader");

    let report = loader
        .load(vec![
            TableSettings::new("widgets").rows(5).batch_size(2),
            TableSettings::new("tags").rows(2),
        ])
        .await
        .expect("load");

    let lines = lines(&script);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "SET statement_timeout = '2min';");
    assert_eq!(lines[5], "RESET statement_timeout;");
    for statement in &lines[1..5] {
        assert!(statement.starts_with("INSERT INTO "));
        assert!(statement.ends_with(");"));
    }

    assert!(!report.executed);
    assert_eq!(report.script.as_deref(), Some(script.as_path()));
    // Only the probe connection touched the database.
    assert_eq!(factory.calls(), vec![Call::Connect, Call::Close]);

    fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn copy_batches_reference_per_batch_data_files() {
    let dir = temp_dir();
    let script = dir.join("seed.sql");
    let factory = RecordingFactory::new().with_copy();
    let loader = Loader::new(
        Arc::new(catalog()),
        Arc::new(factory.clone()),
        options(),
        script_only(&script),
    )
    .await
    .expect("loader");

    let report = loader
        .load(vec![TableSettings::new("widgets").rows(3).batch_size(2)])
        .await
        .expect("load");

    let first = dir.join("seed_widgets_rows_0_to_1.csv");
    let second = dir.join("seed_widgets_rows_2_to_2.csv");
    assert_eq!(report.data_files, vec![first.clone(), second.clone()]);
    assert_eq!(lines(&first).len(), 2);
    assert_eq!(lines(&second).len(), 1);

    let lines = lines(&script);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        format!(
            "\\COPY \"widgets\" (\"name\", \"quantity\") FROM '{}' WITH (FORMAT CSV);",
            first.display()
        )
    );

    fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn executing_runs_mirror_every_statement_into_the_script() {
    let dir = temp_dir();
    let script = dir.join("mirror.sql");
    let factory = RecordingFactory::new();
    let config = LoaderConfig {
        output: Some(script.clone()),
        ..LoaderConfig::default()
    };
    let loader = Loader::new(Arc::new(catalog()), Arc::new(factory.clone()), options(), config)
        .await
        .expect("loader");

    let report = loader
        .load(vec![TableSettings::new("widgets").rows(4).batch_size(2)])
        .await
        .expect("load");

    let inserts = factory.inserts();
    let lines = lines(&script);
    assert!(report.executed);
    assert_eq!(inserts.len(), 2);
    assert_eq!(lines.len(), 2);
    for (statement, line) in inserts.iter().zip(&lines) {
        assert_eq!(format!("{statement};"), *line);
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn statements_are_flattened_onto_one_line() {
    let dir = temp_dir();
    let path = dir.join("flat.sql");
    let mut writer = ScriptWriter::create(&path).expect("script");
    writer
        .statement("INSERT INTO t (a)\nVALUES (1);")
        .expect("statement");
    writer.finish().expect("finish");

    assert_eq!(lines(&path), vec!["INSERT INTO t (a) VALUES (1);"]);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn loader_config_follows_plan_defaults() {
    let plan = validate_plan(&json!({
        "defaults": { "output": "out/seed.sql", "execute": false, "statement_timeout": " " },
        "tables": [{ "table": "widgets", "rows": 3 }]
    }))
    .expect("valid plan");

    let config = LoaderConfig::from_plan(&plan);
    assert!(!config.execute);
    assert_eq!(config.statement_timeout, None);
    assert_eq!(config.output, Some("out/seed.sql".into()));

    let tables = rowseed_load::tables_from_plan(&plan);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].rows, 3);
}

#[test]
fn reports_serialize_to_json() {
    let dir = temp_dir();
    let path = dir.join("nested").join("report.json");
    let report = rowseed_load::LoadReport {
        executed: true,
        ..Default::default()
    };
    report.write_json(&path).expect("write report");

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(parsed["executed"], json!(true));
    assert!(parsed.get("script").is_none());
    fs::remove_dir_all(&dir).ok();
}
