use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::{ColumnOverride, LoadPlan, TableTarget};
use crate::schema::plan_json_schema;

const OUTPUT_ERROR: &str = "output configuration must be a filename for the SQL script";

/// Validated plan with accumulated warnings and the resolved script path.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: LoadPlan,
    pub output: Option<PathBuf>,
    pub warnings: Vec<ValidationIssue>,
}

/// Read a plan file as a JSON document; the format follows the extension.
pub fn read_plan_document(path: &Path) -> Result<Value, PlanError> {
    let contents = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(toml::from_str(&contents)?),
        Some("json") => Ok(serde_json::from_str(&contents)?),
        other => Err(PlanError::Format(other.unwrap_or_default().to_string())),
    }
}

/// Read and validate a plan file.
pub fn load_plan(path: &Path) -> Result<ValidatedPlan, PlanError> {
    let document = read_plan_document(path)?;
    validate_plan(&document).map_err(PlanError::Invalid)
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(plan_json: &Value) -> Result<ValidationReport, PlanError> {
    let plan_schema = serde_json::to_value(plan_json_schema())?;
    let compiled =
        JSONSchema::compile(&plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(plan_json: &Value) -> Result<ValidatedPlan, ValidationReport> {
    let structural = match validate_plan_json(plan_json) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: LoadPlan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_plan_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let report = validate_plan_semantics(&plan);
    if !report.is_ok() {
        return Err(report);
    }

    let output = match validate_output(plan.defaults.output.as_deref()) {
        Ok(output) => output,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(output_issue(err.to_string()));
            return Err(report);
        }
    };

    Ok(ValidatedPlan {
        plan,
        output,
        warnings: report.warnings,
    })
}

/// Check the plan's internal consistency.
pub fn validate_plan_semantics(plan: &LoadPlan) -> ValidationReport {
    let mut report = ValidationReport::default();
    let defaults = &plan.defaults;

    if defaults.batch_size == 0 {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "invalid_batch_size",
            "/defaults/batch_size",
            "batch_size must be greater than zero",
            None,
        ));
    }

    if !defaults.execute && blank_output(defaults.output.as_deref()) {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "nothing_to_do",
            "/defaults/execute",
            "execute = false requires an output script",
            Some("set defaults.output or enable execute".to_string()),
        ));
    }

    if plan.tables.is_empty() {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "no_tables",
            "/tables",
            "plan declares no tables",
            None,
        ));
    }

    let mut seen = HashSet::new();
    for (index, target) in plan.tables.iter().enumerate() {
        let base = format!("/tables/{index}");
        if !seen.insert(target.table.qualified()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "duplicate_table",
                format!("{base}/table"),
                format!("table '{}' is loaded more than once", target.table),
                None,
            ));
        }
        validate_target(target, &base, &mut report);
    }

    report
}

fn validate_target(target: &TableTarget, base: &str, report: &mut ValidationReport) {
    if target.batch_size == Some(0) {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "invalid_batch_size",
            format!("{base}/batch_size"),
            "batch_size must be greater than zero",
            None,
        ));
    }

    for (column, generator) in &target.columns {
        match generator {
            ColumnOverride::Choice(values) if values.is_empty() => {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "empty_choice",
                    format!("{base}/columns/{column}"),
                    "choice override needs at least one value",
                    None,
                ));
            }
            ColumnOverride::Sequence(sequence) if sequence.step == 0 => {
                report.push_warning(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "constant_sequence",
                    format!("{base}/columns/{column}"),
                    "sequence with step 0 yields the same value for every row",
                    None,
                ));
            }
            _ => {}
        }
    }

    let mut belongs_to_columns = HashSet::new();
    for (index, setting) in target.belongs_to.iter().enumerate() {
        if !belongs_to_columns.insert(setting.column.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_belongs_to",
                format!("{base}/belongs_to/{index}/column"),
                format!("foreign key column '{}' configured twice", setting.column),
                None,
            ));
        }
        if target.columns.contains_key(&setting.column) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "override_shadows_association",
                format!("{base}/columns/{}", setting.column),
                "column override replaces the sampled foreign key",
                None,
            ));
        }
    }

    for (index, setting) in target.polymorphic.iter().enumerate() {
        let path = format!("{base}/polymorphic/{index}");
        if setting.targets.is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "no_polymorphic_targets",
                format!("{path}/targets"),
                format!("polymorphic association '{}' has no targets", setting.name),
                None,
            ));
        } else if setting.targets.iter().all(|target| target.weight == 0) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "zero_weights",
                format!("{path}/targets"),
                format!(
                    "polymorphic association '{}' has only zero-weight targets",
                    setting.name
                ),
                None,
            ));
        }
    }
}

/// Resolve the script output setting into a filename.
///
/// Blank values mean no script. Directories and `.csv` paths are rejected
/// because data files are written next to the script under derived names.
pub fn validate_output(output: Option<&str>) -> Result<Option<PathBuf>, PlanError> {
    let Some(raw) = output.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let path = PathBuf::from(raw);
    if path.is_dir() || raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR) {
        return Err(PlanError::Output(format!("'{raw}' is a directory")));
    }
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    {
        return Err(PlanError::Output(format!("'{raw}' names a data file")));
    }
    Ok(Some(path))
}

fn blank_output(output: Option<&str>) -> bool {
    output.is_none_or(|raw| raw.trim().is_empty())
}

fn output_issue(message: String) -> ValidationIssue {
    ValidationIssue::new(
        IssueSeverity::Error,
        "invalid_output",
        "/defaults/output",
        message,
        Some(OUTPUT_ERROR.to_string()),
    )
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
