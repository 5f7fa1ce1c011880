//! Load plan contracts, parsing, and validation.
//!
//! A load plan declares which tables to populate, how many rows each gets,
//! column overrides, association settings, and the output destination.

pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{
    BelongsToSetting, ColumnOverride, Defaults, LoadPlan, Locale, PolymorphicSetting,
    PolymorphicTargetSetting, SequenceSpec, TableTarget,
};
pub use schema::plan_json_schema;
pub use validate::{
    ValidatedPlan, load_plan, read_plan_document, validate_output, validate_plan,
    validate_plan_json, validate_plan_semantics,
};
