use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::LoadPlan;

/// Emit the JSON Schema for load plan documents.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(LoadPlan)
}
