use std::collections::BTreeMap;

use rowseed_core::{SamplingPolicy, TableRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root load plan document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoadPlan {
    /// Settings applied to every table unless overridden.
    #[serde(default)]
    pub defaults: Defaults,
    /// Tables to populate, loaded in declaration order.
    #[serde(default)]
    pub tables: Vec<TableTarget>,
}

/// Run-wide defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Rows per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Rows per table when a table does not say.
    #[serde(default = "default_rows")]
    pub rows: u64,
    /// Statement timeout applied while loading (ex.: "2min"). Empty disables it.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout: Option<String>,
    /// Abort on retry exhaustion instead of skipping the row.
    #[serde(default)]
    pub raise_on_duplicates: bool,
    /// Retries per row before exhaustion.
    #[serde(default = "default_max_duplicate_retries")]
    pub max_duplicate_retries: u32,
    /// SQL script filename mirroring the statements sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Send statements to the database.
    #[serde(default = "default_execute")]
    pub execute: bool,
    /// Seed for deterministic sampling and value generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Locale used by the faker provider.
    #[serde(default)]
    pub locale: Locale,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            rows: default_rows(),
            statement_timeout: default_statement_timeout(),
            raise_on_duplicates: false,
            max_duplicate_retries: default_max_duplicate_retries(),
            output: None,
            execute: default_execute(),
            seed: None,
            locale: Locale::default(),
        }
    }
}

impl Defaults {
    /// Statement timeout with blank values treated as absent.
    pub fn statement_timeout(&self) -> Option<&str> {
        self.statement_timeout
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Faker locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Locale {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "pt_BR")]
    PtBr,
}

/// One table to populate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableTarget {
    /// Table name, optionally schema-qualified.
    pub table: TableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raise_on_duplicates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duplicate_retries: Option<u32>,
    /// Per-column generator overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, ColumnOverride>,
    /// Settings for foreign keys declared on the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub belongs_to: Vec<BelongsToSetting>,
    /// Polymorphic associations written by the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polymorphic: Vec<PolymorphicSetting>,
}

impl TableTarget {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            rows: None,
            batch_size: None,
            raise_on_duplicates: None,
            max_duplicate_retries: None,
            columns: BTreeMap::new(),
            belongs_to: Vec::new(),
            polymorphic: Vec::new(),
        }
    }

    pub fn rows_or(&self, defaults: &Defaults) -> u64 {
        self.rows.unwrap_or(defaults.rows)
    }

    pub fn batch_size_or(&self, defaults: &Defaults) -> u64 {
        self.batch_size.unwrap_or(defaults.batch_size)
    }

    pub fn raise_on_duplicates_or(&self, defaults: &Defaults) -> bool {
        self.raise_on_duplicates
            .unwrap_or(defaults.raise_on_duplicates)
    }

    pub fn max_duplicate_retries_or(&self, defaults: &Defaults) -> u32 {
        self.max_duplicate_retries
            .unwrap_or(defaults.max_duplicate_retries)
    }
}

/// Declarative column generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOverride {
    /// The same value for every row.
    Value(serde_json::Value),
    /// A random pick from the listed values.
    Choice(Vec<serde_json::Value>),
    /// Text with `{row}` and `{column}` placeholders substituted.
    Template(String),
    /// Arithmetic sequence over the row number.
    Sequence(SequenceSpec),
}

/// `start + row * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SequenceSpec {
    #[serde(default)]
    pub start: i64,
    #[serde(default = "default_step")]
    pub step: i64,
}

/// Settings for one foreign key of the table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BelongsToSetting {
    /// Foreign-key column on the loaded table.
    pub column: String,
    /// SQL condition restricting eligible referenced rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SamplingPolicy>,
}

/// Polymorphic association declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PolymorphicSetting {
    /// Association name; columns default to `<name>_type` and `<name>_id`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SamplingPolicy>,
    pub targets: Vec<PolymorphicTargetSetting>,
}

/// Weighted target of a polymorphic association.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PolymorphicTargetSetting {
    pub table: TableRef,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Discriminator value; defaults to the table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_value: Option<String>,
}

impl PolymorphicTargetSetting {
    pub fn type_value(&self) -> String {
        self.type_value
            .clone()
            .unwrap_or_else(|| self.table.name.clone())
    }
}

fn default_batch_size() -> u64 {
    100_000
}

fn default_rows() -> u64 {
    1
}

fn default_statement_timeout() -> Option<String> {
    Some("2min".to_string())
}

fn default_max_duplicate_retries() -> u32 {
    5
}

fn default_execute() -> bool {
    true
}

fn default_step() -> i64 {
    1
}

fn default_weight() -> u32 {
    1
}
