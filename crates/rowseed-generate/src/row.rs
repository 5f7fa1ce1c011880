use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use rowseed_core::{AssociationSpec, ColumnSpec, SchemaCatalog, TableRef, Value};

use crate::associations::{
    BelongsToGenerator, PolymorphicGenerator, resolve_belongs_to, resolve_polymorphic,
};
use crate::context::GenerationContext;
use crate::errors::{GenerationError, Result};
use crate::generator::GeneratorSpec;
use crate::seed::SeedSource;
use crate::settings::{GenerationOptions, RetryLimit, TableSettings};
use crate::unique::UniqueIndexTracker;
use crate::values::ValueGenerator;

/// One generated row, ordered like `RowGenerator::columns`.
pub type Row = Vec<Value>;

/// Why a row number produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Every candidate repeated `index`.
    DuplicateExhausted { index: String, retries: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateExhausted { index, retries } => write!(
                f,
                "unique index '{index}' still repeating after {retries} retries"
            ),
        }
    }
}

/// Result of generating one row number.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(Row),
    Skipped { row: u64, reason: SkipReason },
}

impl RowOutcome {
    pub fn into_row(self) -> Option<Row> {
        match self {
            Self::Accepted(row) => Some(row),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Counters for one table run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    pub accepted: u64,
    pub skipped: u64,
    pub retries: u64,
}

enum ColumnSource {
    Builtin(ValueGenerator),
    BelongsTo(usize),
    PolymorphicType(usize),
    PolymorphicId(usize),
    Custom(GeneratorSpec),
}

/// Produces rows for one table run, retrying unique-index conflicts.
pub struct RowGenerator {
    table: TableRef,
    columns: Vec<String>,
    sources: Vec<ColumnSource>,
    belongs_to: Vec<BelongsToGenerator>,
    polymorphic: Vec<PolymorphicGenerator>,
    tracker: UniqueIndexTracker,
    context: GenerationContext,
    retry_limit: RetryLimit,
    raise_on_duplicates: bool,
    stats: GenerationStats,
}

struct Layers {
    columns: Vec<String>,
    sources: Vec<ColumnSource>,
}

impl Layers {
    // Later layers replace a column in place; new columns go last.
    fn merge(&mut self, column: &str, source: ColumnSource) {
        match self.columns.iter().position(|name| name == column) {
            Some(position) => self.sources[position] = source,
            None => {
                self.columns.push(column.to_string());
                self.sources.push(source);
            }
        }
    }
}

impl RowGenerator {
    /// Resolve catalog metadata and caller settings for one table run.
    ///
    /// Every configuration error surfaces here, before any row is generated.
    pub async fn prepare(
        catalog: &dyn SchemaCatalog,
        settings: TableSettings,
        options: &GenerationOptions,
    ) -> Result<Self> {
        let TableSettings {
            table,
            columns: overrides,
            belongs_to: belongs_to_settings,
            polymorphic: polymorphic_specs,
            retry_limit,
            raise_on_duplicates,
            ..
        } = settings;

        let table_columns = catalog.columns(&table).await?;
        let primary_key = catalog.primary_key(&table).await?;
        let foreign_keys = catalog.foreign_keys(&table).await?;
        let mut tracker = UniqueIndexTracker::new(catalog.unique_indexes(&table).await?);
        let seeds = SeedSource::from_option(options.seed).child(&table.qualified());

        let find_column = |name: &str| table_columns.iter().find(|column| column.name == name);
        for (name, _) in &overrides {
            if find_column(name).is_none() {
                return Err(GenerationError::Config(format!(
                    "column '{name}' not found on '{table}'"
                )));
            }
        }
        for spec in &polymorphic_specs {
            for name in [&spec.type_column, &spec.id_column] {
                if find_column(name).is_none() {
                    return Err(GenerationError::Config(format!(
                        "polymorphic association '{}' writes '{name}', which is not a column of '{table}'",
                        spec.name
                    )));
                }
            }
        }

        let mut foreign_keys: Vec<AssociationSpec> = foreign_keys
            .into_iter()
            .filter(|association| matches!(association, AssociationSpec::BelongsTo(_)))
            .collect();
        for setting in belongs_to_settings {
            let spec = foreign_keys.iter_mut().find_map(|association| match association {
                AssociationSpec::BelongsTo(spec) if spec.column == setting.column => Some(spec),
                _ => None,
            });
            let Some(spec) = spec else {
                return Err(GenerationError::Config(format!(
                    "no foreign key on column '{}' of '{table}'",
                    setting.column
                )));
            };
            spec.eligibility = setting.eligibility.or(spec.eligibility.take());
            spec.policy = setting.policy.or(spec.policy);
        }

        let association_columns: HashSet<&str> = foreign_keys
            .iter()
            .flat_map(AssociationSpec::columns)
            .chain(
                polymorphic_specs
                    .iter()
                    .flat_map(|spec| [spec.type_column.as_str(), spec.id_column.as_str()]),
            )
            .collect();
        let overridden: HashSet<&str> = overrides.iter().map(|(name, _)| name.as_str()).collect();

        let mut layers = Layers {
            columns: Vec::new(),
            sources: Vec::new(),
        };

        for column in &table_columns {
            if primary_key.contains(&column.name)
                || column.generated
                || association_columns.contains(column.name.as_str())
            {
                continue;
            }
            if !ValueGenerator::supports(&column.kind) {
                check_unsupported(&table, column, overridden.contains(column.name.as_str()))?;
                continue;
            }
            layers.merge(
                &column.name,
                ColumnSource::Builtin(ValueGenerator::for_column(&table, column)?),
            );
        }

        let mut belongs_to = Vec::new();
        for association in &foreign_keys {
            let AssociationSpec::BelongsTo(spec) = association else {
                continue;
            };
            let generator = resolve_belongs_to(
                catalog,
                &table,
                association,
                tracker.participates(&spec.column),
                &seeds,
            )
            .await?;
            layers.merge(&spec.column, ColumnSource::BelongsTo(belongs_to.len()));
            belongs_to.push(generator);
        }

        let mut polymorphic = Vec::new();
        for spec in polymorphic_specs {
            let in_index =
                tracker.participates(&spec.id_column) || tracker.participates(&spec.type_column);
            let generator = resolve_polymorphic(
                catalog,
                &table,
                &AssociationSpec::Polymorphic(spec),
                in_index,
                &seeds,
            )
            .await?;
            let position = polymorphic.len();
            layers.merge(&generator.type_column, ColumnSource::PolymorphicType(position));
            layers.merge(&generator.id_column, ColumnSource::PolymorphicId(position));
            polymorphic.push(generator);
        }

        for (name, generator) in overrides {
            layers.merge(&name, ColumnSource::Custom(generator));
        }

        if layers.columns.is_empty() {
            return Err(GenerationError::Config(format!(
                "table '{table}' has no columns to generate"
            )));
        }

        tracker.map_columns(&layers.columns);

        info!(
            table = %table,
            columns = layers.columns.len(),
            foreign_keys = belongs_to.len(),
            polymorphic = polymorphic.len(),
            unique_indexes = tracker.tracked_indexes().len(),
            "prepared row generator"
        );

        Ok(Self {
            context: GenerationContext::new(
                seeds.rng("values"),
                options.faker.clone(),
                options.clock.clone(),
            ),
            retry_limit: retry_limit
                .unwrap_or(RetryLimit::Fixed(options.max_duplicate_retries)),
            raise_on_duplicates: raise_on_duplicates.unwrap_or(options.raise_on_duplicates),
            table,
            columns: layers.columns,
            sources: layers.sources,
            belongs_to,
            polymorphic,
            tracker,
            stats: GenerationStats::default(),
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Column order shared by every generated row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    pub fn tracker(&self) -> &UniqueIndexTracker {
        &self.tracker
    }

    /// Generate row number `row`, regenerating the whole candidate on conflicts.
    pub fn generate(&mut self, row: u64) -> Result<RowOutcome> {
        let limit = self.retry_limit.for_row(row, &self.table);
        let mut retries = 0_u32;

        loop {
            let candidate = self.candidate(row);
            let Some(index) = self.tracker.repeating_index(&candidate).map(str::to_string) else {
                self.tracker.capture(&candidate);
                self.stats.accepted += 1;
                return Ok(RowOutcome::Accepted(candidate));
            };

            retries += 1;
            if retries > limit {
                if self.raise_on_duplicates {
                    return Err(GenerationError::DuplicateKey {
                        table: self.table.clone(),
                        row,
                    });
                }
                warn!(
                    table = %self.table,
                    row,
                    index = %index,
                    retries = limit,
                    "exhausted retries looking for unique values; skipping row"
                );
                self.stats.skipped += 1;
                return Ok(RowOutcome::Skipped {
                    row,
                    reason: SkipReason::DuplicateExhausted {
                        index,
                        retries: limit,
                    },
                });
            }

            self.stats.retries += 1;
            debug!(
                table = %self.table,
                row,
                retry = retries,
                index = %index,
                "retrying row for unique values"
            );
        }
    }

    fn candidate(&mut self, row: u64) -> Row {
        self.columns
            .iter()
            .zip(self.sources.iter_mut())
            .map(|(column, source)| match source {
                ColumnSource::Builtin(generator) => generator.generate(row, &mut self.context),
                ColumnSource::BelongsTo(index) => self.belongs_to[*index].next_value(),
                ColumnSource::PolymorphicType(index) => self.polymorphic[*index].type_for(row),
                ColumnSource::PolymorphicId(index) => self.polymorphic[*index].id_for(row),
                ColumnSource::Custom(generator) => generator.call(row, column),
            })
            .collect()
    }
}

fn check_unsupported(table: &TableRef, column: &ColumnSpec, overridden: bool) -> Result<()> {
    if overridden || column.nullable || column.has_default {
        debug!(
            table = %table,
            column = %column.name,
            sql_type = %column.sql_type,
            "leaving unsupported column to the database"
        );
        return Ok(());
    }
    // Required and nothing can fill it: surface the unsupported type.
    ValueGenerator::for_column(table, column).map(|_| ())
}

impl fmt::Debug for RowGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowGenerator")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
