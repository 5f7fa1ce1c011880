use std::fmt;
use std::sync::Arc;

use rowseed_core::{Eligibility, PolymorphicSpec, SamplingPolicy, TableRef, Value};

use crate::clock::{Clock, SystemClock};
use crate::faker::{Faker, MinimalFaker};
use crate::generator::GeneratorSpec;

pub const DEFAULT_MAX_DUPLICATE_RETRIES: u32 = 5;
pub const DEFAULT_BATCH_SIZE: u64 = 100_000;

/// How many times a row may be regenerated after a unique-index conflict.
#[derive(Clone)]
pub enum RetryLimit {
    Fixed(u32),
    /// Computed from the row number and table.
    Dynamic(Arc<dyn Fn(u64, &TableRef) -> u32 + Send + Sync>),
}

impl RetryLimit {
    pub fn for_row(&self, row: u64, table: &TableRef) -> u32 {
        match self {
            Self::Fixed(limit) => *limit,
            Self::Dynamic(f) => f(row, table),
        }
    }
}

impl fmt::Debug for RetryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(limit) => f.debug_tuple("Fixed").field(limit).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// Caller settings for one foreign key discovered in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct BelongsToSetting {
    pub column: String,
    pub eligibility: Option<Eligibility>,
    pub policy: Option<SamplingPolicy>,
}

/// Run-wide generation settings.
#[derive(Clone)]
pub struct GenerationOptions {
    /// Base seed; a random one is drawn per run when absent.
    pub seed: Option<u64>,
    pub faker: Arc<dyn Faker>,
    pub clock: Arc<dyn Clock>,
    pub max_duplicate_retries: u32,
    pub raise_on_duplicates: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            seed: None,
            faker: Arc::new(MinimalFaker),
            clock: Arc::new(SystemClock),
            max_duplicate_retries: DEFAULT_MAX_DUPLICATE_RETRIES,
            raise_on_duplicates: false,
        }
    }
}

impl GenerationOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_faker(mut self, faker: impl Faker + 'static) -> Self {
        self.faker = Arc::new(faker);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

impl fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("seed", &self.seed)
            .field("max_duplicate_retries", &self.max_duplicate_retries)
            .field("raise_on_duplicates", &self.raise_on_duplicates)
            .finish_non_exhaustive()
    }
}

/// Per-table generation and loading settings.
#[derive(Debug)]
pub struct TableSettings {
    pub table: TableRef,
    pub rows: u64,
    pub batch_size: u64,
    pub(crate) columns: Vec<(String, GeneratorSpec)>,
    pub(crate) belongs_to: Vec<BelongsToSetting>,
    pub(crate) polymorphic: Vec<PolymorphicSpec>,
    pub(crate) retry_limit: Option<RetryLimit>,
    pub(crate) raise_on_duplicates: Option<bool>,
}

impl TableSettings {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            rows: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            columns: Vec::new(),
            belongs_to: Vec::new(),
            polymorphic: Vec::new(),
            retry_limit: None,
            raise_on_duplicates: None,
        }
    }

    pub fn rows(mut self, rows: u64) -> Self {
        self.rows = rows;
        self
    }

    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Override `column` with a generator; later overrides of the same column win.
    pub fn column(mut self, column: &str, generator: GeneratorSpec) -> Self {
        self.columns.retain(|(name, _)| name != column);
        self.columns.push((column.to_string(), generator));
        self
    }

    pub fn column_static(self, column: &str, value: impl Into<Value>) -> Self {
        self.column(column, GeneratorSpec::static_value(value))
    }

    pub fn column_fn<F>(self, column: &str, f: F) -> Self
    where
        F: FnMut() -> Value + Send + 'static,
    {
        self.column(column, GeneratorSpec::zero_arg(f))
    }

    pub fn column_row_fn<F>(self, column: &str, f: F) -> Self
    where
        F: FnMut(u64) -> Value + Send + 'static,
    {
        self.column(column, GeneratorSpec::row_indexed(f))
    }

    pub fn column_row_column_fn<F>(self, column: &str, f: F) -> Self
    where
        F: FnMut(u64, &str) -> Value + Send + 'static,
    {
        self.column(column, GeneratorSpec::row_and_column_indexed(f))
    }

    /// Narrow or force the sampling of the foreign key stored in `column`.
    pub fn belongs_to(
        mut self,
        column: &str,
        eligibility: Option<Eligibility>,
        policy: Option<SamplingPolicy>,
    ) -> Self {
        self.belongs_to.retain(|setting| setting.column != column);
        self.belongs_to.push(BelongsToSetting {
            column: column.to_string(),
            eligibility,
            policy,
        });
        self
    }

    pub fn polymorphic(mut self, spec: PolymorphicSpec) -> Self {
        self.polymorphic.push(spec);
        self
    }

    pub fn max_duplicate_retries(mut self, retries: u32) -> Self {
        self.retry_limit = Some(RetryLimit::Fixed(retries));
        self
    }

    pub fn retry_limit_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, &TableRef) -> u32 + Send + Sync + 'static,
    {
        self.retry_limit = Some(RetryLimit::Dynamic(Arc::new(f)));
        self
    }

    pub fn raise_on_duplicates(mut self, raise: bool) -> Self {
        self.raise_on_duplicates = Some(raise);
        self
    }

    pub fn overridden_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}
