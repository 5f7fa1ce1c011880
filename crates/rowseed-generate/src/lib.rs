//! Row generation engine for rowseed.
//!
//! Given a table's catalog metadata and caller settings, this crate builds a
//! `RowGenerator` that produces one ordered row per row number, sampling
//! foreign keys, synthesizing column values, and retrying candidates that
//! would repeat a unique index.

pub mod associations;
pub mod clock;
pub mod context;
pub mod errors;
pub mod faker;
pub mod generator;
pub mod plan;
pub mod row;
pub mod sampler;
pub mod seed;
pub mod settings;
pub mod unique;
pub mod values;

pub use associations::{
    BelongsToGenerator, PolymorphicGenerator, resolve_belongs_to, resolve_polymorphic,
};
pub use clock::{Clock, FixedClock, RowTimestampCache, SystemClock};
pub use context::GenerationContext;
pub use errors::{GenerationError, Result};
pub use faker::{FakeRsFaker, Faker, MinimalFaker, faker_for_locale};
pub use generator::GeneratorSpec;
pub use plan::{options_from_defaults, settings_from_target};
pub use row::{GenerationStats, Row, RowGenerator, RowOutcome, SkipReason};
pub use sampler::Sampler;
pub use seed::SeedSource;
pub use settings::{BelongsToSetting, GenerationOptions, RetryLimit, TableSettings};
pub use unique::UniqueIndexTracker;
pub use values::{TextIntent, ValueGenerator, integer_upper_bound, text_intent};
