use std::sync::Arc;

use chrono::NaiveDateTime;
use rand_chacha::ChaCha8Rng;

use crate::clock::{Clock, RowTimestampCache};
use crate::faker::Faker;

/// Mutable state shared by the built-in generators of one table run.
///
/// Built fresh for every table and dropped with its `RowGenerator`, so
/// timestamps and random streams never leak across tables or runs.
pub struct GenerationContext {
    pub rng: ChaCha8Rng,
    faker: Arc<dyn Faker>,
    clock: Arc<dyn Clock>,
    timestamps: RowTimestampCache,
}

impl GenerationContext {
    pub fn new(rng: ChaCha8Rng, faker: Arc<dyn Faker>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rng,
            faker,
            clock,
            timestamps: RowTimestampCache::new(),
        }
    }

    pub fn faker(&self) -> Arc<dyn Faker> {
        Arc::clone(&self.faker)
    }

    /// Timestamp shared by every datetime column of `row`.
    pub fn row_timestamp(&mut self, row: u64) -> NaiveDateTime {
        self.timestamps.timestamp(row, self.clock.as_ref())
    }
}
