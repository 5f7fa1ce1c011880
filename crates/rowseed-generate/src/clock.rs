use std::collections::VecDeque;

use chrono::{NaiveDateTime, Utc};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Per-row timestamp memo for one table run.
///
/// Every datetime column of the same row number gets the same instant. Only
/// the two most recent rows are remembered.
#[derive(Debug, Default)]
pub struct RowTimestampCache {
    rows: VecDeque<(u64, NaiveDateTime)>,
}

impl RowTimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp(&mut self, row: u64, clock: &dyn Clock) -> NaiveDateTime {
        if let Some((_, cached)) = self.rows.iter().find(|(cached_row, _)| *cached_row == row) {
            return *cached;
        }

        while self.rows.len() > 1 {
            self.rows.pop_front();
        }
        let now = clock.now();
        self.rows.push_back((row, now));
        now
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
