use std::collections::HashSet;

use tracing::debug;

use rowseed_core::{UniqueIndexSpec, Value};

#[derive(Debug)]
struct TrackedIndex {
    name: String,
    positions: Vec<usize>,
    used: HashSet<Vec<String>>,
}

impl TrackedIndex {
    // Projections containing NULL never conflict.
    fn project(&self, row: &[Value]) -> Option<Vec<String>> {
        self.positions
            .iter()
            .map(|position| row.get(*position).and_then(Value::unique_key))
            .collect()
    }
}

/// Remembers every unique-index projection accepted during one table run.
#[derive(Debug, Default)]
pub struct UniqueIndexTracker {
    declared: Vec<UniqueIndexSpec>,
    tracked: Vec<TrackedIndex>,
}

impl UniqueIndexTracker {
    pub fn new(indexes: Vec<UniqueIndexSpec>) -> Self {
        Self {
            declared: indexes,
            tracked: Vec::new(),
        }
    }

    /// Whether `column` is part of any declared unique index.
    pub fn participates(&self, column: &str) -> bool {
        self.declared
            .iter()
            .any(|index| index.columns.iter().any(|indexed| indexed == column))
    }

    /// Resolve index columns to positions in the final column order.
    ///
    /// Indexes naming a column the generator never writes are not tracked.
    pub fn map_columns(&mut self, column_order: &[String]) {
        self.tracked = self
            .declared
            .iter()
            .filter_map(|index| {
                let positions: Option<Vec<usize>> = index
                    .columns
                    .iter()
                    .map(|column| column_order.iter().position(|name| name == column))
                    .collect();
                match positions {
                    Some(positions) => Some(TrackedIndex {
                        name: index.name.clone(),
                        positions,
                        used: HashSet::new(),
                    }),
                    None => {
                        debug!(index = %index.name, "unique index not tracked: column not generated");
                        None
                    }
                }
            })
            .collect();
    }

    pub fn tracked_indexes(&self) -> Vec<&str> {
        self.tracked.iter().map(|index| index.name.as_str()).collect()
    }

    /// Name of the first index whose projection of `row` was already captured.
    pub fn repeating_index(&self, row: &[Value]) -> Option<&str> {
        self.tracked
            .iter()
            .find(|index| {
                index
                    .project(row)
                    .is_some_and(|projection| index.used.contains(&projection))
            })
            .map(|index| index.name.as_str())
    }

    pub fn is_repeating(&self, row: &[Value]) -> bool {
        self.repeating_index(row).is_some()
    }

    /// Record the projections of an accepted row.
    pub fn capture(&mut self, row: &[Value]) {
        for index in &mut self.tracked {
            if let Some(projection) = index.project(row) {
                index.used.insert(projection);
            }
        }
    }
}
