use tracing::{debug, warn};

use rowseed_core::{AssociationSpec, SamplingPolicy, SchemaCatalog, TableRef, Value};

use crate::errors::{GenerationError, Result};
use crate::sampler::Sampler;
use crate::seed::SeedSource;

/// Foreign-key generator for a non-polymorphic association.
#[derive(Debug, Clone)]
pub struct BelongsToGenerator {
    pub column: String,
    sampler: Sampler,
}

impl BelongsToGenerator {
    pub fn next_value(&mut self) -> Value {
        self.sampler.next_value()
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.sampler.policy()
    }

    pub fn candidates(&self) -> usize {
        self.sampler.len()
    }
}

#[derive(Debug, Clone)]
struct ResolvedTarget {
    type_value: String,
    sampler: Sampler,
}

/// Discriminator and key generators for a polymorphic association.
///
/// The discriminator of row `n` is the weighted target at `n mod len`, so the
/// sequence cycles through the weight-expanded list deterministically.
#[derive(Debug, Clone)]
pub struct PolymorphicGenerator {
    pub type_column: String,
    pub id_column: String,
    targets: Vec<ResolvedTarget>,
    slots: Vec<usize>,
}

impl PolymorphicGenerator {
    fn slot(&self, row: u64) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        Some(self.slots[(row % self.slots.len() as u64) as usize])
    }

    pub fn type_for(&self, row: u64) -> Value {
        match self.slot(row) {
            Some(target) => Value::Text(self.targets[target].type_value.clone()),
            None => Value::Null,
        }
    }

    pub fn id_for(&mut self, row: u64) -> Value {
        match self.slot(row) {
            Some(target) => self.targets[target].sampler.next_value(),
            None => Value::Null,
        }
    }

    /// Length of the weight-expanded target list.
    pub fn cycle_len(&self) -> usize {
        self.slots.len()
    }
}

/// Build the sampler for a belongs-to association of `table`.
///
/// `in_unique_index` selects Random-Cycle over Random unless the association
/// forces a policy.
pub async fn resolve_belongs_to(
    catalog: &dyn SchemaCatalog,
    table: &TableRef,
    association: &AssociationSpec,
    in_unique_index: bool,
    seeds: &SeedSource,
) -> Result<BelongsToGenerator> {
    let spec = match association {
        AssociationSpec::BelongsTo(spec) => spec,
        AssociationSpec::Polymorphic(spec) => {
            return Err(GenerationError::Config(format!(
                "'{}' on '{table}' is polymorphic and cannot be resolved as a plain foreign key",
                spec.name
            )));
        }
    };

    let values = catalog
        .key_values(&spec.target, &spec.target_column, spec.eligibility.as_ref())
        .await?;
    let policy = spec.policy.unwrap_or_else(|| default_policy(in_unique_index));
    if values.is_empty() {
        warn!(
            table = %table,
            column = %spec.column,
            target = %spec.target,
            "no eligible keys; foreign key will be NULL"
        );
    }
    debug!(
        table = %table,
        column = %spec.column,
        target = %spec.target,
        keys = values.len(),
        policy = policy.as_str(),
        "resolved foreign key"
    );

    Ok(BelongsToGenerator {
        column: spec.column.clone(),
        sampler: Sampler::new(values, policy, seeds.rng(&format!("fk:{}", spec.column))),
    })
}

/// Build the generators for a polymorphic association of `table`.
pub async fn resolve_polymorphic(
    catalog: &dyn SchemaCatalog,
    table: &TableRef,
    association: &AssociationSpec,
    in_unique_index: bool,
    seeds: &SeedSource,
) -> Result<PolymorphicGenerator> {
    let spec = match association {
        AssociationSpec::Polymorphic(spec) => spec,
        AssociationSpec::BelongsTo(spec) => {
            return Err(GenerationError::Config(format!(
                "'{}' on '{table}' is not polymorphic",
                spec.name
            )));
        }
    };

    let weighted = spec.weighted_targets();
    if weighted.is_empty() {
        return Err(GenerationError::Config(format!(
            "polymorphic association '{}' on '{table}' has no weighted targets",
            spec.name
        )));
    }

    let policy = spec.policy.unwrap_or_else(|| default_policy(in_unique_index));
    let active: Vec<_> = spec.targets.iter().filter(|target| target.weight > 0).collect();
    let mut targets = Vec::with_capacity(active.len());
    for target in &active {
        let values = catalog
            .primary_key_values(&target.table, target.eligibility.as_ref())
            .await?;
        if values.is_empty() {
            warn!(
                table = %table,
                association = %spec.name,
                target = %target.table,
                "no eligible keys; polymorphic key will be NULL"
            );
        }
        let key = format!("poly:{}:{}", spec.name, target.type_value);
        targets.push(ResolvedTarget {
            type_value: target.type_value.clone(),
            sampler: Sampler::new(values, policy, seeds.rng(&key)),
        });
    }

    let slots = weighted
        .iter()
        .filter_map(|weighted| {
            active
                .iter()
                .position(|target| std::ptr::eq(*target, *weighted))
        })
        .collect();

    debug!(
        table = %table,
        association = %spec.name,
        targets = targets.len(),
        policy = policy.as_str(),
        "resolved polymorphic association"
    );

    Ok(PolymorphicGenerator {
        type_column: spec.type_column.clone(),
        id_column: spec.id_column.clone(),
        targets,
        slots,
    })
}

fn default_policy(in_unique_index: bool) -> SamplingPolicy {
    if in_unique_index {
        SamplingPolicy::RandomCycle
    } else {
        SamplingPolicy::Random
    }
}
