use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::TableRef;

/// Distribution policy for sampling candidate key values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// Uniformly random element on every draw.
    Random,
    /// Successive elements in original order, wrapping forever.
    Cycle,
    /// Every epoch of `len` draws is a fresh random permutation.
    RandomCycle,
}

impl SamplingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingPolicy::Random => "random",
            SamplingPolicy::Cycle => "cycle",
            SamplingPolicy::RandomCycle => "random_cycle",
        }
    }
}

/// Caller-supplied filter narrowing which referenced rows are eligible.
///
/// The filter is a SQL boolean expression evaluated against the referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Eligibility {
    pub filter: String,
}

impl Eligibility {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
        }
    }
}

/// Non-polymorphic foreign key from `column` to `target.target_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct BelongsToSpec {
    pub name: String,
    pub column: String,
    pub target: TableRef,
    pub target_column: String,
    pub eligibility: Option<Eligibility>,
    /// Forced policy; `None` lets the generator pick one.
    pub policy: Option<SamplingPolicy>,
}

impl BelongsToSpec {
    pub fn new(column: &str, target: TableRef, target_column: &str) -> Self {
        Self {
            name: column.trim_end_matches("_id").to_string(),
            column: column.to_string(),
            target,
            target_column: target_column.to_string(),
            eligibility: None,
            policy: None,
        }
    }

    pub fn with_eligibility(mut self, eligibility: Eligibility) -> Self {
        self.eligibility = Some(eligibility);
        self
    }

    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// One weighted target table of a polymorphic association.
#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicTarget {
    pub table: TableRef,
    /// Discriminator written to the type column.
    pub type_value: String,
    pub weight: u32,
    pub eligibility: Option<Eligibility>,
}

impl PolymorphicTarget {
    pub fn new(table: TableRef, type_value: &str, weight: u32) -> Self {
        Self {
            table,
            type_value: type_value.to_string(),
            weight,
            eligibility: None,
        }
    }

    pub fn with_eligibility(mut self, eligibility: Eligibility) -> Self {
        self.eligibility = Some(eligibility);
        self
    }
}

/// Polymorphic association writing a (discriminator, key) column pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicSpec {
    pub name: String,
    pub type_column: String,
    pub id_column: String,
    pub targets: Vec<PolymorphicTarget>,
    pub policy: Option<SamplingPolicy>,
}

impl PolymorphicSpec {
    /// Association `name` writing `<name>_type` and `<name>_id`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_column: format!("{name}_type"),
            id_column: format!("{name}_id"),
            targets: Vec::new(),
            policy: None,
        }
    }

    pub fn target(mut self, target: PolymorphicTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Expand targets by weight, reduced by the GCD of all weights.
    ///
    /// `{A: 100, B: 20, C: 50}` becomes ten `A`, two `B` and five `C`.
    /// Zero-weight targets are dropped.
    pub fn weighted_targets(&self) -> Vec<&PolymorphicTarget> {
        let divisor = self
            .targets
            .iter()
            .map(|target| target.weight)
            .filter(|weight| *weight > 0)
            .fold(0, gcd);
        if divisor == 0 {
            return Vec::new();
        }

        self.targets
            .iter()
            .flat_map(|target| std::iter::repeat_n(target, (target.weight / divisor) as usize))
            .collect()
    }
}

/// Association declared on the table being loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationSpec {
    BelongsTo(BelongsToSpec),
    Polymorphic(PolymorphicSpec),
}

impl AssociationSpec {
    pub fn name(&self) -> &str {
        match self {
            AssociationSpec::BelongsTo(spec) => &spec.name,
            AssociationSpec::Polymorphic(spec) => &spec.name,
        }
    }

    /// Columns written by the association.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            AssociationSpec::BelongsTo(spec) => vec![spec.column.as_str()],
            AssociationSpec::Polymorphic(spec) => {
                vec![spec.type_column.as_str(), spec.id_column.as_str()]
            }
        }
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_reduced_by_their_gcd() {
        let spec = PolymorphicSpec::new("owner")
            .target(PolymorphicTarget::new(TableRef::parse("a"), "A", 100))
            .target(PolymorphicTarget::new(TableRef::parse("b"), "B", 20))
            .target(PolymorphicTarget::new(TableRef::parse("c"), "C", 50));

        let weighted: Vec<&str> = spec
            .weighted_targets()
            .into_iter()
            .map(|target| target.type_value.as_str())
            .collect();

        assert_eq!(weighted.len(), 17);
        assert_eq!(weighted.iter().filter(|t| **t == "A").count(), 10);
        assert_eq!(weighted.iter().filter(|t| **t == "B").count(), 2);
        assert_eq!(weighted.iter().filter(|t| **t == "C").count(), 5);
    }

    #[test]
    fn zero_weights_are_dropped() {
        let spec = PolymorphicSpec::new("owner")
            .target(PolymorphicTarget::new(TableRef::parse("a"), "A", 0))
            .target(PolymorphicTarget::new(TableRef::parse("b"), "B", 3));

        let weighted = spec.weighted_targets();
        assert_eq!(weighted.len(), 1);
        assert_eq!(weighted[0].type_value, "B");
    }
}
