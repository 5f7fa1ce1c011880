use std::sync::Arc;

use rand::Rng;

use rowseed_core::{Eligibility, PolymorphicSpec, PolymorphicTarget, Value};
use rowseed_plan::{ColumnOverride, Defaults, PolymorphicSetting, TableTarget};

use crate::faker::faker_for_locale;
use crate::generator::GeneratorSpec;
use crate::seed::SeedSource;
use crate::settings::{GenerationOptions, TableSettings};

/// Run-wide generation options described by plan defaults.
pub fn options_from_defaults(defaults: &Defaults) -> GenerationOptions {
    GenerationOptions {
        seed: defaults.seed,
        faker: Arc::new(faker_for_locale(defaults.locale)),
        max_duplicate_retries: defaults.max_duplicate_retries,
        raise_on_duplicates: defaults.raise_on_duplicates,
        ..GenerationOptions::default()
    }
}

/// Table settings described by one plan entry.
///
/// `seeds` feeds the random streams of `choice` overrides.
pub fn settings_from_target(
    target: &TableTarget,
    defaults: &Defaults,
    seeds: &SeedSource,
) -> TableSettings {
    let mut settings = TableSettings::new(target.table.clone())
        .rows(target.rows_or(defaults))
        .batch_size(target.batch_size_or(defaults))
        .max_duplicate_retries(target.max_duplicate_retries_or(defaults))
        .raise_on_duplicates(target.raise_on_duplicates_or(defaults));

    for (column, generator) in &target.columns {
        let key = format!("{}.{column}", target.table.qualified());
        settings = settings.column(column, override_generator(generator, seeds.child(&key)));
    }

    for setting in &target.belongs_to {
        settings = settings.belongs_to(
            &setting.column,
            setting.filter.as_deref().map(Eligibility::new),
            setting.policy,
        );
    }

    for setting in &target.polymorphic {
        settings = settings.polymorphic(polymorphic_spec(setting));
    }

    settings
}

fn override_generator(generator: &ColumnOverride, seeds: SeedSource) -> GeneratorSpec {
    match generator {
        ColumnOverride::Value(value) => GeneratorSpec::StaticValue(Value::from_json(value)),
        ColumnOverride::Choice(values) => {
            let values: Vec<Value> = values.iter().map(Value::from_json).collect();
            let mut rng = seeds.rng("choice");
            GeneratorSpec::zero_arg(move || {
                if values.is_empty() {
                    return Value::Null;
                }
                values[rng.random_range(0..values.len())].clone()
            })
        }
        ColumnOverride::Template(template) if template.contains("{column}") => {
            let template = template.clone();
            GeneratorSpec::row_and_column_indexed(move |row, column| {
                Value::Text(
                    template
                        .replace("{row}", &row.to_string())
                        .replace("{column}", column),
                )
            })
        }
        ColumnOverride::Template(template) => {
            let template = template.clone();
            GeneratorSpec::row_indexed(move |row| {
                Value::Text(template.replace("{row}", &row.to_string()))
            })
        }
        ColumnOverride::Sequence(sequence) => {
            let (start, step) = (sequence.start, sequence.step);
            GeneratorSpec::row_indexed(move |row| {
                let offset = i64::try_from(row).unwrap_or(i64::MAX).saturating_mul(step);
                Value::Int(start.saturating_add(offset))
            })
        }
    }
}

fn polymorphic_spec(setting: &PolymorphicSetting) -> PolymorphicSpec {
    let mut spec = PolymorphicSpec::new(&setting.name);
    if let Some(column) = &setting.type_column {
        spec.type_column = column.clone();
    }
    if let Some(column) = &setting.id_column {
        spec.id_column = column.clone();
    }
    spec.policy = setting.policy;
    for target in &setting.targets {
        let mut resolved =
            PolymorphicTarget::new(target.table.clone(), &target.type_value(), target.weight);
        if let Some(filter) = &target.filter {
            resolved = resolved.with_eligibility(Eligibility::new(filter.clone()));
        }
        spec = spec.target(resolved);
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_pick_the_variant_by_placeholder() {
        let seeds = SeedSource::new(1);
        let mut by_row = override_generator(
            &ColumnOverride::Template("order-{row}".to_string()),
            seeds,
        );
        assert_eq!(by_row.kind(), "row_indexed");
        assert_eq!(by_row.call(7, "reference"), Value::from("order-7"));

        let mut by_column = override_generator(
            &ColumnOverride::Template("{column}-{row}".to_string()),
            seeds,
        );
        assert_eq!(by_column.kind(), "row_and_column_indexed");
        assert_eq!(by_column.call(3, "code"), Value::from("code-3"));
    }

    #[test]
    fn sequences_step_over_row_numbers() {
        let mut sequence = override_generator(
            &ColumnOverride::Sequence(rowseed_plan::SequenceSpec { start: 10, step: 5 }),
            SeedSource::new(1),
        );
        assert_eq!(sequence.call(0, "n"), Value::Int(10));
        assert_eq!(sequence.call(4, "n"), Value::Int(30));
    }
}
