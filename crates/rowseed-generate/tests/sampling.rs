use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rowseed_core::{SamplingPolicy, Value};
use rowseed_generate::{Faker, MinimalFaker, Sampler};

fn values(n: i64) -> Vec<Value> {
    (0..n).map(Value::Int).collect()
}

fn draw(sampler: &mut Sampler, n: usize) -> Vec<i64> {
    (0..n)
        .map(|_| sampler.next_value().as_i64().expect("integer"))
        .collect()
}

#[test]
fn random_cycle_epochs_are_permutations() {
    let mut sampler = Sampler::new(
        values(10),
        SamplingPolicy::RandomCycle,
        ChaCha8Rng::seed_from_u64(3),
    );
    let draws = draw(&mut sampler, 50);

    for epoch in draws.chunks(10) {
        let distinct: HashSet<i64> = epoch.iter().copied().collect();
        assert_eq!(distinct.len(), 10, "epoch {epoch:?} repeats a value");
    }
    assert_ne!(draws[..10], draws[10..20], "each epoch is reshuffled");
}

#[test]
fn cycle_keeps_the_original_order() {
    let mut sampler = Sampler::new(values(3), SamplingPolicy::Cycle, ChaCha8Rng::seed_from_u64(3));
    assert_eq!(draw(&mut sampler, 7), vec![0, 1, 2, 0, 1, 2, 0]);
}

#[test]
fn random_draws_stay_within_the_collection() {
    let mut sampler = Sampler::new(values(4), SamplingPolicy::Random, ChaCha8Rng::seed_from_u64(3));
    assert!(draw(&mut sampler, 100).iter().all(|value| (0..4).contains(value)));
}

#[test]
fn empty_collections_yield_null() {
    let mut sampler = Sampler::new(
        Vec::new(),
        SamplingPolicy::RandomCycle,
        ChaCha8Rng::seed_from_u64(3),
    );
    assert!(sampler.is_empty());
    assert_eq!(sampler.next_value(), Value::Null);
}

#[test]
fn minimal_faker_uses_fixed_words() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let faker = MinimalFaker;

    assert!(["John", "Mary"].contains(&faker.first_name(&mut rng).as_str()));
    assert!(["Madison", "Ashley"].contains(&faker.middle_name(&mut rng).as_str()));
    assert!(["Doe", "Smith"].contains(&faker.last_name(&mut rng).as_str()));
    assert_eq!(faker.company_name(&mut rng), "Acme");
    assert_eq!(faker.full_name(&mut rng).split(' ').count(), 2);
}
