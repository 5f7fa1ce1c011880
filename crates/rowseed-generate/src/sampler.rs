use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use rowseed_core::{SamplingPolicy, Value};

/// Stateful draw over a fixed collection of candidate values.
///
/// Cursor and permutation state belong to one sampler and are never shared.
#[derive(Debug, Clone)]
pub struct Sampler {
    values: Vec<Value>,
    policy: SamplingPolicy,
    rng: ChaCha8Rng,
    cursor: usize,
    order: Vec<usize>,
}

impl Sampler {
    pub fn new(values: Vec<Value>, policy: SamplingPolicy, rng: ChaCha8Rng) -> Self {
        let order = (0..values.len()).collect();
        Self {
            values,
            policy,
            rng,
            cursor: 0,
            order,
        }
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Draw the next value. An empty collection yields NULL.
    pub fn next_value(&mut self) -> Value {
        if self.values.is_empty() {
            return Value::Null;
        }

        match self.policy {
            SamplingPolicy::Random => {
                let index = self.rng.random_range(0..self.values.len());
                self.values[index].clone()
            }
            SamplingPolicy::Cycle => {
                let value = self.values[self.cursor].clone();
                self.advance();
                value
            }
            SamplingPolicy::RandomCycle => {
                if self.cursor == 0 {
                    self.order.shuffle(&mut self.rng);
                }
                let value = self.values[self.order[self.cursor]].clone();
                self.advance();
                value
            }
        }
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.values.len();
    }
}
