//! Random policy for testing and baselines.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::trait_::Policy;
use crate::action::Action;
use crate::observation::Observation;

/// Uniformly random action selection.
///
/// Each robot independently picks one of the five actions. Seeded, so a
/// run can be replayed.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_actions(&mut self, observations: &[Observation]) -> Vec<usize> {
        (0..observations.len())
            .map(|_| self.rng.gen_range(0..Action::COUNT))
            .collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}
