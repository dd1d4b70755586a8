//! Inheritance of the resistance trait.

use colony_core::ColonyConfig;
use rand::Rng;

/// Outcome of one inheritance event, each equally likely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Increase,
    Decrease,
    Unchanged,
}

impl Mutation {
    pub fn all() -> [Mutation; 3] {
        [Mutation::Increase, Mutation::Decrease, Mutation::Unchanged]
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => Mutation::Increase,
            1 => Mutation::Decrease,
            _ => Mutation::Unchanged,
        }
    }

    /// Daughter expression for a parent, clamped to the viable range
    pub fn apply(&self, parent: f64, config: &ColonyConfig) -> f64 {
        let expression = match self {
            Mutation::Increase => parent + config.mutation_step,
            Mutation::Decrease => parent - config.mutation_step,
            Mutation::Unchanged => parent,
        };
        expression.clamp(config.min_expression, config.max_expression)
    }
}

/// Draw a mutation and return the daughter's expression
pub fn spawn<R: Rng + ?Sized>(parent: f64, config: &ColonyConfig, rng: &mut R) -> f64 {
    Mutation::sample(rng).apply(parent, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn test_increase_clamps_at_ceiling() {
        let config = ColonyConfig::default();
        assert_eq!(Mutation::Increase.apply(1.0, &config), 1.0);
        assert_eq!(Mutation::Increase.apply(0.98, &config), 1.0);
    }

    #[test]
    fn test_decrease_clamps_at_floor() {
        let config = ColonyConfig::default();
        assert_eq!(Mutation::Decrease.apply(0.1, &config), 0.1);
        assert_eq!(Mutation::Decrease.apply(0.12, &config), 0.1);
    }

    #[test]
    fn test_step_inside_range() {
        let config = ColonyConfig::default();
        assert!((Mutation::Increase.apply(0.5, &config) - 0.55).abs() < 1e-12);
        assert!((Mutation::Decrease.apply(0.5, &config) - 0.45).abs() < 1e-12);
        assert_eq!(Mutation::Unchanged.apply(0.5, &config), 0.5);
    }

    #[test]
    fn test_sample_is_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut counts: HashMap<Mutation, usize> = HashMap::new();
        for _ in 0..9_000 {
            *counts.entry(Mutation::sample(&mut rng)).or_default() += 1;
        }
        assert_eq!(counts.len(), 3);
        for mutation in Mutation::all() {
            let count = counts[&mutation];
            assert!(count > 2_700 && count < 3_300, "{:?}: {}", mutation, count);
        }
    }

    proptest! {
        #[test]
        fn prop_spawn_stays_viable(parent in 0.1f64..=1.0, seed in any::<u64>()) {
            let config = ColonyConfig::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let child = spawn(parent, &config, &mut rng);
            prop_assert!(config.is_viable(child));
            prop_assert!((child - parent).abs() <= config.mutation_step + 1e-12);
        }

        #[test]
        fn prop_every_branch_is_clamped(parent in 0.0f64..=1.2) {
            let config = ColonyConfig::default();
            for mutation in Mutation::all() {
                prop_assert!(config.is_viable(mutation.apply(parent, &config)));
            }
        }
    }
}
