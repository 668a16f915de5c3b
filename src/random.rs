use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::{Exp, Poisson};

use crate::wheel::BiasedWheel;

/// The source of randomness for a scheduling engine.
///
/// Each solver owns its own handler, seeded explicitly, so independent
/// simulations are reproducible and do not share hidden state.
#[derive(Clone, Debug)]
pub struct RandomHandler {
    rng: SmallRng,
}

impl RandomHandler {
    pub fn from_seed(seed: u64) -> RandomHandler {
        RandomHandler {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Draws a value uniformly over `[a, b)`.
    pub fn draw_uniform(&mut self, a: f64, b: f64) -> f64 {
        debug_assert!(a <= b, "Invalid uniform range: [{a}, {b})");
        a + self.rng.random::<f64>() * (b - a)
    }

    /// Draws an exponentially distributed waiting time with the given rate.
    pub fn draw_exponential(&mut self, rate: f64) -> f64 {
        self.rng.sample(
            Exp::new(rate)
                .unwrap_or_else(|err| panic!("Invalid exponential rate {rate}: {err:?}")),
        )
    }

    /// Draws a Poisson-distributed event count with the given mean.
    pub fn draw_poisson(&mut self, lambda: f64) -> u64 {
        debug_assert!(lambda >= 0., "A Poisson mean cannot be negative: {lambda}");
        if lambda == 0. {
            return 0;
        }
        let count: f64 = self.rng.sample(
            Poisson::new(lambda)
                .unwrap_or_else(|err| panic!("Invalid Poisson mean {lambda}: {err:?}")),
        );
        count as u64
    }

    /// Draws one index with probability proportional to the given weights.
    pub fn draw_index(&mut self, weights: &[f64]) -> usize {
        let wheel = BiasedWheel::new(weights);
        let value = self.rng.random::<f64>() * wheel.total();
        wheel.find_index(value)
    }

    /// Draws `count` independent indices with probability proportional to the
    /// given weights.
    pub fn draw_multiple_indices(&mut self, weights: &[f64], count: usize) -> Vec<usize> {
        let wheel = BiasedWheel::new(weights);
        let values = (0..count)
            .map(|_| self.rng.random::<f64>() * wheel.total())
            .collect::<Vec<_>>();
        wheel.find_multiple_indices(&values)
    }
}
