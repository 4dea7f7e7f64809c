use std::time::Duration;

use crate::world::Distance;

/// Tunables of a [`crate::search::Search`].
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// UCT exploration constant used while descending the tree. The final
    /// pick at the root always uses zero.
    pub exploration: f64,
    /// Time allotted to a decision when the caller does not pass an explicit
    /// deadline.
    pub budget: Duration,
    /// Optional cap on search iterations, on top of the deadline.
    pub max_iterations: Option<u32>,
    /// Nodes whose controlled agents drifted further than this from their
    /// root positions are not expanded any further.
    pub drift_limit: Distance,
    /// Maximum number of ticks simulated by a rollout.
    pub rollout_steps: u32,
    /// Maximum number of ticks a single fast-forward segment may take.
    pub segment_ticks: u32,
    /// Seed of the search RNG. Seeded from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::coordination()
    }
}

impl SearchConfig {
    /// Settings for planning a group of ghosts.
    #[must_use]
    pub const fn coordination() -> Self {
        Self {
            exploration: std::f64::consts::FRAC_1_SQRT_2,
            budget: Duration::from_millis(30),
            max_iterations: None,
            drift_limit: 70,
            rollout_steps: 20,
            segment_ticks: 200,
            seed: None,
        }
    }

    /// Settings for planning the protagonist alone. The tree may reach
    /// further than for ghosts.
    #[must_use]
    pub const fn pathing() -> Self {
        Self {
            drift_limit: 90,
            ..Self::coordination()
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Stops the search after `iterations` iterations even if time is left.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_drift_limit(mut self, drift_limit: Distance) -> Self {
        self.drift_limit = drift_limit;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_rollout_steps(mut self, steps: u32) -> Self {
        self.rollout_steps = steps;
        self
    }

    /// Makes the search reproducible.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn presets() {
        let coordination = SearchConfig::coordination();
        assert_eq!(coordination, SearchConfig::default());
        assert!((coordination.exploration - 0.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(coordination.budget, Duration::from_millis(30));
        assert_eq!(coordination.drift_limit, 70);
        assert_eq!(coordination.rollout_steps, 20);
        assert_eq!(coordination.max_iterations, None);

        let pathing = SearchConfig::pathing();
        assert_eq!(pathing.drift_limit, 90);
        assert_eq!(pathing.budget, coordination.budget);
    }

    #[test]
    fn builder() {
        let config = SearchConfig::pathing()
            .with_max_iterations(100)
            .with_seed(42)
            .with_exploration(0.0)
            .with_drift_limit(5);
        assert_eq!(config.max_iterations, Some(100));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.drift_limit, 5);
        assert!(config.exploration.abs() < f64::EPSILON);
    }
}
