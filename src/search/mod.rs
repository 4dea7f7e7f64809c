//! Implements decision-time [Monte Carlo Tree Search] (MCTS) for maze agents.
//!
//! Each decision builds a fresh tree rooted at the current world. Edges are
//! joint actions of the controlled agents taken at a junction, followed by a
//! fast-forward to the next junction. The search repeats four steps until the
//! deadline passes:
//!
//! 1. Selection: descend from the root by UCT until a node that still has
//!    untried moves is found.
//! 2. Expansion: add one child for a random untried joint action, unless the
//!    controlled agents already drifted too far from where they started.
//! 3. Rollout: estimate the value of the new node, see [`Variant::evaluate`].
//! 4. Backpropagation: add the estimate to every node up to the root.
//!
//! The action of the best root child by mean reward is played. Whenever the
//! tree can not answer, every controlled agent gets a random legal move.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

mod config;
mod coordination;
mod expansion;
mod pathing;
mod rollout;
mod tree;
mod uct;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

pub use self::config::SearchConfig;
pub use self::coordination::{
    containment_penalty, spacing_penalty, Coordination, ALPHA, CAPTURE_MULTIPLIER,
    CONTAINMENT_WEIGHT, PROXIMITY, SPACING, SPACING_WEIGHT,
};
pub use self::pathing::{
    step_reward, Pathing, CAPTURED_REWARD, FEEDING_REWARD, IDLE_REWARD, THREAT_DISTANCE,
    WASTED_POWER_PILL_REWARD,
};
pub use self::rollout::{play_out, Playout, RewardHistory};
pub use self::tree::{Node, NodeId, Tree};
pub use self::uct::{best_child, uct_value};
use crate::policy::{random_legal_move, DefaultPolicy};
use crate::world::{Agent, JointAction, Move, World};

/// Value estimate accumulated in the tree.
pub type Reward = f64;

/// What distinguishes the coordination search from the pathing search: how
/// uncontrolled agents move between junctions and how leaves are valued.
pub trait Variant {
    /// Moves the agents the search does not control during a fast-forward.
    type FastForward: DefaultPolicy;

    #[allow(missing_docs)]
    fn fast_forward_policy(&self) -> &Self::FastForward;

    /// Reward attached to a node when it is created from the segment that
    /// took the game from `before` to `after`.
    fn step_reward<W: World>(&self, before: &W, after: &W) -> Option<Reward>;

    /// Estimates the value of `leaf`. `history` lives as long as one
    /// decision.
    fn evaluate<W: World>(
        &self,
        tree: &Tree<W>,
        leaf: NodeId,
        history: &mut RewardHistory,
        config: &SearchConfig,
        rng: &mut dyn RngCore,
    ) -> Reward;
}

/// Summary of the most recent decision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStats {
    /// Completed select/expand/rollout/backpropagate iterations.
    pub iterations: u32,
    /// Nodes in the tree at the end of the search.
    pub tree_size: usize,
    /// Entries in the reward history at the end of the search.
    pub rollouts: usize,
    /// Whether the moves were picked at random instead of by the tree.
    pub fallback: bool,
    #[allow(missing_docs)]
    pub elapsed: Duration,
}

/// Decides when the search has to stop.
struct Limiter {
    timer: Instant,
    deadline: Instant,
    iterations: Option<u32>,
}

impl Limiter {
    fn should_stop(&self, iterations: u32) -> bool {
        Instant::now() >= self.deadline || self.iterations.is_some_and(|max| iterations >= max)
    }
}

/// MCTS decision engine, specialized by a [`Variant`].
#[derive(Debug)]
pub struct Search<V> {
    config: SearchConfig,
    variant: V,
    rng: StdRng,
    stats: SearchStats,
}

impl<V: Variant> Search<V> {
    /// Creates an engine. The RNG is seeded from [`SearchConfig::seed`] if
    /// present.
    #[must_use]
    pub fn new(config: SearchConfig, variant: V) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            variant,
            rng,
            stats: SearchStats::default(),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn variant(&self) -> &V {
        &self.variant
    }

    /// Statistics of the most recent decision.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Searches until `deadline` and returns a move for every agent in
    /// `controlled`.
    ///
    /// The deadline is checked between iterations, so the call may overrun
    /// it by one iteration.
    pub fn decide<W: World>(
        &mut self,
        world: &W,
        controlled: &[Agent],
        deadline: Instant,
    ) -> JointAction {
        let limiter = Limiter {
            timer: Instant::now(),
            deadline,
            iterations: self.config.max_iterations,
        };
        self.stats = SearchStats::default();
        if controlled.is_empty() {
            return JointAction::new();
        }

        let mut history = RewardHistory::new();
        let mut tree = Tree::new(world.clone(), controlled);
        let mut iterations = 0;
        while !limiter.should_stop(iterations) {
            let Some(leaf) = self.tree_policy(&mut tree) else {
                debug!(iterations, "selection found no node");
                return self.fallback(world, &tree, &history, iterations, &limiter);
            };
            let reward = self
                .variant
                .evaluate(&tree, leaf, &mut history, &self.config, &mut self.rng);
            tree.backpropagate(leaf, reward);
            iterations += 1;
        }

        let Some(best) = tree.best_child(Tree::<W>::ROOT, 0.0) else {
            debug!(iterations, "root has no children");
            return self.fallback(world, &tree, &history, iterations, &limiter);
        };
        let action = tree.get(best).action().copied().unwrap_or_default();
        self.record(&tree, &history, iterations, false, &limiter);
        debug!(
            iterations,
            tree_size = tree.len(),
            rollouts = history.len(),
            elapsed = ?self.stats.elapsed,
            %action,
            "search finished"
        );
        action
    }

    /// Like [`Search::decide`], with the deadline [`SearchConfig::budget`]
    /// from now.
    pub fn decide_within_budget<W: World>(
        &mut self,
        world: &W,
        controlled: &[Agent],
    ) -> JointAction {
        let deadline = Instant::now() + self.config.budget;
        self.decide(world, controlled, deadline)
    }

    /// Descends by UCT to the first node that is not fully expanded and
    /// expands it. `None` if a fully expanded node without children is
    /// reached.
    fn tree_policy<W: World>(&mut self, tree: &mut Tree<W>) -> Option<NodeId> {
        let mut id = Tree::<W>::ROOT;
        loop {
            if !tree.is_fully_expanded(id) {
                return Some(self.expand(tree, id));
            }
            id = tree.best_child(id, self.config.exploration)?;
        }
    }

    /// Adds a child of `id` for a random untried joint action. Returns `id`
    /// itself if the controlled agents drifted too far to expand it.
    fn expand<W: World>(&mut self, tree: &mut Tree<W>, id: NodeId) -> NodeId {
        if !tree.within_drift(id, self.config.drift_limit) {
            return id;
        }
        let action = tree.untried_action(id, &mut self.rng);
        let before = tree.get(id).world();
        let mut world = before.clone();
        let ticks = expansion::fast_forward(
            &mut world,
            tree.controlled(),
            &action,
            self.variant.fast_forward_policy(),
            self.config.segment_ticks,
            &mut self.rng,
        );
        let step_reward = self.variant.step_reward(before, &world);
        let child = tree.add_child(id, world, action, step_reward);
        trace!(parent = id, child, ticks, %action, "expanded");
        child
    }

    fn fallback<W: World>(
        &mut self,
        world: &W,
        tree: &Tree<W>,
        history: &RewardHistory,
        iterations: u32,
        limiter: &Limiter,
    ) -> JointAction {
        let action = tree
            .controlled()
            .iter()
            .map(|agent| (*agent, random_legal_move(world, *agent, &mut self.rng)))
            .collect();
        self.record(tree, history, iterations, true, limiter);
        debug!(%action, "falling back to random moves");
        action
    }

    fn record<W: World>(
        &mut self,
        tree: &Tree<W>,
        history: &RewardHistory,
        iterations: u32,
        fallback: bool,
        limiter: &Limiter,
    ) {
        self.stats = SearchStats {
            iterations,
            tree_size: tree.len(),
            rollouts: history.len(),
            fallback,
            elapsed: limiter.timer.elapsed(),
        };
    }
}

impl<F: DefaultPolicy> Search<Pathing<F>> {
    /// Searches until `deadline` and returns the next move of the
    /// protagonist.
    pub fn decide_move<W: World>(&mut self, world: &W, deadline: Instant) -> Move {
        self.decide(world, &[Agent::Protagonist], deadline)
            .get(Agent::Protagonist)
            .unwrap_or(Move::Neutral)
    }
}
