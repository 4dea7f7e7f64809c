//! Joint planning for a group of ghosts.
//!
//! A rollout is scored on its final state. Ghosts are expected to keep their
//! distance from the protagonist while edible and to stay close to it
//! otherwise, and not to bunch up with each other. Failing either adds a
//! penalty to every reciprocal term of the reward, so the score and time of
//! all rollouts seen during the decision are weighed against each other.

use itertools::Itertools;
use rand::RngCore;

use crate::policy::{DefaultPolicy, RandomGhosts, StarterPolicy};
use crate::search::rollout::{play_out, RewardHistory};
use crate::search::tree::{NodeId, Tree};
use crate::search::{Reward, SearchConfig, Variant};
use crate::world::{Agent, Distance, World};

/// Threshold separating "near" from "far" to the protagonist.
pub const PROXIMITY: Distance = 40;
/// Ghosts closer to each other than this are bunched up.
pub const SPACING: Distance = 15;
/// Penalty per ghost on the wrong side of [`PROXIMITY`].
pub const CONTAINMENT_WEIGHT: f64 = 25.0;
/// Penalty per pair of ghosts closer than [`SPACING`].
pub const SPACING_WEIGHT: f64 = 100.0;
/// Weight of the score term against the time term.
pub const ALPHA: f64 = 0.1;
/// Scales the reward of rollouts in which the protagonist was caught.
pub const CAPTURE_MULTIPLIER: f64 = 100.0;

/// Coordination search for ghosts: uncontrolled agents follow `F` between
/// junctions and everybody follows `R` during rollouts.
#[derive(Clone, Debug, Default)]
pub struct Coordination<F = StarterPolicy, R = RandomGhosts> {
    fast_forward: F,
    rollout: R,
}

impl<F: DefaultPolicy, R: DefaultPolicy> Coordination<F, R> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(fast_forward: F, rollout: R) -> Self {
        Self {
            fast_forward,
            rollout,
        }
    }
}

impl<F: DefaultPolicy, R: DefaultPolicy> Variant for Coordination<F, R> {
    type FastForward = F;

    fn fast_forward_policy(&self) -> &F {
        &self.fast_forward
    }

    fn step_reward<W: World>(&self, _before: &W, _after: &W) -> Option<Reward> {
        None
    }

    fn evaluate<W: World>(
        &self,
        tree: &Tree<W>,
        leaf: NodeId,
        history: &mut RewardHistory,
        config: &SearchConfig,
        rng: &mut dyn RngCore,
    ) -> Reward {
        let playout = play_out(
            tree.get(leaf).world(),
            &self.rollout,
            config.rollout_steps,
            rng,
        );
        let ghosts: Vec<Agent> = tree
            .controlled()
            .iter()
            .copied()
            .filter(|agent| agent.is_ghost())
            .collect();
        let penalty = containment_penalty(&playout.world, &ghosts)
            + spacing_penalty(&playout.world, &ghosts);
        history.record(playout.world.score(), playout.world.elapsed_ticks());
        let reward = history.weighted_reciprocals(penalty, ALPHA);
        if playout.captured {
            reward * CAPTURE_MULTIPLIER
        } else {
            reward
        }
    }
}

/// Penalty for ghosts that are edible within [`PROXIMITY`] of the
/// protagonist, or not edible and further away than that. Ghosts that can not
/// reach the protagonist are not penalized.
#[must_use]
pub fn containment_penalty<W: World>(world: &W, ghosts: &[Agent]) -> f64 {
    let protagonist = world.position(Agent::Protagonist);
    let misplaced = ghosts
        .iter()
        .filter(|ghost| {
            world
                .distance(world.position(**ghost), protagonist)
                .is_ok_and(|distance| {
                    if world.is_edible(**ghost) {
                        distance < PROXIMITY
                    } else {
                        distance > PROXIMITY
                    }
                })
        })
        .count();
    CONTAINMENT_WEIGHT * misplaced as f64
}

/// Penalty for every pair of ghosts closer than [`SPACING`] to each other.
#[must_use]
pub fn spacing_penalty<W: World>(world: &W, ghosts: &[Agent]) -> f64 {
    let bunched = ghosts
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| {
            world
                .distance(world.position(**a), world.position(**b))
                .is_ok_and(|distance| distance < SPACING)
        })
        .count();
    SPACING_WEIGHT * bunched as f64
}
