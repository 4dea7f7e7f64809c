//! Planning for the protagonist alone.
//!
//! Every node is scored once, when it is created, by comparing the world
//! before and after the segment that led to it. Rollouts reuse that score.

use rand::RngCore;

use crate::policy::{DefaultPolicy, StarterPolicy};
use crate::search::rollout::RewardHistory;
use crate::search::tree::{NodeId, Tree};
use crate::search::{Reward, SearchConfig, Variant};
use crate::world::{Agent, Distance, World};

/// Eating a power pill is wasted if the ghosts are on average further away
/// than this afterwards.
pub const THREAT_DISTANCE: Distance = 100;
/// Reward of a segment in which the protagonist was caught.
pub const CAPTURED_REWARD: Reward = 0.0;
/// Reward of a segment that spent a power pill with no ghost around.
pub const WASTED_POWER_PILL_REWARD: Reward = 0.0;
/// Reward of a segment in which no pill was eaten.
pub const IDLE_REWARD: Reward = 0.2;
/// Reward of a segment in which pills were eaten.
pub const FEEDING_REWARD: Reward = 1.0;

/// Pathing search for the protagonist; the ghosts follow `F`.
#[derive(Clone, Debug, Default)]
pub struct Pathing<F = StarterPolicy> {
    fast_forward: F,
}

impl<F: DefaultPolicy> Pathing<F> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(fast_forward: F) -> Self {
        Self { fast_forward }
    }
}

impl<F: DefaultPolicy> Variant for Pathing<F> {
    type FastForward = F;

    fn fast_forward_policy(&self) -> &F {
        &self.fast_forward
    }

    fn step_reward<W: World>(&self, before: &W, after: &W) -> Option<Reward> {
        Some(step_reward(before, after))
    }

    fn evaluate<W: World>(
        &self,
        tree: &Tree<W>,
        leaf: NodeId,
        _history: &mut RewardHistory,
        _config: &SearchConfig,
        _rng: &mut dyn RngCore,
    ) -> Reward {
        tree.get(leaf).step_reward().unwrap_or(0.0)
    }
}

/// Scores the segment that took the game from `before` to `after`.
#[must_use]
pub fn step_reward<W: World>(before: &W, after: &W) -> Reward {
    if after.lives_remaining() < before.lives_remaining() {
        return CAPTURED_REWARD;
    }
    let wasted_power_pill = after.active_power_pills() < before.active_power_pills()
        && average_threat_distance(after)
            .map_or(true, |distance| distance > f64::from(THREAT_DISTANCE));
    if wasted_power_pill {
        return WASTED_POWER_PILL_REWARD;
    }
    if after.active_pills() == before.active_pills() {
        return IDLE_REWARD;
    }
    FEEDING_REWARD
}

/// Mean path distance from the protagonist to the ghosts that can reach it,
/// `None` if none can.
fn average_threat_distance<W: World>(world: &W) -> Option<f64> {
    let protagonist = world.position(Agent::Protagonist);
    let distances: Vec<Distance> = Agent::GHOSTS
        .into_iter()
        .filter_map(|ghost| world.distance(protagonist, world.position(ghost)).ok())
        .collect();
    if distances.is_empty() {
        return None;
    }
    let total: f64 = distances.iter().copied().map(f64::from).sum();
    Some(total / distances.len() as f64)
}
