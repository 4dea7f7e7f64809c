//! Upper Confidence bounds applied to Trees.

use crate::search::tree::{NodeId, Tree};
use crate::search::Reward;
use crate::world::World;

/// UCT value of a child visited `visits` times under a parent visited
/// `parent_visits` times: mean reward plus an exploration bonus scaled by
/// `exploration`.
#[must_use]
pub fn uct_value(
    cumulative_reward: Reward,
    visits: u32,
    parent_visits: u32,
    exploration: f64,
) -> f64 {
    let visits = f64::from(visits);
    let bonus = (2.0 * f64::from(parent_visits).ln() / visits).sqrt();
    exploration.mul_add(bonus, cumulative_reward / visits)
}

/// Child of `id` with the highest UCT value, `None` if it has no children.
///
/// Children are scanned in creation order and a value equal to the best one
/// so far replaces it, so the last of several tied children wins. A NaN value
/// never wins.
#[must_use]
pub fn best_child<W: World>(tree: &Tree<W>, id: NodeId, exploration: f64) -> Option<NodeId> {
    let node = tree.get(id);
    let mut best = None;
    let mut best_value = f64::NEG_INFINITY;
    for &child in node.children() {
        let child_node = tree.get(child);
        let value = uct_value(
            child_node.cumulative_reward(),
            child_node.visits(),
            node.visits(),
            exploration,
        );
        if value >= best_value {
            best_value = value;
            best = Some(child);
        }
    }
    best
}
