//! The narrow query/advance contract the search consumes.
//!
//! The search never looks inside a world: legality of moves, scoring, pill
//! and ghost mechanics all stay behind [`World`]. [`crate::maze::MazeWorld`]
//! is the reference implementation.

pub mod core;

use thiserror::Error;

pub use self::core::{Agent, Distance, JointAction, Move, MoveSet, NodeIndex};

/// Returned by [`World::distance`] when no path connects two nodes (or one of
/// them is not part of the maze).
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("no path from node {from} to node {to}")]
pub struct NotReachable {
    /// Source node of the failed query.
    pub from: NodeIndex,
    /// Destination node of the failed query.
    pub to: NodeIndex,
}

/// Cloneable simulation state of a tick-based maze game.
///
/// `Clone` must produce an independent deep copy: advancing the clone never
/// affects the source.
pub trait World: Clone {
    /// Advances the simulation by one tick. Agents without an entry in
    /// `moves` keep their current course.
    fn advance(&mut self, moves: &JointAction);

    /// Current node of `agent`.
    fn position(&self, agent: Agent) -> NodeIndex;

    /// The move `agent` made on its last tick.
    fn last_move(&self, agent: Agent) -> Move;

    /// Moves available at `node` for an agent whose last move was
    /// `last_move`. Reversing is excluded unless `last_move` is
    /// [`Move::Neutral`].
    fn legal_moves(&self, node: NodeIndex, last_move: Move) -> MoveSet;

    /// Node reached by taking `direction` from `node`, if any.
    fn neighbour(&self, node: NodeIndex, direction: Move) -> Option<NodeIndex>;

    /// Returns `true` if `node` offers a choice of direction.
    fn is_junction(&self, node: NodeIndex) -> bool;

    /// Returns `true` if `agent` is a ghost that can currently be eaten.
    fn is_edible(&self, agent: Agent) -> bool;

    /// Ticks left until `agent` stops being edible; zero when it is not.
    fn edible_time(&self, agent: Agent) -> u32;

    /// Shortest path length between two nodes.
    ///
    /// # Errors
    ///
    /// Returns [`NotReachable`] if there is no path from `from` to `to`.
    fn distance(&self, from: NodeIndex, to: NodeIndex) -> Result<Distance, NotReachable>;

    #[allow(missing_docs)]
    fn active_pills(&self) -> usize;
    #[allow(missing_docs)]
    fn total_pills(&self) -> usize;
    #[allow(missing_docs)]
    fn active_power_pills(&self) -> usize;
    #[allow(missing_docs)]
    fn total_power_pills(&self) -> usize;

    /// Nodes that still hold a pill.
    fn active_pill_indices(&self) -> Vec<NodeIndex>;

    /// Nodes that still hold a power pill.
    fn active_power_pill_indices(&self) -> Vec<NodeIndex>;

    /// Current game score.
    fn score(&self) -> i32;

    /// Ticks elapsed since the game started.
    fn elapsed_ticks(&self) -> u32;

    #[allow(missing_docs)]
    fn lives_remaining(&self) -> u32;

    /// Returns `true` if `agent` was caught on the most recent tick: the
    /// protagonist by a ghost, or a ghost by the protagonist.
    fn was_captured(&self, agent: Agent) -> bool;

    /// Returns `true` if `agent` has to be told where to go this tick.
    ///
    /// Defaults to standing on a junction. Worlds may also ask for moves
    /// elsewhere, for instance from a ghost leaving its house.
    fn requires_action(&self, agent: Agent) -> bool {
        self.is_junction(self.position(agent))
    }

    /// Legal move from `from` that gets closest to `target`.
    ///
    /// Neighbours the target can not be reached from are skipped. Falls back
    /// to the first legal move and then to [`Move::Neutral`].
    fn approach(&self, from: NodeIndex, target: NodeIndex, last_move: Move) -> Move {
        self.pick_by_distance(from, target, last_move, |candidate, best| candidate < best)
    }

    /// Legal move from `from` that gets furthest away from `target`.
    fn retreat(&self, from: NodeIndex, target: NodeIndex, last_move: Move) -> Move {
        self.pick_by_distance(from, target, last_move, |candidate, best| candidate > best)
    }

    #[doc(hidden)]
    fn pick_by_distance(
        &self,
        from: NodeIndex,
        target: NodeIndex,
        last_move: Move,
        better: impl Fn(Distance, Distance) -> bool,
    ) -> Move {
        let legal = self.legal_moves(from, last_move).moves();
        let mut best: Option<(Move, Distance)> = None;
        for direction in &legal {
            let Some(next) = self.neighbour(from, *direction) else {
                continue;
            };
            let Ok(distance) = self.distance(next, target) else {
                continue;
            };
            if best.map_or(true, |(_, d)| better(distance, d)) {
                best = Some((*direction, distance));
            }
        }
        best.map(|(m, _)| m)
            .or_else(|| legal.first().copied())
            .unwrap_or(Move::Neutral)
    }
}
