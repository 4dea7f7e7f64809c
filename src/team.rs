//! Per-tick controller for the four ghosts.
//!
//! Blinky leads by a fixed rule. The other ghosts are planned jointly by a
//! coordination search whenever at least one of them stands on a junction.

use std::time::Instant;

use tracing::debug;

use crate::policy::{DefaultPolicy, RandomGhosts, StarterPolicy};
use crate::search::{Coordination, Search, SearchConfig};
use crate::world::{Agent, Distance, JointAction, Move, NodeIndex, World};

/// The lead ghost turns away when the protagonist gets closer than this to an
/// active power pill.
pub const POWER_PILL_ALERT_DISTANCE: Distance = 40;

/// Moves all ghosts of a maze, one tick at a time.
#[derive(Debug)]
pub struct GhostTeam<F = StarterPolicy, R = RandomGhosts> {
    search: Search<Coordination<F, R>>,
}

impl GhostTeam {
    /// Creates a team using the default coordination policies.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self::with_search(Search::new(config, <Coordination>::default()))
    }
}

impl<F: DefaultPolicy, R: DefaultPolicy> GhostTeam<F, R> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_search(search: Search<Coordination<F, R>>) -> Self {
        Self { search }
    }

    /// The engine planning the ghosts at junctions.
    #[must_use]
    pub const fn search(&self) -> &Search<Coordination<F, R>> {
        &self.search
    }

    /// Moves for the ghosts that require an action this tick.
    ///
    /// Edible ghosts run from the protagonist. The others are searched for
    /// together if they stand on a junction, with `deadline` bounding the
    /// search. Ghosts without an entry keep their course, including those
    /// the world asks to act away from a junction.
    pub fn moves<W: World>(&mut self, world: &W, deadline: Instant) -> JointAction {
        let mut moves = JointAction::new();
        if let Some(m) = lead_move(world) {
            moves.set(Agent::Blinky, m);
        }

        let protagonist = world.position(Agent::Protagonist);
        let mut searched = Vec::new();
        for ghost in Agent::GHOSTS.into_iter().filter(|ghost| *ghost != Agent::Blinky) {
            if !world.requires_action(ghost) {
                continue;
            }
            let here = world.position(ghost);
            if world.is_edible(ghost) {
                moves.set(ghost, world.retreat(here, protagonist, world.last_move(ghost)));
            } else if world.is_junction(here) {
                searched.push(ghost);
            }
        }

        if !searched.is_empty() {
            let planned = self.search.decide(world, &searched, deadline);
            debug!(ghosts = searched.len(), %planned, "planned ghosts");
            moves.merge(&planned);
        }
        moves
    }
}

/// Blinky chases the protagonist unless it is edible or the protagonist is
/// about to eat a power pill.
fn lead_move<W: World>(world: &W) -> Option<Move> {
    let lead = Agent::Blinky;
    if !world.requires_action(lead) {
        return None;
    }
    let here = world.position(lead);
    let protagonist = world.position(Agent::Protagonist);
    let last_move = world.last_move(lead);
    if world.is_edible(lead) || near_power_pill(world, protagonist) {
        Some(world.retreat(here, protagonist, last_move))
    } else {
        Some(world.approach(here, protagonist, last_move))
    }
}

fn near_power_pill<W: World>(world: &W, node: NodeIndex) -> bool {
    world.active_power_pill_indices().into_iter().any(|pill| {
        world
            .distance(node, pill)
            .is_ok_and(|distance| distance < POWER_PILL_ALERT_DISTANCE)
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::maze::MazeWorld;
    use crate::world::{MoveSet, NotReachable};

    fn team() -> GhostTeam {
        GhostTeam::new(SearchConfig::coordination().with_max_iterations(50).with_seed(9))
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn lead_rule_at_junction() {
        let world = MazeWorld::try_from(
            "
            ###########
            #M...B...o#
            #####.#####
            #PIS      #
            ###########
            ",
        )
        .expect("valid maze");
        // The power pill is 8 away from the protagonist: Blinky keeps away.
        assert_eq!(lead_move(&world), Some(Move::Right));

        let world = MazeWorld::try_from(
            "
            ###########
            #M...B....#
            #####.#####
            #PIS      #
            ###########
            ",
        )
        .expect("valid maze");
        // No power pill left: Blinky chases.
        assert_eq!(lead_move(&world), Some(Move::Left));
    }

    #[test]
    fn ghosts_at_junctions_are_searched() {
        let mut world = MazeWorld::try_from(
            "
            #########
            #M......#
            #.#####.#
            #P......#
            #.#####.#
            #......B#
            #########
            #IS    o#
            #########
            ",
        )
        .expect("valid maze");
        world.consume(world.node_at(1, 2).unwrap());
        world.consume(world.node_at(7, 7).unwrap());
        let mut team = team();
        let moves = team.moves(&world, deadline());

        // Pinky sits on a junction; Inky and Sue are in corridors.
        let pinky = world.legal_moves(world.position(Agent::Pinky), Move::Neutral);
        assert!(moves.get(Agent::Pinky).is_some_and(|m| pinky.has(m)));
        assert_eq!(moves.get(Agent::Inky), None);
        assert_eq!(moves.get(Agent::Sue), None);
        assert_eq!(team.search().stats().iterations, 50);
    }

    /// Asks every agent for a move on every tick.
    #[derive(Clone)]
    struct Eager(MazeWorld);

    impl World for Eager {
        fn advance(&mut self, moves: &JointAction) {
            self.0.advance(moves);
        }

        fn position(&self, agent: Agent) -> NodeIndex {
            self.0.position(agent)
        }

        fn last_move(&self, agent: Agent) -> Move {
            self.0.last_move(agent)
        }

        fn legal_moves(&self, node: NodeIndex, last_move: Move) -> MoveSet {
            self.0.legal_moves(node, last_move)
        }

        fn neighbour(&self, node: NodeIndex, direction: Move) -> Option<NodeIndex> {
            self.0.neighbour(node, direction)
        }

        fn is_junction(&self, node: NodeIndex) -> bool {
            self.0.is_junction(node)
        }

        fn is_edible(&self, agent: Agent) -> bool {
            self.0.is_edible(agent)
        }

        fn edible_time(&self, agent: Agent) -> u32 {
            self.0.edible_time(agent)
        }

        fn distance(&self, from: NodeIndex, to: NodeIndex) -> Result<Distance, NotReachable> {
            self.0.distance(from, to)
        }

        fn active_pills(&self) -> usize {
            self.0.active_pills()
        }

        fn total_pills(&self) -> usize {
            self.0.total_pills()
        }

        fn active_power_pills(&self) -> usize {
            self.0.active_power_pills()
        }

        fn total_power_pills(&self) -> usize {
            self.0.total_power_pills()
        }

        fn active_pill_indices(&self) -> Vec<NodeIndex> {
            self.0.active_pill_indices()
        }

        fn active_power_pill_indices(&self) -> Vec<NodeIndex> {
            self.0.active_power_pill_indices()
        }

        fn score(&self) -> i32 {
            self.0.score()
        }

        fn elapsed_ticks(&self) -> u32 {
            self.0.elapsed_ticks()
        }

        fn lives_remaining(&self) -> u32 {
            self.0.lives_remaining()
        }

        fn was_captured(&self, agent: Agent) -> bool {
            self.0.was_captured(agent)
        }

        fn requires_action(&self, _agent: Agent) -> bool {
            true
        }
    }

    #[test]
    fn ghosts_in_corridors_are_left_alone() {
        let mut world = MazeWorld::try_from(
            "
            #########
            #M......#
            #.#####.#
            #P......#
            #.#####.#
            #......B#
            #########
            #IS    o#
            #########
            ",
        )
        .expect("valid maze");
        world.consume(world.node_at(1, 2).unwrap());
        world.consume(world.node_at(7, 7).unwrap());
        let world = Eager(world);
        assert!(world.requires_action(Agent::Inky));
        assert!(!world.is_junction(world.position(Agent::Inky)));

        let mut team = team();
        let moves = team.moves(&world, deadline());
        assert!(moves.get(Agent::Blinky).is_some());
        assert!(moves.get(Agent::Pinky).is_some());
        // Asked to act, but neither edible nor on a junction.
        assert_eq!(moves.get(Agent::Inky), None);
        assert_eq!(moves.get(Agent::Sue), None);
        assert_eq!(team.search().stats().iterations, 50);
    }

    #[test]
    fn edible_ghosts_retreat() {
        let mut world = MazeWorld::try_from(
            "
            #########
            #Mo.....#
            #.#####.#
            #P......#
            #.#####.#
            #......B#
            #########
            #IS     #
            #########
            ",
        )
        .expect("valid maze");
        world.advance(&[(Agent::Protagonist, Move::Right)].into_iter().collect());
        assert!(world.is_edible(Agent::Pinky));
        // Put Pinky back on its junction, heading nowhere in particular.
        world.place(Agent::Pinky, world.node_at(3, 1).unwrap(), Move::Neutral).unwrap();

        let mut team = team();
        let moves = team.moves(&world, deadline());
        let pinky = moves.get(Agent::Pinky).unwrap();
        let here = world.position(Agent::Pinky);
        let next = world.neighbour(here, pinky).unwrap();
        let protagonist = world.position(Agent::Protagonist);
        let before = world.distance(here, protagonist).unwrap();
        assert!(world.distance(next, protagonist).unwrap() > before);
        // Nobody was searched.
        assert_eq!(team.search().stats().iterations, 0);
    }
}
