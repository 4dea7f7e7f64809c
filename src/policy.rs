//! Default policies drive the agents the search does not plan for: during the
//! fast-forward to the next junction and during rollouts.
//!
//! They are deliberately cheap. A rollout calls its policy once per simulated
//! tick, so anything expensive here directly reduces the number of search
//! iterations that fit in the time budget.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::world::{Agent, Distance, JointAction, Move, NodeIndex, World};

/// Non-edible ghosts closer than this make the starter protagonist run.
pub const FLEE_DISTANCE: Distance = 20;

/// Supplies one tick worth of moves for every agent of a world.
pub trait DefaultPolicy {
    /// Moves for the next tick. Agents without an entry keep their course.
    fn moves<W: World>(&self, world: &W, rng: &mut dyn RngCore) -> JointAction;
}

/// Simple rule-based play for everyone.
///
/// The protagonist runs from the nearest non-edible ghost when it is within
/// [`FLEE_DISTANCE`], otherwise hunts the nearest edible ghost, otherwise heads
/// for the nearest pill. Ghosts requiring an action chase the protagonist, or
/// run from it while edible.
#[derive(Clone, Copy, Debug, Default)]
pub struct StarterPolicy;

impl DefaultPolicy for StarterPolicy {
    fn moves<W: World>(&self, world: &W, _rng: &mut dyn RngCore) -> JointAction {
        let mut moves = JointAction::new();
        moves.set(Agent::Protagonist, starter_protagonist_move(world));
        let target = world.position(Agent::Protagonist);
        for ghost in Agent::GHOSTS {
            if !world.requires_action(ghost) {
                continue;
            }
            let from = world.position(ghost);
            let last_move = world.last_move(ghost);
            let m = if world.is_edible(ghost) {
                world.retreat(from, target, last_move)
            } else {
                world.approach(from, target, last_move)
            };
            moves.set(ghost, m);
        }
        moves
    }
}

/// Rule-based protagonist ([`StarterPolicy`]) against ghosts picking a
/// uniformly random legal move whenever they require an action.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomGhosts;

impl DefaultPolicy for RandomGhosts {
    fn moves<W: World>(&self, world: &W, rng: &mut dyn RngCore) -> JointAction {
        let mut moves = JointAction::new();
        moves.set(Agent::Protagonist, starter_protagonist_move(world));
        for ghost in Agent::GHOSTS {
            if world.requires_action(ghost) {
                moves.set(ghost, random_legal_move(world, ghost, rng));
            }
        }
        moves
    }
}

/// Uniformly random move among the legal moves of `agent`, or
/// [`Move::Neutral`] if there are none.
pub fn random_legal_move<W: World>(world: &W, agent: Agent, rng: &mut dyn RngCore) -> Move {
    world
        .legal_moves(world.position(agent), world.last_move(agent))
        .moves()
        .choose(rng)
        .copied()
        .unwrap_or(Move::Neutral)
}

fn starter_protagonist_move<W: World>(world: &W) -> Move {
    let here = world.position(Agent::Protagonist);

    let nearest_threat = nearest(
        world,
        here,
        Agent::GHOSTS
            .into_iter()
            .filter(|ghost| !world.is_edible(*ghost))
            .map(|ghost| world.position(ghost)),
    );
    if let Some((threat, distance)) = nearest_threat {
        if distance < FLEE_DISTANCE {
            return world.retreat(here, threat, Move::Neutral);
        }
    }

    let nearest_prey = nearest(
        world,
        here,
        Agent::GHOSTS
            .into_iter()
            .filter(|ghost| world.is_edible(*ghost))
            .map(|ghost| world.position(ghost)),
    );
    if let Some((prey, _)) = nearest_prey {
        return world.approach(here, prey, Move::Neutral);
    }

    let pills = world
        .active_pill_indices()
        .into_iter()
        .chain(world.active_power_pill_indices());
    if let Some((pill, _)) = nearest(world, here, pills) {
        return world.approach(here, pill, Move::Neutral);
    }

    world.last_move(Agent::Protagonist)
}

/// Closest reachable node among `targets`.
fn nearest<W: World>(
    world: &W,
    from: NodeIndex,
    targets: impl Iterator<Item = NodeIndex>,
) -> Option<(NodeIndex, Distance)> {
    targets
        .filter_map(|target| world.distance(from, target).ok().map(|d| (target, d)))
        .min_by_key(|(_, distance)| *distance)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::maze::MazeWorld;

    fn setup(input: &str) -> MazeWorld {
        MazeWorld::try_from(input).expect("valid maze")
    }

    #[test]
    fn protagonist_heads_for_pills() {
        let world = setup(
            "
            #########
            #   M  .#
            #########
            #BPIS   #
            #########
            ",
        );
        let mut rng = StdRng::seed_from_u64(7);
        let moves = StarterPolicy.moves(&world, &mut rng);
        assert_eq!(moves.get(Agent::Protagonist), Some(Move::Right));
    }

    #[test]
    fn protagonist_runs_from_close_ghosts() {
        let world = setup(
            "
            ##########
            #.  M  B #
            ##########
            #PIS     #
            ##########
            ",
        );
        let mut rng = StdRng::seed_from_u64(7);
        let moves = RandomGhosts.moves(&world, &mut rng);
        assert_eq!(moves.get(Agent::Protagonist), Some(Move::Left));
    }

    #[test]
    fn ghosts_chase_at_junctions() {
        let mut world = setup(
            "
            #######
            #M   .#
            ###B###
            ### ###
            #PIS  #
            #######
            ",
        );
        let junction = world.node_at(1, 3).unwrap();
        world.place(Agent::Blinky, junction, Move::Up).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let moves = StarterPolicy.moves(&world, &mut rng);
        assert_eq!(moves.get(Agent::Blinky), Some(Move::Left));
        // Pinky sits in a dead end.
        assert_eq!(moves.get(Agent::Pinky), None);
    }

    #[test]
    fn random_moves_are_legal() {
        let mut world = setup(
            "
            #######
            #M   .#
            ###B###
            ### ###
            #PIS  #
            #######
            ",
        );
        let junction = world.node_at(1, 3).unwrap();
        world.place(Agent::Blinky, junction, Move::Up).unwrap();
        let legal = world.legal_moves(junction, Move::Up);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let m = random_legal_move(&world, Agent::Blinky, &mut rng);
            assert!(legal.has(m));
        }
    }

    #[test]
    fn no_legal_moves_is_neutral() {
        let mut world = setup("#MBPIS#");
        let mut rng = StdRng::seed_from_u64(3);
        // Dead end, and turning back is not allowed.
        world.place(Agent::Sue, world.node_at(0, 5).unwrap(), Move::Right).unwrap();
        assert_eq!(random_legal_move(&world, Agent::Sue, &mut rng), Move::Neutral);
    }
}
