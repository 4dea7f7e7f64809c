//! Fast-forwarding a world from one junction to the next.
//!
//! Controlled agents only make decisions at junctions. Between two of them
//! they keep moving down their corridor, so a whole corridor becomes a single
//! tree edge.

use rand::RngCore;

use crate::policy::DefaultPolicy;
use crate::world::{Agent, JointAction, Move, World};

/// Plays `action` for one tick and then follows the corridors of the
/// `controlled` agents until one of them stands on a junction, the
/// protagonist is caught or `max_ticks` ticks have passed. Agents that are not
/// controlled are moved by `policy`.
///
/// At least one tick is always played. Returns the number of ticks played.
pub(crate) fn fast_forward<W: World, P: DefaultPolicy>(
    world: &mut W,
    controlled: &[Agent],
    action: &JointAction,
    policy: &P,
    max_ticks: u32,
    rng: &mut dyn RngCore,
) -> u32 {
    let mut headings = *action;
    let mut ticks = 0;
    loop {
        let mut moves = policy.moves(world, rng);
        for &agent in controlled {
            let heading = headings.get(agent).unwrap_or(Move::Neutral);
            let m = if ticks == 0 {
                heading
            } else {
                corridor_move(world, agent, heading)
            };
            moves.set(agent, m);
            headings.set(agent, m);
        }
        world.advance(&moves);
        ticks += 1;

        let at_junction = controlled
            .iter()
            .any(|agent| world.is_junction(world.position(*agent)));
        if at_junction || world.was_captured(Agent::Protagonist) || ticks >= max_ticks {
            return ticks;
        }
    }
}

/// Next move of `agent` inside a corridor: keep `heading` while it is legal,
/// otherwise take the first legal move. Edible agents run from the
/// protagonist instead.
pub(crate) fn corridor_move<W: World>(world: &W, agent: Agent, heading: Move) -> Move {
    let here = world.position(agent);
    let last_move = world.last_move(agent);
    if world.edible_time(agent) > 0 {
        return world.retreat(here, world.position(Agent::Protagonist), last_move);
    }
    let legal = world.legal_moves(here, last_move);
    if legal.has(heading) {
        return heading;
    }
    legal.moves().first().copied().unwrap_or(Move::Neutral)
}
