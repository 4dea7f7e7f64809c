//! Maze primitives commonly used within [`crate::world`] and the search.

use std::fmt;

use arrayvec::ArrayVec;

/// Index of a walkable position ("node") in the maze graph.
pub type NodeIndex = usize;

/// Shortest path length between two nodes, in maze steps.
pub type Distance = u32;

/// A single step an agent can take during one tick. [`Move::Neutral`] means
/// "stay on course": it is what an agent without any legal move plays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
    Neutral,
}

impl Move {
    /// Directional moves in the order the maze enumerates them.
    pub const DIRECTIONS: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Returns the move going the other way. [`Move::Neutral`] is its own
    /// opposite.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Neutral => Self::Neutral,
        }
    }

    /// Row and column offsets of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Neutral => (0, 0),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Up => "UP",
                Self::Right => "RIGHT",
                Self::Down => "DOWN",
                Self::Left => "LEFT",
                Self::Neutral => "NEUTRAL",
            }
        )
    }
}

bitflags::bitflags! {
    /// Compact set of directional moves. Legal moves, tried moves and
    /// neighbourhoods are all expressed as a [`MoveSet`].
    ///
    /// [`Move::Neutral`] is never a member: an empty set is what "no legal
    /// move" looks like.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MoveSet: u8 {
        #[allow(missing_docs)]
        const UP = 0b0001;
        #[allow(missing_docs)]
        const RIGHT = 0b0010;
        #[allow(missing_docs)]
        const DOWN = 0b0100;
        #[allow(missing_docs)]
        const LEFT = 0b1000;
    }
}

impl MoveSet {
    /// Converts a directional move into a singleton set.
    #[must_use]
    pub const fn single(m: Move) -> Self {
        match m {
            Move::Up => Self::UP,
            Move::Right => Self::RIGHT,
            Move::Down => Self::DOWN,
            Move::Left => Self::LEFT,
            Move::Neutral => Self::empty(),
        }
    }

    /// Returns `true` if the directional move is in the set.
    #[must_use]
    pub const fn has(self, m: Move) -> bool {
        let flag = Self::single(m);
        !flag.is_empty() && self.contains(flag)
    }

    /// Adds a move to the set. Adding [`Move::Neutral`] does nothing.
    pub fn add(&mut self, m: Move) {
        self.insert(Self::single(m));
    }

    /// Number of moves in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Lists the moves in [`Move::DIRECTIONS`] order.
    #[must_use]
    pub fn moves(self) -> ArrayVec<Move, 4> {
        Move::DIRECTIONS
            .into_iter()
            .filter(|m| self.has(*m))
            .collect()
    }
}

impl FromIterator<Move> for MoveSet {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut set = Self::empty();
        for m in iter {
            set.add(m);
        }
        set
    }
}

/// Characters acting in the maze: one protagonist and four ghosts.
///
/// The protagonist is driven by the pathing search or a default policy; the
/// ghosts are driven by the coordination search, a rule or a default policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Agent {
    Protagonist,
    Blinky,
    Pinky,
    Inky,
    Sue,
}

impl Agent {
    /// Number of agents in a maze.
    pub const COUNT: usize = 5;
    /// All agents, protagonist first.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Protagonist,
        Self::Blinky,
        Self::Pinky,
        Self::Inky,
        Self::Sue,
    ];
    /// The four ghosts.
    pub const GHOSTS: [Self; 4] = [Self::Blinky, Self::Pinky, Self::Inky, Self::Sue];

    /// Dense index usable for per-agent arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_ghost(self) -> bool {
        !matches!(self, Self::Protagonist)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Protagonist => "protagonist",
                Self::Blinky => "blinky",
                Self::Pinky => "pinky",
                Self::Inky => "inky",
                Self::Sue => "sue",
            }
        )
    }
}

/// Per-agent moves for one tick. An absent entry means "no action required
/// this tick" for that agent, and the world keeps it on course.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct JointAction {
    moves: [Option<Move>; Agent::COUNT],
}

impl JointAction {
    /// Creates an action with no entries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            moves: [None; Agent::COUNT],
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn get(&self, agent: Agent) -> Option<Move> {
        self.moves[agent.index()]
    }

    /// Sets the move of `agent`, replacing any previous entry.
    pub fn set(&mut self, agent: Agent, m: Move) {
        self.moves[agent.index()] = Some(m);
    }

    /// Removes the entry of `agent`.
    pub fn clear(&mut self, agent: Agent) {
        self.moves[agent.index()] = None;
    }

    /// Number of agents with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.iter().flatten().count()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.iter().all(Option::is_none)
    }

    /// Iterates over `(agent, move)` entries in [`Agent::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Agent, Move)> + '_ {
        Agent::ALL
            .into_iter()
            .filter_map(|agent| self.get(agent).map(|m| (agent, m)))
    }

    /// Copies every entry of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for (agent, m) in other.iter() {
            self.set(agent, m);
        }
    }
}

impl FromIterator<(Agent, Move)> for JointAction {
    fn from_iter<I: IntoIterator<Item = (Agent, Move)>>(iter: I) -> Self {
        let mut action = Self::new();
        for (agent, m) in iter {
            action.set(agent, m);
        }
        action
    }
}

impl fmt::Display for JointAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (agent, m)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{agent}: {m}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn opposite() {
        for m in Move::DIRECTIONS {
            assert_ne!(m, m.opposite());
            assert_eq!(m, m.opposite().opposite());
        }
        assert_eq!(Move::Neutral.opposite(), Move::Neutral);
    }

    #[test]
    fn move_set() {
        let mut set = MoveSet::empty();
        assert_eq!(set.len(), 0);
        set.add(Move::Left);
        set.add(Move::Up);
        set.add(Move::Neutral);
        assert_eq!(set.len(), 2);
        assert!(set.has(Move::Up));
        assert!(!set.has(Move::Down));
        assert!(!set.has(Move::Neutral));
        assert_eq!(set.moves().as_slice(), &[Move::Up, Move::Left]);
        assert_eq!(
            [Move::Down, Move::Down, Move::Right]
                .into_iter()
                .collect::<MoveSet>(),
            MoveSet::DOWN | MoveSet::RIGHT
        );
    }

    #[test]
    fn agent_indices() {
        for (i, agent) in Agent::ALL.into_iter().enumerate() {
            assert_eq!(agent.index(), i);
        }
        assert!(Agent::GHOSTS.iter().all(|ghost| ghost.is_ghost()));
        assert!(!Agent::Protagonist.is_ghost());
    }

    #[test]
    fn joint_action() {
        let mut action = JointAction::new();
        assert!(action.is_empty());
        action.set(Agent::Sue, Move::Left);
        action.set(Agent::Pinky, Move::Up);
        assert_eq!(action.len(), 2);
        assert_eq!(action.get(Agent::Pinky), Some(Move::Up));
        assert_eq!(action.get(Agent::Blinky), None);
        assert_eq!(
            action.iter().collect::<Vec<_>>(),
            vec![(Agent::Pinky, Move::Up), (Agent::Sue, Move::Left)]
        );
        assert_eq!(action.to_string(), "{pinky: UP, sue: LEFT}");

        let mut other = JointAction::new();
        other.set(Agent::Sue, Move::Down);
        action.merge(&other);
        assert_eq!(action.get(Agent::Sue), Some(Move::Down));
        action.clear(Agent::Sue);
        assert_eq!(action.len(), 1);
    }
}
