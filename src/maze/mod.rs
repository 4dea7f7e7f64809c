//! Reference [`World`] implementation: a small tick-based maze game with
//! pills, power pills, one protagonist and four ghosts.
//!
//! Mazes are described with ASCII layouts, one row per line:
//!
//! | Character | Meaning |
//! | --------- | ------- |
//! | `#` | wall |
//! | ` ` | empty corridor |
//! | `.` | pill |
//! | `o` | power pill |
//! | `M` | protagonist spawn |
//! | `B`, `P`, `I`, `S` | ghost spawns (Blinky, Pinky, Inky, Sue) |
//!
//! Rows are trimmed, so layouts should be enclosed by walls. Blank lines are
//! ignored.
//!
//! ```
//! use mazetree::maze::MazeWorld;
//! use mazetree::world::World;
//!
//! let world = MazeWorld::try_from(
//!     "
//!     #######
//!     #M..o.#
//!     #.###.#
//!     #BPIS.#
//!     #######
//!     ",
//! )
//! .expect("valid maze");
//! assert_eq!(world.total_pills(), 6);
//! assert_eq!(world.total_power_pills(), 1);
//! ```

mod layout;

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Context};

pub use self::layout::Layout;
use crate::world::{Agent, Distance, JointAction, Move, MoveSet, NodeIndex, NotReachable, World};

/// Points for eating a pill.
pub const PILL_SCORE: i32 = 10;
/// Points for eating a power pill.
pub const POWER_PILL_SCORE: i32 = 50;
/// Points for eating an edible ghost.
pub const GHOST_SCORE: i32 = 200;
/// Ticks ghosts stay edible after a power pill is eaten.
pub const EDIBLE_TIME: u32 = 40;
/// Lives the protagonist starts with.
pub const INITIAL_LIVES: u32 = 3;

/// A full-sized maze with a ghost house in the middle and a power pill in
/// every corner.
pub const CLASSIC: &str = "
    #####################
    #.........#.........#
    #o###.###.#.###.###o#
    #...................#
    #.###.#.#####.#.###.#
    #.....#...#...#.....#
    #####.### # ###.#####
    #####.#   B   #.#####
    #####.# ## ## #.#####
    #    .  #PIS#  .    #
    #####.# ##### #.#####
    #####.#       #.#####
    #####.# ##### #.#####
    #.........#.........#
    #.###.###.#.###.###.#
    #o..#.....M.....#..o#
    ###.#.#.#####.#.#.###
    #.....#...#...#.....#
    #.#######.#.#######.#
    #...................#
    #####################
";

/// Dynamic state of a maze game. Topology is shared between clones; every
/// other field is copied, so clones evolve independently.
#[derive(Clone, Debug)]
pub struct MazeWorld {
    layout: Arc<Layout>,
    spawns: [NodeIndex; Agent::COUNT],
    positions: [NodeIndex; Agent::COUNT],
    last_moves: [Move; Agent::COUNT],
    edible: [u32; Agent::COUNT],
    captured: [bool; Agent::COUNT],
    pills: Vec<bool>,
    power_pills: Vec<bool>,
    active_pills: usize,
    total_pills: usize,
    active_power_pills: usize,
    total_power_pills: usize,
    score: i32,
    ticks: u32,
    lives: u32,
}

impl MazeWorld {
    /// Parses an ASCII layout (see the [module documentation](self)).
    ///
    /// # Errors
    ///
    /// Fails on unknown characters, missing or duplicated agents and layouts
    /// without walkable cells.
    pub fn from_layout(input: &str) -> anyhow::Result<Self> {
        let rows: Vec<&str> = input
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();

        let mut grid = Vec::with_capacity(rows.len());
        let mut spawns: [Option<(usize, usize)>; Agent::COUNT] = [None; Agent::COUNT];
        let mut pills = Vec::new();
        let mut power_pills = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(line.len());
            for (column, symbol) in line.chars().enumerate() {
                let agent = match symbol {
                    '#' => {
                        cells.push(false);
                        continue;
                    },
                    ' ' => None,
                    '.' => {
                        pills.push((row, column));
                        None
                    },
                    'o' => {
                        power_pills.push((row, column));
                        None
                    },
                    'M' => Some(Agent::Protagonist),
                    'B' => Some(Agent::Blinky),
                    'P' => Some(Agent::Pinky),
                    'I' => Some(Agent::Inky),
                    'S' => Some(Agent::Sue),
                    _ => bail!("unexpected symbol '{symbol}' at row {row}, column {column}"),
                };
                if let Some(agent) = agent {
                    if spawns[agent.index()].replace((row, column)).is_some() {
                        bail!("{agent} spawn is specified more than once");
                    }
                }
                cells.push(true);
            }
            grid.push(cells);
        }

        let layout = Layout::new(&grid).context("invalid maze layout")?;
        let mut spawn_nodes = [0; Agent::COUNT];
        for agent in Agent::ALL {
            let (row, column) = spawns[agent.index()]
                .with_context(|| format!("{agent} spawn is missing"))?;
            spawn_nodes[agent.index()] = layout
                .node_at(row, column)
                .with_context(|| format!("{agent} spawn is not walkable"))?;
        }

        let mut pill_flags = vec![false; layout.len()];
        for (row, column) in &pills {
            if let Some(node) = layout.node_at(*row, *column) {
                pill_flags[node] = true;
            }
        }
        let mut power_pill_flags = vec![false; layout.len()];
        for (row, column) in &power_pills {
            if let Some(node) = layout.node_at(*row, *column) {
                power_pill_flags[node] = true;
            }
        }

        Ok(Self {
            layout: Arc::new(layout),
            spawns: spawn_nodes,
            positions: spawn_nodes,
            last_moves: [Move::Neutral; Agent::COUNT],
            edible: [0; Agent::COUNT],
            captured: [false; Agent::COUNT],
            pills: pill_flags,
            power_pills: power_pill_flags,
            active_pills: pills.len(),
            total_pills: pills.len(),
            active_power_pills: power_pills.len(),
            total_power_pills: power_pills.len(),
            score: 0,
            ticks: 0,
            lives: INITIAL_LIVES,
        })
    }

    /// Static topology of the maze.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Node at the given grid cell; shorthand for [`Layout::node_at`].
    #[must_use]
    pub fn node_at(&self, row: usize, column: usize) -> Option<NodeIndex> {
        self.layout.node_at(row, column)
    }

    /// Removes whatever item lies on `node` without scoring it. Useful to set
    /// up mid-game situations.
    pub fn consume(&mut self, node: NodeIndex) {
        if let Some(pill) = self.pills.get_mut(node) {
            if std::mem::take(pill) {
                self.active_pills -= 1;
            }
        }
        if let Some(power_pill) = self.power_pills.get_mut(node) {
            if std::mem::take(power_pill) {
                self.active_power_pills -= 1;
            }
        }
    }

    /// Moves `agent` to `node` heading in `last_move` direction. Useful to set
    /// up mid-game situations.
    ///
    /// # Errors
    ///
    /// Fails if `node` is not part of the maze.
    pub fn place(&mut self, agent: Agent, node: NodeIndex, last_move: Move) -> anyhow::Result<()> {
        if node >= self.layout.len() {
            bail!("node {node} is not part of the maze");
        }
        self.positions[agent.index()] = node;
        self.last_moves[agent.index()] = last_move;
        Ok(())
    }

    fn step_protagonist(&mut self, requested: Option<Move>) {
        let agent = Agent::Protagonist.index();
        let from = self.positions[agent];
        let target = requested
            .into_iter()
            .chain([self.last_moves[agent]])
            .filter(|m| *m != Move::Neutral)
            .find_map(|m| self.layout.neighbour(from, m).map(|node| (m, node)));
        match target {
            Some((m, node)) => {
                self.positions[agent] = node;
                self.last_moves[agent] = m;
            },
            None => self.last_moves[agent] = Move::Neutral,
        }
    }

    fn step_ghost(&mut self, ghost: Agent, requested: Option<Move>) {
        let from = self.positions[ghost.index()];
        let last_move = self.last_moves[ghost.index()];
        let legal = self.legal_moves(from, last_move);
        let chosen = requested
            .filter(|m| legal.has(*m))
            .or_else(|| legal.has(last_move).then_some(last_move))
            .or_else(|| legal.moves().first().copied())
            // Dead end: the only way out is back.
            .unwrap_or_else(|| last_move.opposite());
        if let Some(node) = self.layout.neighbour(from, chosen) {
            self.positions[ghost.index()] = node;
            self.last_moves[ghost.index()] = chosen;
        }
    }

    fn eat(&mut self) {
        let node = self.positions[Agent::Protagonist.index()];
        if std::mem::take(&mut self.pills[node]) {
            self.active_pills -= 1;
            self.score += PILL_SCORE;
        }
        if std::mem::take(&mut self.power_pills[node]) {
            self.active_power_pills -= 1;
            self.score += POWER_PILL_SCORE;
            for ghost in Agent::GHOSTS {
                self.edible[ghost.index()] = EDIBLE_TIME;
            }
        }
    }

    fn resolve_collisions(&mut self, previous: &[NodeIndex; Agent::COUNT]) {
        let protagonist = Agent::Protagonist.index();
        let here = self.positions[protagonist];
        let before = previous[protagonist];
        for ghost in Agent::GHOSTS {
            let i = ghost.index();
            // Agents either share a node or swapped places during the tick.
            let met =
                self.positions[i] == here || (self.positions[i] == before && previous[i] == here);
            if !met {
                continue;
            }
            if self.edible[i] > 0 {
                self.score += GHOST_SCORE;
                self.captured[i] = true;
                self.edible[i] = 0;
                self.positions[i] = self.spawns[i];
                self.last_moves[i] = Move::Neutral;
            } else {
                self.captured[protagonist] = true;
                self.lives = self.lives.saturating_sub(1);
                self.positions = self.spawns;
                self.last_moves = [Move::Neutral; Agent::COUNT];
                self.edible = [0; Agent::COUNT];
                break;
            }
        }
    }
}

impl TryFrom<&str> for MazeWorld {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        Self::from_layout(input)
    }
}

impl World for MazeWorld {
    fn advance(&mut self, moves: &JointAction) {
        self.captured = [false; Agent::COUNT];
        for timer in &mut self.edible {
            *timer = timer.saturating_sub(1);
        }
        let previous = self.positions;

        self.step_protagonist(moves.get(Agent::Protagonist));
        for ghost in Agent::GHOSTS {
            self.step_ghost(ghost, moves.get(ghost));
        }
        self.ticks += 1;

        self.eat();
        self.resolve_collisions(&previous);
    }

    fn position(&self, agent: Agent) -> NodeIndex {
        self.positions[agent.index()]
    }

    fn last_move(&self, agent: Agent) -> Move {
        self.last_moves[agent.index()]
    }

    fn legal_moves(&self, node: NodeIndex, last_move: Move) -> MoveSet {
        let mut moves = self.layout.exits(node);
        moves.remove(MoveSet::single(last_move.opposite()));
        moves
    }

    fn neighbour(&self, node: NodeIndex, direction: Move) -> Option<NodeIndex> {
        self.layout.neighbour(node, direction)
    }

    fn is_junction(&self, node: NodeIndex) -> bool {
        self.layout.is_junction(node)
    }

    fn is_edible(&self, agent: Agent) -> bool {
        self.edible_time(agent) > 0
    }

    fn edible_time(&self, agent: Agent) -> u32 {
        if agent.is_ghost() {
            self.edible[agent.index()]
        } else {
            0
        }
    }

    fn distance(&self, from: NodeIndex, to: NodeIndex) -> Result<Distance, NotReachable> {
        self.layout
            .distance(from, to)
            .ok_or(NotReachable { from, to })
    }

    fn active_pills(&self) -> usize {
        self.active_pills
    }

    fn total_pills(&self) -> usize {
        self.total_pills
    }

    fn active_power_pills(&self) -> usize {
        self.active_power_pills
    }

    fn total_power_pills(&self) -> usize {
        self.total_power_pills
    }

    fn active_pill_indices(&self) -> Vec<NodeIndex> {
        (0..self.pills.len()).filter(|node| self.pills[*node]).collect()
    }

    fn active_power_pill_indices(&self) -> Vec<NodeIndex> {
        (0..self.power_pills.len())
            .filter(|node| self.power_pills[*node])
            .collect()
    }

    fn score(&self) -> i32 {
        self.score
    }

    fn elapsed_ticks(&self) -> u32 {
        self.ticks
    }

    fn lives_remaining(&self) -> u32 {
        self.lives
    }

    fn was_captured(&self, agent: Agent) -> bool {
        self.captured[agent.index()]
    }
}

impl fmt::Display for MazeWorld {
    /// Renders the maze in the layout format with agents at their current
    /// positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SYMBOLS: [char; Agent::COUNT] = ['M', 'B', 'P', 'I', 'S'];
        for row in 0..self.layout.height() {
            for column in 0..self.layout.width() {
                let symbol = match self.layout.node_at(row, column) {
                    None => '#',
                    Some(node) => Agent::ALL
                        .into_iter()
                        .find(|agent| self.positions[agent.index()] == node)
                        .map_or_else(
                            || {
                                if self.power_pills[node] {
                                    'o'
                                } else if self.pills[node] {
                                    '.'
                                } else {
                                    ' '
                                }
                            },
                            |agent| SYMBOLS[agent.index()],
                        ),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
