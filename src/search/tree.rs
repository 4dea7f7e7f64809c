//! Search tree with arena allocation.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]; the
//! root is always the first node. Each node owns the world snapshot it
//! represents: the state right after the fast-forward segment that created
//! it.

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::search::Reward;
use crate::world::{Agent, Distance, JointAction, Move, MoveSet, NodeIndex, World};

/// Index of a node within its [`Tree`].
pub type NodeId = usize;

/// A world snapshot reached by one joint action, plus the statistics
/// accumulated by the iterations that went through it.
#[derive(Clone, Debug)]
pub struct Node<W> {
    world: W,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Joint action leading here from the parent; `None` for the root.
    action: Option<JointAction>,
    /// Moves each controlled agent has already expanded from this node.
    tried: [MoveSet; Agent::COUNT],
    /// Path distance of each controlled agent from its root position.
    drift: [Distance; Agent::COUNT],
    /// Reward attached at creation by variants that score the segment itself.
    step_reward: Option<Reward>,
    /// Total number of search iterations that went through this node.
    visits: u32,
    reward: Reward,
}

impl<W> Node<W> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn world(&self) -> &W {
        &self.world
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Joint action that created this node; `None` for the root.
    #[must_use]
    pub const fn action(&self) -> Option<&JointAction> {
        self.action.as_ref()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn tried(&self, agent: Agent) -> MoveSet {
        self.tried[agent.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn drift(&self, agent: Agent) -> Distance {
        self.drift[agent.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn step_reward(&self) -> Option<Reward> {
        self.step_reward
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    /// Sum of the rewards of every iteration that went through this node.
    #[must_use]
    pub const fn cumulative_reward(&self) -> Reward {
        self.reward
    }

    #[must_use]
    const fn visited(&self) -> bool {
        self.visits > 0
    }

    /// Average reward per visit, zero for unvisited nodes.
    #[must_use]
    pub fn mean_reward(&self) -> Reward {
        if self.visited() {
            self.reward / Reward::from(self.visits)
        } else {
            0.0
        }
    }
}

/// Search tree for a fixed set of controlled agents.
#[derive(Clone, Debug)]
pub struct Tree<W> {
    nodes: Vec<Node<W>>,
    controlled: ArrayVec<Agent, { Agent::COUNT }>,
    /// Root position of every agent, the reference point of drift.
    origin: [NodeIndex; Agent::COUNT],
}

impl<W: World> Tree<W> {
    /// The root always has this id.
    pub const ROOT: NodeId = 0;

    /// Creates a tree with a single root node holding `world`. Duplicate
    /// entries in `controlled` are ignored.
    #[must_use]
    pub fn new(world: W, controlled: &[Agent]) -> Self {
        let mut agents = ArrayVec::new();
        for agent in controlled {
            if !agents.contains(agent) {
                agents.push(*agent);
            }
        }
        let origin = Agent::ALL.map(|agent| world.position(agent));
        Self {
            nodes: vec![Node {
                world,
                parent: None,
                children: Vec::new(),
                action: None,
                tried: [MoveSet::empty(); Agent::COUNT],
                drift: [0; Agent::COUNT],
                step_reward: None,
                visits: 0,
                reward: 0.0,
            }],
            controlled: agents,
            origin,
        }
    }

    /// Agents this tree plans for, without duplicates.
    #[must_use]
    pub fn controlled(&self) -> &[Agent] {
        &self.controlled
    }

    /// Returns a reference to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node<W> {
        &self.nodes[id]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn root(&self) -> &Node<W> {
        &self.nodes[Self::ROOT]
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Legal moves of `agent` in the world of node `id`.
    #[must_use]
    pub fn legal_moves(&self, id: NodeId, agent: Agent) -> MoveSet {
        let world = &self.nodes[id].world;
        world.legal_moves(world.position(agent), world.last_move(agent))
    }

    /// Returns `true` once every controlled agent has tried all of its legal
    /// moves at node `id`.
    #[must_use]
    pub fn is_fully_expanded(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        self.controlled
            .iter()
            .all(|agent| node.tried(*agent) == self.legal_moves(id, *agent))
    }

    /// Returns `true` if no controlled agent of node `id` drifted further than
    /// `limit` from its root position.
    #[must_use]
    pub fn within_drift(&self, id: NodeId, limit: Distance) -> bool {
        let node = &self.nodes[id];
        self.controlled
            .iter()
            .all(|agent| node.drift(*agent) <= limit)
    }

    /// Picks a random move of `agent` that was not tried at node `id` yet and
    /// records it as tried.
    ///
    /// Once every legal move has been tried, a random legal move is returned
    /// without recording it, or [`Move::Neutral`] when there is none.
    pub fn untried_move(&mut self, id: NodeId, agent: Agent, rng: &mut dyn RngCore) -> Move {
        let legal = self.legal_moves(id, agent);
        let node = &mut self.nodes[id];
        let untried = legal.difference(node.tried(agent)).moves();
        if let Some(m) = untried.choose(rng).copied() {
            node.tried[agent.index()].add(m);
            return m;
        }
        legal.moves().choose(rng).copied().unwrap_or(Move::Neutral)
    }

    /// Picks an untried move for every controlled agent at node `id`.
    pub fn untried_action(&mut self, id: NodeId, rng: &mut dyn RngCore) -> JointAction {
        let mut action = JointAction::new();
        for agent in self.controlled.clone() {
            action.set(agent, self.untried_move(id, agent, rng));
        }
        action
    }

    /// Appends a child of `parent` holding `world`, reached by `action`.
    ///
    /// The drift of each controlled agent is measured from its root position;
    /// agents that can not reach their root position any more count as not
    /// having drifted.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        world: W,
        action: JointAction,
        step_reward: Option<Reward>,
    ) -> NodeId {
        let mut drift = [0; Agent::COUNT];
        for agent in &self.controlled {
            drift[agent.index()] = world
                .distance(self.origin[agent.index()], world.position(*agent))
                .unwrap_or(0);
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            world,
            parent: Some(parent),
            children: Vec::new(),
            action: Some(action),
            tried: [MoveSet::empty(); Agent::COUNT],
            drift,
            step_reward,
            visits: 0,
            reward: 0.0,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Adds one visit and `reward` to `leaf` and every ancestor up to the
    /// root.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: Reward) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.reward += reward;
            current = node.parent;
        }
    }

    /// Child of `id` with the highest UCT value, see
    /// [`crate::search::uct::best_child`].
    #[must_use]
    pub fn best_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        crate::search::uct::best_child(self, id, exploration)
    }
}
