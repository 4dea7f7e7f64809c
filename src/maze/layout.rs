//! Static maze topology: walkable cells, their neighbourhoods and all-pairs
//! path distances.

use std::collections::VecDeque;

use anyhow::bail;

use crate::world::{Distance, Move, MoveSet, NodeIndex};

/// Marks a pair of nodes with no path between them.
const UNREACHABLE: Distance = Distance::MAX;

/// Immutable part of a maze shared by every clone of a
/// [`crate::maze::MazeWorld`].
#[derive(Debug)]
pub struct Layout {
    width: usize,
    height: usize,
    /// Row-major grid of cells, `None` for walls.
    cells: Vec<Option<NodeIndex>>,
    /// `(row, column)` of each node.
    coordinates: Vec<(usize, usize)>,
    /// Neighbour in each of [`Move::DIRECTIONS`].
    neighbours: Vec<[Option<NodeIndex>; 4]>,
    /// `nodes * nodes` matrix of shortest path lengths.
    distances: Vec<Distance>,
}

impl Layout {
    /// Builds the topology from a grid of walkable flags. Rows shorter than
    /// the widest one are padded with walls.
    pub(super) fn new(grid: &[Vec<bool>]) -> anyhow::Result<Self> {
        let height = grid.len();
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            bail!("maze layout is empty");
        }

        let mut cells = vec![None; width * height];
        let mut coordinates = Vec::new();
        for (row, line) in grid.iter().enumerate() {
            for (column, walkable) in line.iter().enumerate() {
                if *walkable {
                    cells[row * width + column] = Some(coordinates.len());
                    coordinates.push((row, column));
                }
            }
        }
        if coordinates.is_empty() {
            bail!("maze layout has no walkable cells");
        }

        let mut layout = Self {
            width,
            height,
            cells,
            coordinates,
            neighbours: Vec::new(),
            distances: Vec::new(),
        };
        layout.neighbours = (0..layout.len())
            .map(|node| {
                let (row, column) = layout.coordinates[node];
                Move::DIRECTIONS.map(|direction| layout.step(row, column, direction))
            })
            .collect();
        layout.distances = layout.compute_distances();
        Ok(layout)
    }

    /// Number of walkable nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Node at the given grid cell, `None` for walls and out-of-range cells.
    #[must_use]
    pub fn node_at(&self, row: usize, column: usize) -> Option<NodeIndex> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cells[row * self.width + column]
    }

    /// `(row, column)` of a node.
    #[must_use]
    pub fn coordinates(&self, node: NodeIndex) -> Option<(usize, usize)> {
        self.coordinates.get(node).copied()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn neighbour(&self, node: NodeIndex, direction: Move) -> Option<NodeIndex> {
        let slot = Move::DIRECTIONS.iter().position(|d| *d == direction)?;
        self.neighbours.get(node).and_then(|n| n[slot])
    }

    /// Directions leading out of `node`.
    #[must_use]
    pub fn exits(&self, node: NodeIndex) -> MoveSet {
        Move::DIRECTIONS
            .into_iter()
            .filter(|direction| self.neighbour(node, *direction).is_some())
            .collect()
    }

    /// Junctions are nodes with more than two exits.
    #[must_use]
    pub fn is_junction(&self, node: NodeIndex) -> bool {
        self.exits(node).len() > 2
    }

    /// Shortest path length, `None` if either node is unknown or there is no
    /// path.
    #[must_use]
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> Option<Distance> {
        if from >= self.len() || to >= self.len() {
            return None;
        }
        let distance = self.distances[from * self.len() + to];
        (distance != UNREACHABLE).then_some(distance)
    }

    fn step(&self, row: usize, column: usize, direction: Move) -> Option<NodeIndex> {
        let (dr, dc) = direction.offset();
        let row = row.checked_add_signed(dr)?;
        let column = column.checked_add_signed(dc)?;
        self.node_at(row, column)
    }

    /// Breadth-first search from every node.
    fn compute_distances(&self) -> Vec<Distance> {
        let n = self.len();
        let mut distances = vec![UNREACHABLE; n * n];
        let mut queue = VecDeque::with_capacity(n);
        for source in 0..n {
            let row = &mut distances[source * n..(source + 1) * n];
            row[source] = 0;
            queue.push_back(source);
            while let Some(node) = queue.pop_front() {
                let next_distance = row[node] + 1;
                for next in self.neighbours[node].iter().flatten() {
                    if row[*next] == UNREACHABLE {
                        row[*next] = next_distance;
                        queue.push_back(*next);
                    }
                }
            }
        }
        distances
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn grid(rows: &[&str]) -> Vec<Vec<bool>> {
        rows.iter()
            .map(|row| row.chars().map(|c| c != '#').collect())
            .collect()
    }

    #[test]
    fn topology() {
        let layout = Layout::new(&grid(&["#####", "#   #", "# # #", "#   #", "#####"]))
            .expect("valid layout");
        assert_eq!(layout.len(), 8);
        assert_eq!(layout.width(), 5);
        assert_eq!(layout.height(), 5);

        let corner = layout.node_at(1, 1).expect("walkable");
        assert_eq!(layout.coordinates(corner), Some((1, 1)));
        assert_eq!(layout.exits(corner), MoveSet::RIGHT | MoveSet::DOWN);
        assert!(!layout.is_junction(corner));
        assert_eq!(layout.node_at(2, 2), None);
        assert_eq!(layout.node_at(7, 7), None);

        let opposite = layout.node_at(3, 3).expect("walkable");
        assert_eq!(layout.distance(corner, opposite), Some(4));
        assert_eq!(layout.distance(opposite, corner), Some(4));
        assert_eq!(layout.distance(corner, corner), Some(0));
        assert_eq!(layout.distance(corner, 100), None);
    }

    #[test]
    fn junctions() {
        let layout = Layout::new(&grid(&["#####", "#   #", "## ##", "#   #", "#####"]))
            .expect("valid layout");
        let top = layout.node_at(1, 2).expect("walkable");
        assert_eq!(
            layout.exits(top),
            MoveSet::LEFT | MoveSet::RIGHT | MoveSet::DOWN
        );
        assert!(layout.is_junction(top));
        let stem = layout.node_at(2, 2).expect("walkable");
        assert!(!layout.is_junction(stem));
        assert_eq!(layout.neighbour(stem, Move::Up), Some(top));
        assert_eq!(layout.neighbour(stem, Move::Left), None);
    }

    #[test]
    fn disconnected() {
        let layout = Layout::new(&grid(&["#####", "# # #", "#####"])).expect("valid layout");
        let left = layout.node_at(1, 1).expect("walkable");
        let right = layout.node_at(1, 3).expect("walkable");
        assert_eq!(layout.distance(left, right), None);
    }

    #[test]
    fn empty() {
        assert!(Layout::new(&[]).is_err());
        assert!(Layout::new(&grid(&["###"])).is_err());
    }
}
