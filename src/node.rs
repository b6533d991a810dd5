use grid_util::point::Point;

use crate::neighbors::step_cost;

/// Index of a [SearchNode] in a [NodeArena].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A discovered grid cell together with the cost of the best known way to reach it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode {
    pub position: Point,
    /// Accumulated cost from the start (g).
    pub path_cost: f64,
    /// Estimated remaining cost to the goal (h).
    pub heuristic: f64,
    /// The node this one was expanded from, [None] for the start node.
    pub predecessor: Option<NodeId>,
}

impl SearchNode {
    /// g + h, the key the open set is ordered by.
    pub fn total_cost(&self) -> f64 {
        self.path_cost + self.heuristic
    }
}

/// Growable store of every node created during one search. Predecessor links are indices into
/// it, so the chain back to the start can be followed after nodes leave the open set.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn push(&mut self, node: SearchNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follows predecessor links from `id` back to the start and returns the positions in
    /// start-to-`id` order.
    pub fn trace(&self, id: NodeId) -> Vec<Point> {
        let mut cells: Vec<Point> = itertools::unfold(Some(id), |next| {
            next.map(|id| {
                let node = self.get(id);
                *next = node.predecessor;
                node.position
            })
        })
        .collect();
        cells.reverse();
        cells
    }
}

/// A point in continuous map space; path waypoints sit at cell centres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub fn cell_center(cell: Point) -> Waypoint {
        Waypoint {
            x: cell.x as f64 + 0.5,
            y: cell.y as f64 + 0.5,
        }
    }
}

impl From<Point> for Waypoint {
    fn from(cell: Point) -> Waypoint {
        Waypoint::cell_center(cell)
    }
}

/// A route from start to finish.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Grid cells from start to finish, both included.
    pub cells: Vec<Point>,
    /// Centres of [cells](Self::cells).
    pub waypoints: Vec<Waypoint>,
    /// Sum of the Euclidean step costs along the path.
    pub cost: f64,
}

impl Path {
    pub fn new(cells: Vec<Point>, cost: f64) -> Path {
        let waypoints = cells.iter().copied().map(Waypoint::cell_center).collect();
        Path {
            cells,
            waypoints,
            cost,
        }
    }

    /// Builds a path and computes its cost from consecutive cells.
    pub fn from_cells(cells: Vec<Point>) -> Path {
        let cost = cells.windows(2).map(|w| step_cost(w[0], w[1])).sum();
        Path::new(cells, cost)
    }

    /// Number of cells on the path.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.cells.first().copied()
    }

    pub fn finish(&self) -> Option<Point> {
        self.cells.last().copied()
    }
}
