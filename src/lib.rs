//! # avl_pathfinding
//!
//! Grid pathfinding with a best-first ([A*](https://en.wikipedia.org/wiki/A*_search_algorithm))
//! search whose open set is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree) supporting
//! duplicate keys and removal by identity, rather than a binary heap.
//!
//! Movement is 8-directional with Euclidean step costs, and diagonal moves may not cut between
//! two obstacles. Besides shortest paths, the crate can produce varied routes, either by
//! scattering [virtual obstacles](virtual_obstacles) along an existing path and searching again,
//! or with a [random greedy walk](walker::random_greedy_walk).
//!
//! ```
//! use avl_pathfinding::{find_path, ObstacleGrid, SearchConfig};
//! use grid_util::grid::ValueGrid;
//! use grid_util::point::Point;
//!
//! let mut grid = ObstacleGrid::new(5, 5, false);
//! grid.set(2, 2, true);
//! let path = find_path(&grid, Point::new(0, 0), Point::new(4, 4), None, SearchConfig::default())
//!     .unwrap()
//!     .expect("the goal is reachable");
//! assert_eq!(path.start(), Some(Point::new(0, 0)));
//! ```
pub mod avl;
pub mod error;
pub mod grid;
pub mod neighbors;
pub mod node;
pub mod pathfinder;
pub mod search;
pub mod virtual_obstacles;
pub mod walker;

/// Inline capacity of neighbour lists, one slot per direction.
pub const N_SMALLVEC_SIZE: usize = 8;

pub use crate::avl::{NodeHandle, OrderedMultiTree};
pub use crate::error::{Endpoint, PathError, TreeError};
pub use crate::grid::{ObstacleGrid, ObstacleMap};
pub use crate::neighbors::NeighborGenerator;
pub use crate::node::{Path, SearchNode, Waypoint};
pub use crate::pathfinder::Pathfinder;
pub use crate::search::{
    find_path, BestFirstSearch, SearchConfig, SearchContext, SearchSnapshot, SearchState,
    SearchStatus, DEFAULT_MAX_EXPANSIONS,
};
pub use crate::virtual_obstacles::VirtualObstacles;
pub use crate::walker::{random_greedy_walk, WalkerConfig};
