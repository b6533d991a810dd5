//! Best-first search over the grid, with the open set held in an [OrderedMultiTree].
//!
//! The search can be run to completion with [find_path] or advanced one expansion at a time with
//! [BestFirstSearch::step], for example once per frame of a visualisation.
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

use crate::avl::{NodeHandle, OrderedMultiTree};
use crate::error::{Endpoint, PathError};
use crate::grid::ObstacleMap;
use crate::neighbors::{euclidean_distance, NeighborGenerator};
use crate::node::{NodeArena, NodeId, Path, SearchNode};
use crate::virtual_obstacles::VirtualObstacles;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Number of expansions after which a search gives up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    /// The search reports no path once this many nodes have been expanded.
    pub max_expansions: usize,
    /// Scales the Euclidean heuristic. Values above 1 make the search greedier and faster but
    /// the returned path is then no longer guaranteed to be the shortest.
    pub heuristic_factor: f64,
}

impl SearchConfig {
    pub fn new() -> SearchConfig {
        SearchConfig {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            heuristic_factor: 1.0,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig::new()
    }
}

/// Lifecycle of a [BestFirstSearch]. A query whose start or finish is an obstacle never gets
/// this far: [BestFirstSearch::new] rejects it with [PathError::ImpossibleEndpoint].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Created, open set not seeded yet.
    Initialized,
    Expanding,
    Found,
    Exhausted,
}

/// Result of a single [step](BestFirstSearch::step).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Continue,
    Found,
    Exhausted,
}

/// The state of a search between two steps, for visualisation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    /// Open positions, cheapest first.
    pub open: Vec<Point>,
    /// Finalised positions in the order they were expanded.
    pub closed: Vec<Point>,
    /// The position popped by the latest step.
    pub current: Option<Point>,
    pub expansions: usize,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    node: NodeId,
    total_cost: f64,
}

fn open_entry_cost(entry: &OpenEntry) -> f64 {
    entry.total_cost
}

type OpenTree = OrderedMultiTree<OpenEntry, f64, fn(&OpenEntry) -> f64>;

/// Per-search state: the open set as a tree plus a position index mirroring it, the closed set
/// and the arena owning every node created.
pub struct SearchContext {
    open: OpenTree,
    open_index: FxIndexMap<Point, NodeHandle>,
    closed: FxIndexSet<Point>,
    nodes: NodeArena,
}

impl Default for SearchContext {
    fn default() -> SearchContext {
        SearchContext::new()
    }
}

impl SearchContext {
    pub fn new() -> SearchContext {
        SearchContext {
            open: OrderedMultiTree::new(open_entry_cost as fn(&OpenEntry) -> f64),
            open_index: FxIndexMap::default(),
            closed: FxIndexSet::default(),
            nodes: NodeArena::new(),
        }
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn open_len(&self) -> usize {
        self.open_index.len()
    }

    pub fn is_open(&self, position: &Point) -> bool {
        self.open_index.contains_key(position)
    }

    pub fn is_closed(&self, position: &Point) -> bool {
        self.closed.contains(position)
    }

    /// The open node at `position`, if any.
    pub fn open_node(&self, position: &Point) -> Option<&SearchNode> {
        let handle = self.open_index.get(position)?;
        self.open.get(*handle).map(|entry| self.nodes.get(entry.node))
    }

    /// Adds a node for a position that is not open yet.
    fn insert_open(&mut self, node: SearchNode) {
        debug_assert!(!self.is_open(&node.position) && !self.is_closed(&node.position));
        let position = node.position;
        let total_cost = node.total_cost();
        let id = self.nodes.push(node);
        let handle = self.open.insert(OpenEntry {
            node: id,
            total_cost,
        });
        self.open_index.insert(position, handle);
    }

    /// Replaces the open node at the same position with a cheaper one.
    ///
    /// # Panics
    /// If the index lists the position but the tree does not hold the entry. The two have then
    /// diverged and the search can no longer be trusted.
    fn decrease_key(&mut self, node: SearchNode) {
        let position = node.position;
        if let Some(handle) = self.open_index.swap_remove(&position) {
            if let Err(err) = self.open.delete(handle) {
                panic!("Open set index and tree diverged at {position}: {err}");
            }
        }
        self.insert_open(node);
    }

    /// Pops the cheapest open node and removes it from the index.
    fn pop(&mut self) -> Option<NodeId> {
        let entry = self.open.pop_min().ok()?;
        let position = self.nodes.get(entry.node).position;
        self.open_index.swap_remove(&position);
        Some(entry.node)
    }

    fn close(&mut self, position: Point) {
        self.closed.insert(position);
    }
}

/// Returns [PathError::ImpossibleEndpoint] if either endpoint is a permanent obstacle.
pub fn check_endpoints<M: ObstacleMap + ?Sized>(
    map: &M,
    start: Point,
    finish: Point,
) -> Result<(), PathError> {
    for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Finish, finish)] {
        if map.is_obstacle(position) {
            info!("Rejecting search: {endpoint} {position} is an obstacle");
            return Err(PathError::ImpossibleEndpoint { endpoint, position });
        }
    }
    Ok(())
}

/// An A*-style best-first search from `start` to `finish` that can be advanced step by step.
///
/// Step costs and the heuristic are both Euclidean distances, so with a heuristic factor of 1
/// the heuristic is admissible and consistent and the first path found is a shortest one.
pub struct BestFirstSearch<'a, M: ObstacleMap + ?Sized> {
    moves: NeighborGenerator<'a, M>,
    start: Point,
    finish: Point,
    config: SearchConfig,
    context: SearchContext,
    state: SearchState,
    expansions: usize,
    current: Option<Point>,
    goal: Option<NodeId>,
}

impl<'a, M: ObstacleMap + ?Sized> BestFirstSearch<'a, M> {
    pub fn new(
        map: &'a M,
        start: Point,
        finish: Point,
        virtual_obstacles: Option<&'a VirtualObstacles>,
        config: SearchConfig,
    ) -> Result<Self, PathError> {
        check_endpoints(map, start, finish)?;
        Ok(BestFirstSearch {
            moves: NeighborGenerator::new(map, virtual_obstacles),
            start,
            finish,
            config,
            context: SearchContext::new(),
            state: SearchState::Initialized,
            expansions: 0,
            current: None,
            goal: None,
        })
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    fn heuristic(&self, position: Point) -> f64 {
        euclidean_distance(position, self.finish) * self.config.heuristic_factor
    }

    fn seed(&mut self) {
        info!("Searching path from {} to {}", self.start, self.finish);
        self.context.insert_open(SearchNode {
            position: self.start,
            path_cost: 0.0,
            heuristic: self.heuristic(self.start),
            predecessor: None,
        });
        self.state = SearchState::Expanding;
    }

    fn exhaust(&mut self, reason: &str) -> SearchStatus {
        info!(
            "No path from {} to {}: {} after {} expansions",
            self.start, self.finish, reason, self.expansions
        );
        self.state = SearchState::Exhausted;
        SearchStatus::Exhausted
    }

    /// Expands a single node. Once [Found](SearchStatus::Found) or
    /// [Exhausted](SearchStatus::Exhausted) is returned, further calls return the same status
    /// without doing any work.
    pub fn step(&mut self) -> SearchStatus {
        match self.state {
            SearchState::Found => return SearchStatus::Found,
            SearchState::Exhausted => return SearchStatus::Exhausted,
            SearchState::Initialized => self.seed(),
            SearchState::Expanding => {}
        }
        let Some(current_id) = self.context.pop() else {
            return self.exhaust("open set drained");
        };
        let current = *self.context.nodes.get(current_id);
        self.current = Some(current.position);
        // The goal test comes first so a goal popped at the limit is still found.
        if current.position == self.finish {
            debug!(
                "Reached {} with cost {} after {} expansions",
                self.finish, current.path_cost, self.expansions
            );
            self.goal = Some(current_id);
            self.state = SearchState::Found;
            return SearchStatus::Found;
        }
        if self.expansions >= self.config.max_expansions {
            return self.exhaust("expansion limit reached");
        }

        self.context.close(current.position);
        for (neighbor, move_cost) in self.moves.neighbors_and_cost(current.position) {
            if self.context.is_closed(&neighbor) {
                continue;
            }
            let path_cost = current.path_cost + move_cost;
            let stored_cost = self.context.open_node(&neighbor).map(|node| node.path_cost);
            if stored_cost.is_some_and(|stored| stored <= path_cost) {
                continue;
            }
            let node = SearchNode {
                position: neighbor,
                path_cost,
                heuristic: self.heuristic(neighbor),
                predecessor: Some(current_id),
            };
            if stored_cost.is_some() {
                self.context.decrease_key(node);
            } else {
                self.context.insert_open(node);
            }
        }
        self.expansions += 1;
        SearchStatus::Continue
    }

    /// Steps until the search terminates.
    pub fn run(&mut self) -> Option<Path> {
        loop {
            match self.step() {
                SearchStatus::Continue => {}
                SearchStatus::Found => return self.path(),
                SearchStatus::Exhausted => return None,
            }
        }
    }

    /// The path found, available once the search is in the [Found](SearchState::Found) state.
    pub fn path(&self) -> Option<Path> {
        let goal = self.goal?;
        Some(Path::new(
            self.context.nodes.trace(goal),
            self.context.nodes.get(goal).path_cost,
        ))
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            open: self
                .context
                .open
                .iter()
                .map(|entry| self.context.nodes.get(entry.node).position)
                .collect(),
            closed: self.context.closed.iter().copied().collect(),
            current: self.current,
            expansions: self.expansions,
        }
    }
}

/// Finds a shortest path from `start` to `finish` that avoids the obstacles of `map` and, if
/// given, the virtual obstacles.
///
/// Returns [Ok(None)] if the goal cannot be reached within `config.max_expansions` expansions.
pub fn find_path<M: ObstacleMap + ?Sized>(
    map: &M,
    start: Point,
    finish: Point,
    virtual_obstacles: Option<&VirtualObstacles>,
    config: SearchConfig,
) -> Result<Option<Path>, PathError> {
    let mut search = BestFirstSearch::new(map, start, finish, virtual_obstacles, config)?;
    Ok(search.run())
}
