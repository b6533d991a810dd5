use grid_util::point::Point;
use log::{info, warn};
use rand::Rng;

use crate::error::PathError;
use crate::grid::ObstacleGrid;
use crate::node::Path;
use crate::search::{check_endpoints, find_path, BestFirstSearch, SearchConfig};
use crate::virtual_obstacles::{path_proximity, VirtualObstacles};
use crate::walker::{random_greedy_walk, WalkerConfig};

/// [Pathfinder] bundles an [ObstacleGrid] with a [SearchConfig]. Before searching it consults the
/// grid's connected components, so queries between disconnected cells return without expanding
/// anything.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    pub grid: ObstacleGrid,
    pub config: SearchConfig,
}

impl Pathfinder {
    pub fn new(grid: ObstacleGrid) -> Pathfinder {
        Pathfinder {
            grid,
            config: SearchConfig::default(),
        }
    }

    /// Checks endpoints and connectivity. `Ok(false)` means there is certainly no path.
    fn prepare(&mut self, start: Point, goal: Point) -> Result<bool, PathError> {
        self.grid.update();
        check_endpoints(&self.grid, start, goal)?;
        if self.grid.unreachable(&start, &goal) {
            info!("{} is not reachable from {}", goal, start);
            return Ok(false);
        }
        Ok(true)
    }

    /// Computes a shortest path from start to goal. The heuristic used is the
    /// [Euclidean distance](https://en.wikipedia.org/wiki/Euclidean_distance).
    pub fn get_path_single_goal(
        &mut self,
        start: Point,
        goal: Point,
    ) -> Result<Option<Path>, PathError> {
        if !self.prepare(start, goal)? {
            return Ok(None);
        }
        let path = find_path(&self.grid, start, goal, None, self.config)?;
        if path.is_none() {
            warn!("Reachable goal could not be pathed to, is the expansion limit too low?");
        }
        Ok(path)
    }

    /// Like [get_path_single_goal](Self::get_path_single_goal), additionally avoiding the given
    /// virtual obstacles.
    pub fn get_path_avoiding(
        &mut self,
        start: Point,
        goal: Point,
        virtual_obstacles: &VirtualObstacles,
    ) -> Result<Option<Path>, PathError> {
        if !self.prepare(start, goal)? {
            return Ok(None);
        }
        find_path(&self.grid, start, goal, Some(virtual_obstacles), self.config)
    }

    /// Finds a shortest path, then searches again with virtual obstacles scattered along it with
    /// the given chance, yielding a route that roughly follows the same corridor. Falls back to
    /// the shortest path if the obstruction leaves no way through.
    pub fn get_alternative_path<R: Rng + ?Sized>(
        &mut self,
        start: Point,
        goal: Point,
        chance: f64,
        rng: &mut R,
    ) -> Result<Option<Path>, PathError> {
        let Some(shortest) = self.get_path_single_goal(start, goal)? else {
            return Ok(None);
        };
        let obstacles = path_proximity(&shortest.cells, chance, rng);
        let alternative = find_path(&self.grid, start, goal, Some(&obstacles), self.config)?;
        if alternative.is_none() {
            info!("Virtual obstacles blocked every route, keeping the shortest path");
        }
        Ok(alternative.or(Some(shortest)))
    }

    /// A varied, non-optimal route built by [random_greedy_walk].
    pub fn get_random_path<R: Rng + ?Sized>(
        &mut self,
        start: Point,
        goal: Point,
        walker: &WalkerConfig,
        rng: &mut R,
    ) -> Result<Option<Path>, PathError> {
        if !self.prepare(start, goal)? {
            return Ok(None);
        }
        random_greedy_walk(&self.grid, start, goal, None, walker, rng)
    }

    /// A search that can be advanced step by step. Components are not consulted here, an
    /// unreachable goal shows up as the search exhausting.
    pub fn search(
        &mut self,
        start: Point,
        goal: Point,
    ) -> Result<BestFirstSearch<'_, ObstacleGrid>, PathError> {
        self.grid.update();
        BestFirstSearch::new(&self.grid, start, goal, None, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchStatus;
    use grid_util::grid::ValueGrid;
    use grid_util::rect::Rect;
    use rand::prelude::*;

    fn walled() -> Pathfinder {
        // |..........|
        // |..........|
        // |..######..|
        // |..........|
        // |..........|
        let mut grid = ObstacleGrid::new(10, 5, false);
        grid.set_rect(Rect::new(2, 2, 6, 1), true);
        Pathfinder::new(grid)
    }

    #[test]
    fn disconnected_goal_short_circuits() {
        let mut grid = ObstacleGrid::new(6, 6, false);
        grid.set_rect(Rect::new(3, 0, 1, 6), true);
        let mut pathfinder = Pathfinder::new(grid);
        let path = pathfinder
            .get_path_single_goal(Point::new(0, 0), Point::new(5, 5))
            .unwrap();
        assert!(path.is_none());
    }

    #[test]
    fn grid_edits_are_picked_up() {
        let mut pathfinder = walled();
        let start = Point::new(4, 0);
        let goal = Point::new(4, 4);
        let before = pathfinder.get_path_single_goal(start, goal).unwrap().unwrap();
        pathfinder.grid.set_rect(Rect::new(0, 2, 10, 1), true);
        assert!(pathfinder
            .get_path_single_goal(start, goal)
            .unwrap()
            .is_none());
        pathfinder.grid.set(9, 2, false);
        let after = pathfinder.get_path_single_goal(start, goal).unwrap().unwrap();
        assert!(after.cells.contains(&Point::new(9, 2)));
        assert!(after.cost > before.cost);
    }

    #[test]
    fn alternative_paths_connect_the_endpoints() {
        let mut pathfinder = walled();
        let mut rng = StdRng::seed_from_u64(7);
        let start = Point::new(0, 0);
        let goal = Point::new(9, 4);
        let shortest = pathfinder.get_path_single_goal(start, goal).unwrap().unwrap();
        for _ in 0..10 {
            let path = pathfinder
                .get_alternative_path(start, goal, 0.6, &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(path.start(), Some(start));
            assert_eq!(path.finish(), Some(goal));
            assert!(path.cost >= shortest.cost - 1e-9);
        }
    }

    #[test]
    fn stepping_through_the_facade() {
        let mut pathfinder = walled();
        let mut search = pathfinder.search(Point::new(4, 0), Point::new(4, 4)).unwrap();
        let mut steps = 0;
        while search.step() == SearchStatus::Continue {
            steps += 1;
        }
        assert!(steps > 0);
        assert!(search.path().is_some());
    }

    #[test]
    fn random_paths_reach_the_goal_or_fail_cleanly() {
        let mut pathfinder = walled();
        let mut rng = StdRng::seed_from_u64(8);
        let walker = WalkerConfig::default();
        let result = pathfinder
            .get_random_path(Point::new(4, 0), Point::new(4, 4), &walker, &mut rng)
            .unwrap();
        if let Some(path) = result {
            assert_eq!(path.finish(), Some(Point::new(4, 4)));
        }
        assert!(pathfinder
            .get_random_path(Point::new(2, 2), Point::new(4, 4), &walker, &mut rng)
            .is_err());
    }
}
