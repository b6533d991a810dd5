use grid_util::point::Point;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PathError;
use crate::grid::ObstacleMap;
use crate::neighbors::{euclidean_distance, NeighborGenerator};
use crate::node::Path;
use crate::search::{check_endpoints, find_path, SearchConfig};
use crate::virtual_obstacles::VirtualObstacles;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkerConfig {
    /// Probability of taking the neighbour closest to the goal instead of a random one.
    pub greedy_chance: f64,
    pub max_steps: usize,
    /// If the walk runs out of steps within this distance of the goal, the rest of the route is
    /// completed with a best-first search.
    pub splice_distance: f64,
    /// Configuration of that completing search.
    pub search: SearchConfig,
}

impl WalkerConfig {
    pub fn new() -> WalkerConfig {
        WalkerConfig {
            greedy_chance: 0.9,
            max_steps: 1_000,
            splice_distance: 10.0,
            search: SearchConfig::new(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> WalkerConfig {
        WalkerConfig::new()
    }
}

/// Appends `next` to the route, or cuts the route back to `next` if it was visited before so
/// the result never contains a cell twice.
fn push_without_loop(cells: &mut Vec<Point>, next: Point) {
    match cells.iter().position(|cell| *cell == next) {
        Some(visited) => cells.truncate(visited + 1),
        None => cells.push(next),
    }
}

/// Builds a route by walking from `start`, mostly greedily towards `finish` and sometimes in a
/// random direction. The result is generally not a shortest path; it is meant to give varied
/// routes between the same endpoints. Loops the walk makes are cut out of the returned route.
///
/// Returns [Ok(None)] if the walk gets stuck, or runs out of steps further than
/// `splice_distance` from the goal.
pub fn random_greedy_walk<M, R>(
    map: &M,
    start: Point,
    finish: Point,
    virtual_obstacles: Option<&VirtualObstacles>,
    config: &WalkerConfig,
    rng: &mut R,
) -> Result<Option<Path>, PathError>
where
    M: ObstacleMap + ?Sized,
    R: Rng + ?Sized,
{
    check_endpoints(map, start, finish)?;
    let greedy_chance = if config.greedy_chance.is_nan() {
        0.0
    } else {
        config.greedy_chance.clamp(0.0, 1.0)
    };
    let moves = NeighborGenerator::new(map, virtual_obstacles);
    let mut cells = vec![start];
    let mut current = start;
    for _ in 0..config.max_steps {
        if current == finish {
            break;
        }
        let options = moves.neighbors(current);
        let next = if rng.gen_bool(greedy_chance) {
            options.iter().copied().min_by(|a, b| {
                euclidean_distance(*a, finish).total_cmp(&euclidean_distance(*b, finish))
            })
        } else {
            options.choose(&mut *rng).copied()
        };
        let Some(next) = next else {
            info!("Random walk from {} got stuck at {}", start, current);
            return Ok(None);
        };
        push_without_loop(&mut cells, next);
        current = next;
    }
    if current == finish {
        debug!("Random walk reached {} along {} cells", finish, cells.len());
        return Ok(Some(Path::from_cells(cells)));
    }

    let remaining = euclidean_distance(current, finish);
    if remaining > config.splice_distance {
        info!(
            "Random walk ended at {}, {:.1} away from {}",
            current, remaining, finish
        );
        return Ok(None);
    }
    debug!("Completing random walk from {} with a search", current);
    Ok(
        find_path(map, current, finish, virtual_obstacles, config.search)?.map(|tail| {
            for cell in tail.cells.into_iter().skip(1) {
                push_without_loop(&mut cells, cell);
            }
            Path::from_cells(cells)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ObstacleGrid;
    use grid_util::grid::ValueGrid;
    use grid_util::rect::Rect;
    use rand::prelude::*;

    fn is_connected(path: &Path, grid: &ObstacleGrid) -> bool {
        let moves = NeighborGenerator::new(grid, None);
        path.cells.windows(2).all(|w| moves.can_move(w[0], w[1]))
    }

    #[test]
    fn greedy_walk_on_open_grid_is_direct() {
        let grid = ObstacleGrid::new(10, 10, false);
        let mut rng = StdRng::seed_from_u64(0);
        let config = WalkerConfig {
            greedy_chance: 1.0,
            ..WalkerConfig::default()
        };
        let path = random_greedy_walk(
            &grid,
            Point::new(0, 0),
            Point::new(9, 5),
            None,
            &config,
            &mut rng,
        )
        .unwrap()
        .unwrap();
        // Five diagonal and four straight steps.
        assert_eq!(path.len(), 10);
        assert!((path.cost - (4.0 + 5.0 * 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn random_walks_are_valid_routes() {
        let mut grid = ObstacleGrid::new(20, 20, false);
        grid.set_rect(Rect::new(5, 5, 10, 1), true);
        let mut rng = StdRng::seed_from_u64(1);
        let start = Point::new(10, 0);
        let finish = Point::new(10, 19);
        for _ in 0..20 {
            if let Some(path) = random_greedy_walk(
                &grid,
                start,
                finish,
                None,
                &WalkerConfig::default(),
                &mut rng,
            )
            .unwrap()
            {
                assert_eq!(path.start(), Some(start));
                assert_eq!(path.finish(), Some(finish));
                assert!(is_connected(&path, &grid));
            }
        }
    }

    #[test]
    fn out_of_steps_near_goal_is_spliced() {
        let mut grid = ObstacleGrid::new(8, 8, false);
        grid.set_rect(Rect::new(0, 4, 7, 1), true);
        let mut rng = StdRng::seed_from_u64(2);
        let config = WalkerConfig {
            max_steps: 0,
            ..WalkerConfig::default()
        };
        let start = Point::new(0, 0);
        let finish = Point::new(0, 7);
        let path = random_greedy_walk(&grid, start, finish, None, &config, &mut rng)
            .unwrap()
            .unwrap();
        let searched = find_path(&grid, start, finish, None, SearchConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(path.cells, searched.cells);
        assert!((path.cost - searched.cost).abs() < 1e-9);
    }

    #[test]
    fn out_of_steps_far_from_goal_fails() {
        let grid = ObstacleGrid::new(40, 40, false);
        let mut rng = StdRng::seed_from_u64(3);
        let config = WalkerConfig {
            max_steps: 3,
            ..WalkerConfig::default()
        };
        let result = random_greedy_walk(
            &grid,
            Point::new(0, 0),
            Point::new(39, 39),
            None,
            &config,
            &mut rng,
        )
        .unwrap();
        assert!(result.is_none());
    }

    fn has_no_repeated_cells(path: &Path) -> bool {
        let visited = path.cells.iter().collect::<fxhash::FxHashSet<_>>();
        visited.len() == path.cells.len()
    }

    /// |...........|
    /// |...######..|
    /// |...#....#..|
    /// |...#....#..|
    /// |...#....#..|
    /// |.....S.....|
    /// A cup opening towards the start traps a purely greedy walk, which then bounces between two
    /// cells below the cup's floor until it runs out of steps.
    #[test]
    fn loops_are_cut_from_the_route() {
        let mut grid = ObstacleGrid::new(12, 12, false);
        grid.set_rect(Rect::new(3, 6, 6, 1), true);
        grid.set_rect(Rect::new(3, 3, 1, 4), true);
        grid.set_rect(Rect::new(8, 3, 1, 4), true);
        let mut rng = StdRng::seed_from_u64(5);
        let start = Point::new(5, 0);
        let finish = Point::new(5, 11);
        let config = WalkerConfig {
            greedy_chance: 1.0,
            max_steps: 41,
            splice_distance: 100.0,
            ..WalkerConfig::default()
        };
        let path = random_greedy_walk(&grid, start, finish, None, &config, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(path.start(), Some(start));
        assert_eq!(path.finish(), Some(finish));
        assert!(is_connected(&path, &grid));
        assert!(has_no_repeated_cells(&path));
        let recomputed = Path::from_cells(path.cells.clone());
        assert!((path.cost - recomputed.cost).abs() < 1e-9);
    }

    #[test]
    fn random_steps_leave_the_greedy_line() {
        let grid = ObstacleGrid::new(20, 20, false);
        let mut rng = StdRng::seed_from_u64(6);
        let start = Point::new(0, 0);
        let finish = Point::new(19, 19);
        let config = WalkerConfig {
            greedy_chance: 0.0,
            max_steps: 6,
            splice_distance: 100.0,
            ..WalkerConfig::default()
        };
        let mut left_diagonal = false;
        for _ in 0..20 {
            let result = random_greedy_walk(&grid, start, finish, None, &config, &mut rng).unwrap();
            if let Some(path) = result {
                assert_eq!(path.start(), Some(start));
                assert_eq!(path.finish(), Some(finish));
                assert!(is_connected(&path, &grid));
                assert!(has_no_repeated_cells(&path));
                left_diagonal |= path.cells.iter().any(|p| p.x != p.y);
            }
        }
        // The greedy route is the diagonal itself.
        assert!(left_diagonal);
    }

    #[test]
    fn obstacle_endpoint_is_rejected() {
        let mut grid = ObstacleGrid::new(4, 4, false);
        grid.set(3, 3, true);
        let mut rng = StdRng::seed_from_u64(4);
        let result = random_greedy_walk(
            &grid,
            Point::new(0, 0),
            Point::new(3, 3),
            None,
            &WalkerConfig::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(PathError::ImpossibleEndpoint { .. })));
    }
}
