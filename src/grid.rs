use core::fmt;
use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use log::info;
use petgraph::unionfind::UnionFind;

use crate::neighbors::NeighborGenerator;

/// The permanent obstacle map the search runs against.
///
/// Implemented for any `Fn(Point) -> bool` closure, so a host can query its own map
/// representation directly, and for [ObstacleGrid].
pub trait ObstacleMap {
    fn is_obstacle(&self, position: Point) -> bool;
}

impl<F> ObstacleMap for F
where
    F: Fn(Point) -> bool,
{
    fn is_obstacle(&self, position: Point) -> bool {
        self(position)
    }
}

/// [ObstacleGrid] holds a bounded [BoolGrid] in which [true] marks an obstacle. Everything outside
/// the bounds is treated as an obstacle. It also maintains the connected components of the free
/// cells in a [UnionFind] structure so that unreachable goals can be rejected without searching.
/// Implements [ValueGrid] by building on [BoolGrid].
#[derive(Clone, Debug)]
pub struct ObstacleGrid {
    pub grid: BoolGrid,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for ObstacleGrid {
    fn default() -> ObstacleGrid {
        ObstacleGrid {
            grid: BoolGrid::default(),
            components: UnionFind::new(0),
            components_dirty: false,
        }
    }
}

impl ObstacleMap for ObstacleGrid {
    fn is_obstacle(&self, position: Point) -> bool {
        !self.in_bounds(position.x, position.y) || self.grid.get(position.x, position.y)
    }
}

impl ObstacleGrid {
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    fn cell_ix(&self, point: &Point) -> usize {
        point.y as usize * self.width() + point.x as usize
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> usize {
        self.components.find(self.cell_ix(point))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component. Out-of-bounds points are
    /// unreachable.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(start.x, start.y) && self.in_bounds(goal.x, goal.y) {
            let start_ix = self.cell_ix(start);
            let goal_ix = self.cell_ix(goal);
            if self.components.equiv(start_ix, goal_ix) {
                false
            } else {
                info!("{} and {} are on different components", start, goal);
                true
            }
        } else {
            true
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up free cells that are one move apart,
    /// applying the same corner-cutting rule as the search.
    pub fn generate_components(&mut self) {
        let w = self.width();
        let h = self.height();
        let mut components = UnionFind::new(w * h);
        let moves = NeighborGenerator::new(&*self, None);
        for x in 0..w as i32 {
            for y in 0..h as i32 {
                let point = Point::new(x, y);
                if self.is_obstacle(point) {
                    continue;
                }
                let parent_ix = self.cell_ix(&point);
                // The other four directions are covered from the neighbouring cell.
                [
                    Point::new(x, y + 1),
                    Point::new(x + 1, y),
                    Point::new(x + 1, y + 1),
                    Point::new(x + 1, y - 1),
                ]
                .into_iter()
                .filter(|p| moves.can_move(point, *p))
                .for_each(|p| {
                    components.union(parent_ix, self.cell_ix(&p));
                });
            }
        }
        self.components = components;
        self.components_dirty = false;
    }
}

impl fmt::Display for ObstacleGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Grid:")?;
        for y in (0..self.height() as i32).rev() {
            let row = (0..self.width() as i32)
                .map(|x| if self.grid.get(x, y) { '#' } else { '.' })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

impl ValueGrid<bool> for ObstacleGrid {
    fn new(width: usize, height: usize, default_value: bool) -> Self {
        let mut base_grid = ObstacleGrid {
            grid: BoolGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
            components_dirty: false,
        };
        base_grid.generate_components();
        base_grid
    }
    fn get(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y)
    }
    /// Updates a position on the grid. Joins newly connected components and flags the components
    /// as dirty if components are (potentially) broken apart into multiple.
    fn set(&mut self, x: i32, y: i32, blocked: bool) {
        let was_blocked = self.grid.get(x, y);
        self.grid.set(x, y, blocked);
        if blocked {
            if !was_blocked {
                self.components_dirty = true;
            }
        } else if was_blocked {
            let p = Point::new(x, y);
            let p_ix = self.cell_ix(&p);
            let moves = NeighborGenerator::new(&*self, None);
            let joined = moves
                .neighbors(p)
                .into_iter()
                .map(|n| self.cell_ix(&n))
                .collect::<Vec<_>>();
            for ix in joined {
                self.components.union(p_ix, ix);
            }
        }
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}
