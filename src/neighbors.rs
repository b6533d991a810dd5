use grid_util::point::Point;
use smallvec::SmallVec;

use crate::grid::ObstacleMap;
use crate::virtual_obstacles::VirtualObstacles;
use crate::N_SMALLVEC_SIZE;

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Straight-line distance between two cells.
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x) as f64).hypot((a.y - b.y) as f64)
}

/// Cost of moving between two adjacent cells: 1 orthogonally, sqrt(2) diagonally.
pub fn step_cost(from: Point, to: Point) -> f64 {
    euclidean_distance(from, to)
}

/// Produces the cells reachable in one move, on an 8-connected grid without corner cutting.
///
/// A diagonal move is only allowed if at least one of the two orthogonal cells flanking it is
/// free. Cells in the optional set of virtual obstacles are never produced.
pub struct NeighborGenerator<'a, M: ObstacleMap + ?Sized> {
    map: &'a M,
    virtual_obstacles: Option<&'a VirtualObstacles>,
}

impl<'a, M: ObstacleMap + ?Sized> Clone for NeighborGenerator<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: ObstacleMap + ?Sized> Copy for NeighborGenerator<'a, M> {}

impl<'a, M: ObstacleMap + ?Sized> NeighborGenerator<'a, M> {
    pub fn new(map: &'a M, virtual_obstacles: Option<&'a VirtualObstacles>) -> Self {
        NeighborGenerator {
            map,
            virtual_obstacles,
        }
    }

    pub fn map(&self) -> &'a M {
        self.map
    }

    pub fn virtual_obstacles(&self) -> Option<&'a VirtualObstacles> {
        self.virtual_obstacles
    }

    /// Whether a single move from `from` to the adjacent cell `to` is allowed.
    pub fn can_move(&self, from: Point, to: Point) -> bool {
        debug_assert!((from.x - to.x).abs() <= 1 && (from.y - to.y).abs() <= 1);
        if self.map.is_obstacle(to) {
            return false;
        }
        if self
            .virtual_obstacles
            .is_some_and(|obstacles| obstacles.contains(&to))
        {
            return false;
        }
        if from.x != to.x && from.y != to.y {
            let side_1 = Point::new(to.x, from.y);
            let side_2 = Point::new(from.x, to.y);
            !self.map.is_obstacle(side_1) || !self.map.is_obstacle(side_2)
        } else {
            true
        }
    }

    /// Orthogonal candidates first, then diagonal ones.
    pub fn neighbors(&self, position: Point) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        ORTHOGONAL
            .iter()
            .chain(DIAGONAL.iter())
            .map(|(dx, dy)| Point::new(position.x + dx, position.y + dy))
            .filter(|p| self.can_move(position, *p))
            .collect()
    }

    pub fn neighbors_and_cost(&self, position: Point) -> SmallVec<[(Point, f64); N_SMALLVEC_SIZE]> {
        self.neighbors(position)
            .into_iter()
            .map(|p| (p, step_cost(position, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(cells: &'static [(i32, i32)]) -> impl Fn(Point) -> bool {
        move |p: Point| cells.contains(&(p.x, p.y))
    }

    #[test]
    fn open_field_has_eight_neighbours() {
        let map = blocked(&[]);
        let generator = NeighborGenerator::new(&map, None);
        let neighbors = generator.neighbors(Point::new(3, 3));
        assert_eq!(neighbors.len(), 8);
        let costs = generator.neighbors_and_cost(Point::new(3, 3));
        assert_eq!(costs.iter().filter(|(_, c)| *c == 1.0).count(), 4);
        assert_eq!(
            costs
                .iter()
                .filter(|(_, c)| (*c - 2f64.sqrt()).abs() < 1e-12)
                .count(),
            4
        );
    }

    /// |.#|
    /// |#.|
    #[test]
    fn diagonal_gap_between_two_obstacles_is_closed() {
        let map = blocked(&[(1, 0), (0, 1)]);
        let generator = NeighborGenerator::new(&map, None);
        let neighbors = generator.neighbors(Point::new(0, 0));
        assert!(!neighbors.contains(&Point::new(1, 1)));
        assert!(!generator.can_move(Point::new(1, 1), Point::new(0, 0)));
    }

    #[test]
    fn diagonal_past_a_single_obstacle_is_open() {
        let map = blocked(&[(1, 0)]);
        let generator = NeighborGenerator::new(&map, None);
        let neighbors = generator.neighbors(Point::new(0, 0));
        assert!(neighbors.contains(&Point::new(1, 1)));
        assert!(!neighbors.contains(&Point::new(1, 0)));
        assert_eq!(neighbors.len(), 7);
    }

    #[test]
    fn virtual_obstacles_are_excluded() {
        let map = blocked(&[]);
        let mut obstacles = VirtualObstacles::new();
        obstacles.insert(Point::new(1, 0));
        obstacles.insert(Point::new(-1, -1));
        let generator = NeighborGenerator::new(&map, Some(&obstacles));
        let neighbors = generator.neighbors(Point::new(0, 0));
        assert_eq!(neighbors.len(), 6);
        assert!(!neighbors.contains(&Point::new(1, 0)));
        assert!(!neighbors.contains(&Point::new(-1, -1)));
        // Virtual obstacles do not close diagonals the way permanent ones do.
        assert!(neighbors.contains(&Point::new(1, 1)));
    }
}
