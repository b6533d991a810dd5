use avl_pathfinding::{ObstacleGrid, Pathfinder};
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use grid_util::rect::Rect;

// In this example a path is found on a grid with shape
// #####
// #S  #
// # # #
// #  E#
// #####
// S marks the start
// E marks the end
fn main() {
    let mut grid = ObstacleGrid::new(5, 5, true);
    grid.set_rect(Rect::new(1, 1, 3, 3), false);
    grid.set(2, 2, true);
    let mut pathfinder = Pathfinder::new(grid);
    let start = Point::new(1, 1);
    let end = Point::new(3, 3);
    println!("{}", pathfinder.grid);
    match pathfinder.get_path_single_goal(start, end) {
        Ok(Some(path)) => {
            println!("A path of cost {:.3} has been found:", path.cost);
            for (cell, waypoint) in path.cells.iter().zip(&path.waypoints) {
                println!("{} at ({}, {})", cell, waypoint.x, waypoint.y);
            }
        }
        Ok(None) => println!("No path from {} to {}", start, end),
        Err(e) => println!("{}", e),
    }
}
