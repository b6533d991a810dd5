use avl_pathfinding::{Pathfinder, ObstacleGrid, WalkerConfig};
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use grid_util::rect::Rect;
use rand::{rngs::StdRng, SeedableRng};

fn show(grid: &ObstacleGrid, cells: &[Point]) {
    for y in (0..grid.height() as i32).rev() {
        let row: String = (0..grid.width() as i32)
            .map(|x| {
                if grid.get(x, y) {
                    '#'
                } else if cells.contains(&Point::new(x, y)) {
                    '*'
                } else {
                    '.'
                }
            })
            .collect();
        println!("{row}");
    }
    println!();
}

// Prints the shortest route across a room with two pillars, followed by routes that are varied
// by scattering virtual obstacles along it and by a random greedy walk.
fn main() {
    let mut grid = ObstacleGrid::new(16, 10, false);
    grid.set_rect(Rect::new(4, 2, 2, 6), true);
    grid.set_rect(Rect::new(10, 2, 2, 6), true);
    let mut pathfinder = Pathfinder::new(grid);
    let mut rng = StdRng::seed_from_u64(0);
    let start = Point::new(0, 5);
    let goal = Point::new(15, 4);

    if let Ok(Some(path)) = pathfinder.get_path_single_goal(start, goal) {
        println!("Shortest, cost {:.2}", path.cost);
        show(&pathfinder.grid, &path.cells);
    }
    for i in 0..3 {
        if let Ok(Some(path)) = pathfinder.get_alternative_path(start, goal, 0.5, &mut rng) {
            println!("Alternative {i}, cost {:.2}", path.cost);
            show(&pathfinder.grid, &path.cells);
        }
    }
    let walker = WalkerConfig {
        greedy_chance: 0.7,
        ..WalkerConfig::default()
    };
    match pathfinder.get_random_path(start, goal, &walker, &mut rng) {
        Ok(Some(path)) => {
            println!("Random walk, cost {:.2}", path.cost);
            show(&pathfinder.grid, &path.cells);
        }
        Ok(None) => println!("The random walk did not reach the goal"),
        Err(e) => println!("{e}"),
    }
}
