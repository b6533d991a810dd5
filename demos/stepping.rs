use avl_pathfinding::{find_path, BestFirstSearch, ObstacleGrid, SearchConfig, SearchStatus};
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use grid_util::rect::Rect;

// Advances a search one expansion at a time and draws the open (o) and closed (x) sets after
// every step, the way a visualisation would once per frame.
fn draw(grid: &ObstacleGrid, search: &BestFirstSearch<'_, ObstacleGrid>) {
    let snapshot = search.snapshot();
    for y in (0..grid.height() as i32).rev() {
        let row: String = (0..grid.width() as i32)
            .map(|x| {
                let p = Point::new(x, y);
                if snapshot.current == Some(p) {
                    '@'
                } else if grid.get(x, y) {
                    '#'
                } else if snapshot.closed.contains(&p) {
                    'x'
                } else if snapshot.open.contains(&p) {
                    'o'
                } else {
                    '.'
                }
            })
            .collect();
        println!("{row}");
    }
}

fn main() {
    let mut grid = ObstacleGrid::new(8, 6, false);
    grid.set_rect(Rect::new(3, 1, 1, 5), true);
    let start = Point::new(0, 3);
    let finish = Point::new(7, 3);

    let mut search = match BestFirstSearch::new(&grid, start, finish, None, SearchConfig::default())
    {
        Ok(search) => search,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    loop {
        let status = search.step();
        println!("expansion {}: {:?}", search.expansions(), status);
        draw(&grid, &search);
        println!();
        if status != SearchStatus::Continue {
            break;
        }
    }
    if let Some(path) = search.path() {
        println!("Found {:?} with cost {:.3}", path.cells, path.cost);
    }
    // Running to completion in one call gives the same result.
    let direct = find_path(&grid, start, finish, None, SearchConfig::default());
    println!("{:?}", direct.map(|p| p.map(|p| p.cost)));
}
