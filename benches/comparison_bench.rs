use avl_pathfinding::{
    find_path, random_greedy_walk, ObstacleGrid, OrderedMultiTree, Pathfinder, SearchConfig,
    WalkerConfig,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const N_SCENARIOS: usize = 32;

fn random_grid(n: usize, density: f64, rng: &mut StdRng) -> ObstacleGrid {
    let mut grid = ObstacleGrid::new(n, n, false);
    for x in 0..n as i32 {
        for y in 0..n as i32 {
            grid.set(x, y, rng.gen_bool(density));
        }
    }
    grid.generate_components();
    grid
}

/// Random start/goal pairs on free cells of the same component.
fn scenarios(grid: &ObstacleGrid, rng: &mut StdRng) -> Vec<(Point, Point)> {
    let n = grid.width() as i32;
    let mut free = || loop {
        let p = Point::new(rng.gen_range(0..n), rng.gen_range(0..n));
        if !grid.get(p.x, p.y) {
            return p;
        }
    };
    let mut result = Vec::new();
    while result.len() < N_SCENARIOS {
        let (start, goal) = (free(), free());
        if grid.reachable(&start, &goal) {
            result.push((start, goal));
        }
    }
    result
}

fn random_grid_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    for n in [32, 64, 128] {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = random_grid(n, 0.2, &mut rng);
        let scenarios = scenarios(&grid, &mut rng);
        let config = SearchConfig {
            max_expansions: n * n,
            ..SearchConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("random 20%", n), &n, |b, _| {
            b.iter(|| {
                for (start, goal) in &scenarios {
                    black_box(find_path(&grid, *start, *goal, None, config).ok());
                }
            })
        });
    }
    group.finish();
}

fn alternative_path_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let grid = random_grid(64, 0.1, &mut rng);
    let scenarios = scenarios(&grid, &mut rng);
    let mut pathfinder = Pathfinder::new(grid);
    c.bench_function("alternative path, 64x64", |b| {
        b.iter(|| {
            for (start, goal) in &scenarios {
                black_box(pathfinder.get_alternative_path(*start, *goal, 0.5, &mut rng).ok());
            }
        })
    });
    let walker = WalkerConfig::default();
    c.bench_function("random greedy walk, 64x64", |b| {
        b.iter(|| {
            for (start, goal) in &scenarios {
                black_box(
                    random_greedy_walk(&pathfinder.grid, *start, *goal, None, &walker, &mut rng)
                        .ok(),
                );
            }
        })
    });
}

fn tree_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let keys: Vec<u32> = (0..10_000).map(|_| rng.gen_range(0..1_000)).collect();
    c.bench_function("tree insert and drain, 10k", |b| {
        b.iter(|| {
            let mut tree = OrderedMultiTree::new(|k: &u32| *k);
            for k in &keys {
                tree.insert(*k);
            }
            while let Ok(k) = tree.pop_min() {
                black_box(k);
            }
        })
    });
}

criterion_group!(
    benches,
    random_grid_bench,
    alternative_path_bench,
    tree_bench
);
criterion_main!(benches);
