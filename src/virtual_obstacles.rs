//! Probabilistic generators for virtual obstacles: cells that are blocked for one search only.
//! Blocking cells on or around a known route pushes the next search onto a different one,
//! without touching the permanent map.
use fxhash::FxHashSet;
use grid_util::point::Point;
use grid_util::rect::Rect;
use log::debug;
use rand::Rng;

/// Every how many path cells a radial field is centred by [path_proximity].
pub const PROXIMITY_STRIDE: usize = 5;
/// Half the side length of the square fields placed by [path_proximity].
pub const PROXIMITY_RADIUS: i32 = 3;
/// Decay rate of the radial falloff.
const RADIAL_FALLOFF: f64 = 3.0;

/// A finite set of ephemeral obstacles, consulted by the neighbour generation on top of the
/// permanent map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualObstacles {
    cells: FxHashSet<Point>,
}

impl VirtualObstacles {
    pub fn new() -> VirtualObstacles {
        VirtualObstacles::default()
    }

    /// Marks a cell, returns false if it was already marked.
    pub fn insert(&mut self, cell: Point) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, cell: &Point) -> bool {
        self.cells.contains(cell)
    }

    /// Makes a cell passable again.
    pub fn release(&mut self, cell: &Point) -> bool {
        self.cells.remove(cell)
    }

    /// Adds all cells of `other`. Cells already present keep their marking.
    pub fn merge(&mut self, other: VirtualObstacles) {
        for cell in other.cells {
            self.cells.insert(cell);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.cells.iter()
    }
}

impl FromIterator<Point> for VirtualObstacles {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        VirtualObstacles {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Clamps a probability to [0, 1]; NaN counts as 0.
fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn cells(area: &Rect) -> impl Iterator<Item = Point> {
    let (ys, xs) = (area.y1..area.y1 + area.height(), area.x1..area.x1 + area.width());
    xs.flat_map(move |x| ys.clone().map(move |y| Point::new(x, y)))
}

/// Blocks every cell of `area` independently with probability `chance`.
pub fn uniform<R: Rng + ?Sized>(area: &Rect, chance: f64, rng: &mut R) -> VirtualObstacles {
    let chance = clamp_chance(chance);
    let obstacles = cells(area)
        .filter(|_| rng.gen_bool(chance))
        .collect::<VirtualObstacles>();
    debug!("Uniform field placed {} virtual obstacles", obstacles.len());
    obstacles
}

/// Blocks cells of `area` with a probability that is `chance` at the centre and decays as
/// `chance * exp(-3 d)`, where `d` is the mean of the horizontal and vertical offsets from the
/// centre, each normalised by half the side length. Obstruction is densest in the middle and thins
/// out towards the edges.
pub fn radial<R: Rng + ?Sized>(area: &Rect, chance: f64, rng: &mut R) -> VirtualObstacles {
    let chance = clamp_chance(chance);
    let half_w = (area.width() as f64 / 2.0).max(f64::EPSILON);
    let half_h = (area.height() as f64 / 2.0).max(f64::EPSILON);
    let center_x = area.x1 as f64 + area.width() as f64 / 2.0;
    let center_y = area.y1 as f64 + area.height() as f64 / 2.0;
    let obstacles = cells(area)
        .filter(|p| {
            let dx = (p.x as f64 + 0.5 - center_x).abs() / half_w;
            let dy = (p.y as f64 + 0.5 - center_y).abs() / half_h;
            let distance = (dx + dy) / 2.0;
            rng.gen_bool(clamp_chance(chance * (-RADIAL_FALLOFF * distance).exp()))
        })
        .collect::<VirtualObstacles>();
    debug!("Radial field placed {} virtual obstacles", obstacles.len());
    obstacles
}

/// Places a [radial] field of radius [PROXIMITY_RADIUS] around every [PROXIMITY_STRIDE]-th cell of
/// `path` and merges them. The first and last cell of the path are never blocked, so the same
/// endpoints can be searched again around the obstruction.
pub fn path_proximity<R: Rng + ?Sized>(
    path: &[Point],
    chance: f64,
    rng: &mut R,
) -> VirtualObstacles {
    let mut obstacles = VirtualObstacles::new();
    for p in path.iter().step_by(PROXIMITY_STRIDE) {
        let side = 2 * PROXIMITY_RADIUS + 1;
        let area = Rect::new(p.x - PROXIMITY_RADIUS, p.y - PROXIMITY_RADIUS, side, side);
        obstacles.merge(radial(&area, chance, rng));
    }
    if let (Some(first), Some(last)) = (path.first(), path.last()) {
        obstacles.release(first);
        obstacles.release(last);
    }
    debug!(
        "Path proximity field placed {} virtual obstacles along {} cells",
        obstacles.len(),
        path.len()
    );
    obstacles
}
