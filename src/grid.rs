//! 4-connected grid graph used by the demo binary and the tests
//!
//! Cells are `(x, y)` pairs. Moves go one cell up, down, left or right at
//! unit cost; walls and cells outside the grid are not enterable.

use crate::graph::{Graph, Neighbor};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

pub type Point = (i32, i32);

const DIRECTIONS: [Point; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Manhattan distance, admissible for unit-cost 4-connected moves
pub fn manhattan(a: &Point, b: &Point) -> f64 {
    f64::from((a.0 - b.0).abs() + (a.1 - b.1).abs())
}

/// Parameters for clustered random walls
#[derive(Debug, Clone)]
pub struct WallConfig {
    /// Number of random walks
    pub clusters: usize,
    /// Cells visited per walk
    pub steps: usize,
    /// Probability of turning a visited cell into a wall
    pub density: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            clusters: 8,
            steps: 200,
            density: 0.25,
        }
    }
}

impl WallConfig {
    pub fn with_clusters(mut self, clusters: usize) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set wall density, clamped to [0, 1]
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density.clamp(0.0, 1.0);
        self
    }
}

/// Rectangular grid with blocked cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    walls: HashSet<Point>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walls: HashSet::new(),
        }
    }

    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Point>) -> Self {
        self.walls.extend(walls);
        self
    }

    /// Grid with random-walk wall clusters, keeping `start` and `goal` open.
    ///
    /// The same seed always produces the same walls.
    pub fn random(
        width: i32,
        height: i32,
        config: &WallConfig,
        start: Point,
        goal: Point,
        rng: &mut impl Rng,
    ) -> Self {
        let mut walls = HashSet::new();
        if width <= 0 || height <= 0 {
            return Self::new(width, height);
        }
        let density = if config.density.is_nan() {
            0.0
        } else {
            config.density.clamp(0.0, 1.0)
        };
        for _ in 0..config.clusters {
            let mut p = (rng.random_range(0..width), rng.random_range(0..height));
            for _ in 0..config.steps {
                if rng.random_bool(density) && p != start && p != goal {
                    walls.insert(p);
                }
                let d = DIRECTIONS[rng.random_range(0..DIRECTIONS.len())];
                let np = (p.0 + d.0, p.1 + d.1);
                if np.0 >= 0 && np.0 < width && np.1 >= 0 && np.1 < height {
                    p = np;
                }
            }
        }
        Self {
            width,
            height,
            walls,
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.0 >= 0 && p.0 < self.width && p.1 >= 0 && p.1 < self.height
    }

    pub fn is_wall(&self, p: &Point) -> bool {
        self.walls.contains(p)
    }

    pub fn walls(&self) -> &HashSet<Point> {
        &self.walls
    }

    /// ASCII picture: `#` wall, `*` path, `S`/`G` path endpoints, `.` open
    pub fn render(&self, path: &[Point]) -> String {
        let on_path: HashSet<&Point> = path.iter().collect();
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let p = (x, y);
                let c = if path.first() == Some(&p) {
                    'S'
                } else if path.last() == Some(&p) {
                    'G'
                } else if on_path.contains(&p) {
                    '*'
                } else if self.is_wall(&p) {
                    '#'
                } else {
                    '.'
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

impl Graph<Point> for Grid {
    fn neighbors(&self, p: &Point) -> Vec<Neighbor<Point>> {
        DIRECTIONS
            .iter()
            .map(|d| (p.0 + d.0, p.1 + d.1))
            .filter(|np| self.contains(np) && !self.is_wall(np))
            .map(|np| Neighbor::new(np, 1.0))
            .collect()
    }
}

/// Seeded RNG for reproducible grids; `None` draws a seed from the OS.
pub fn grid_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    }
}

/// Pick distinct random start and goal cells.
///
/// Returns `None` for a grid with fewer than two cells.
pub fn random_endpoints(width: i32, height: i32, rng: &mut impl Rng) -> Option<(Point, Point)> {
    if width <= 0 || height <= 0 || i64::from(width) * i64::from(height) < 2 {
        return None;
    }
    loop {
        let start = (rng.random_range(0..width), rng.random_range(0..height));
        let goal = (rng.random_range(0..width), rng.random_range(0..height));
        if start != goal {
            return Some((start, goal));
        }
    }
}
