//! Seeded Poisson-disk (blue noise) sampling.
//!
//! Bridson's algorithm over a background grid: every returned point is at
//! least `min_distance` from every other, and the domain ends up maximally
//! covered. Used to place tour cities so no two land on top of each other.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::Point;

const CANDIDATES_PER_POINT: usize = 30;

/// Sample points inside the `width` x `height` rect anchored at
/// `(origin_x, origin_y)`, keeping pairwise distance >= `min_distance`.
pub fn sample(
    rng: &mut ChaCha8Rng,
    origin_x: f64,
    origin_y: f64,
    width: f64,
    height: f64,
    min_distance: f64,
) -> Vec<Point> {
    if width <= 0.0 || height <= 0.0 || min_distance <= 0.0 {
        return Vec::new();
    }

    // Background grid with cells small enough to hold at most one sample.
    let cell_size = min_distance / std::f64::consts::SQRT_2;
    let cols = (width / cell_size).ceil() as usize + 1;
    let rows = (height / cell_size).ceil() as usize + 1;
    let mut grid: Vec<Option<usize>> = vec![None; cols * rows];

    let mut points: Vec<Point> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let grid_idx = |x: f64, y: f64| {
        let cx = ((x / cell_size) as usize).min(cols - 1);
        let cy = ((y / cell_size) as usize).min(rows - 1);
        cy * cols + cx
    };

    let first = Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
    grid[grid_idx(first.x, first.y)] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let around = points[active[slot]];
        let mut placed = false;

        for _ in 0..CANDIDATES_PER_POINT {
            // Candidate in the annulus [r, 2r) around the active point.
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let radius = min_distance * (1.0 + rng.gen::<f64>());
            let candidate = Point::new(
                around.x + radius * angle.cos(),
                around.y + radius * angle.sin(),
            );
            if candidate.x < 0.0
                || candidate.x >= width
                || candidate.y < 0.0
                || candidate.y >= height
            {
                continue;
            }

            let ccx = ((candidate.x / cell_size) as usize).min(cols - 1) as i64;
            let ccy = ((candidate.y / cell_size) as usize).min(rows - 1) as i64;
            let min_sq = min_distance * min_distance;
            let mut too_close = false;
            'scan: for dy in -2..=2i64 {
                for dx in -2..=2i64 {
                    let nx = ccx + dx;
                    let ny = ccy + dy;
                    if nx < 0 || ny < 0 || nx >= cols as i64 || ny >= rows as i64 {
                        continue;
                    }
                    if let Some(existing) = grid[ny as usize * cols + nx as usize] {
                        if points[existing].distance_squared_to(&candidate) < min_sq {
                            too_close = true;
                            break 'scan;
                        }
                    }
                }
            }
            if too_close {
                continue;
            }

            let idx = points.len();
            grid[grid_idx(candidate.x, candidate.y)] = Some(idx);
            points.push(candidate);
            active.push(idx);
            placed = true;
            break;
        }

        if !placed {
            active.swap_remove(slot);
        }
    }

    for p in &mut points {
        p.x += origin_x;
        p.y += origin_y;
    }
    points
}
