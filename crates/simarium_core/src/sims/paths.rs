//! Grid pathfinding with live frontier visualization.
//!
//! A* over a randomly walled grid, one expansion per tick so the search is
//! animatable. The frontier lives in a binary min-heap ordered by f-cost;
//! improvements re-push and stale entries are skipped on pop. A heuristic
//! weight of 0 degrades the search to uniform-cost Dijkstra; the host blends
//! between the two live.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::{Rgba, Settings, SimulationKind};

use crate::config::PathfindingConfig;
use crate::engine::Simulation;
use crate::surface::Surface;
use crate::toolbar::{Control, Toolbar};

const WALL: Rgba = Rgba::rgb(139, 94, 60);
const DEPARTURE: Rgba = Rgba::rgb(26, 145, 50);
const ARRIVAL: Rgba = Rgba::rgb(200, 60, 60);
const VALIDATED: Rgba = Rgba::rgb(79, 255, 193);
const OBSERVED: Rgba = Rgba::rgb(94, 160, 255);
const CLOSED: Rgba = Rgba::rgb(70, 80, 110);
const FLOOR: Rgba = Rgba::rgb(235, 235, 235);

/// One grid cell. Costs start at infinity; flags track which list the cell
/// sits in.
#[derive(Debug, Clone)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
    pub is_wall: bool,
    pub observed: bool,
    pub closed: bool,
    pub validated: bool,
    pub g: f64,
    pub f: f64,
}

impl Cell {
    fn new(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            is_wall: false,
            observed: false,
            closed: false,
            validated: false,
            g: f64::INFINITY,
            f: f64::INFINITY,
        }
    }
}

/// Terminal and non-terminal search states. `NoPath` freezes the
/// visualization; the engine stays alive either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    PathFound,
    NoPath,
}

/// Heap entry; ordered so the smallest f-cost pops first.
struct OpenEntry {
    f: f64,
    idx: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f.total_cmp(&other.f) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the lowest f first.
        other.f.total_cmp(&self.f)
    }
}

pub struct PathfindingSim {
    config: PathfindingConfig,
    rng: ChaCha8Rng,
    cols: usize,
    rows: usize,
    cell_side: f64,
    cells: Vec<Cell>,
    open: BinaryHeap<OpenEntry>,
    state: SearchState,
    astar_weight: f64,
    start: usize,
    goal: usize,
}

impl PathfindingSim {
    pub fn new(config: PathfindingConfig, rng: ChaCha8Rng) -> Self {
        let astar_weight = config.astar_weight;
        Self {
            config,
            rng,
            cols: 0,
            rows: 0,
            cell_side: 0.0,
            cells: Vec::new(),
            open: BinaryHeap::new(),
            state: SearchState::Searching,
            astar_weight,
            start: 0,
            goal: 0,
        }
    }

    pub fn search_state(&self) -> SearchState {
        self.state
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// g-cost of the goal cell, infinity until the path is found.
    pub fn goal_cost(&self) -> f64 {
        self.cells.get(self.goal).map_or(f64::INFINITY, |c| c.g)
    }

    pub fn validated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.validated).count()
    }

    fn manhattan(&self, idx: usize) -> f64 {
        let goal = &self.cells[self.goal];
        let cell = &self.cells[idx];
        (cell.col.abs_diff(goal.col) + cell.row.abs_diff(goal.row)) as f64
    }

    fn orthogonal_neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let col = self.cells[idx].col as i64;
        let row = self.cells[idx].row as i64;
        let cols = self.cols as i64;
        let rows = self.rows as i64;
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dc, dr)| {
                let nc = col + dc;
                let nr = row + dr;
                if nc >= 0 && nc < cols && nr >= 0 && nr < rows {
                    Some(nr as usize * self.cols + nc as usize)
                } else {
                    None
                }
            })
    }

    /// One A* expansion: pop the best open cell, close it, relax its
    /// orthogonal neighbors. Popping the goal reconstructs the path.
    fn expand(&mut self) {
        let current = loop {
            match self.open.pop() {
                Some(entry) if self.cells[entry.idx].closed => continue,
                Some(entry) => break entry.idx,
                None => {
                    self.state = SearchState::NoPath;
                    tracing::info!("No path found; search frozen");
                    return;
                }
            }
        };

        self.cells[current].closed = true;
        self.cells[current].observed = false;

        if current == self.goal {
            self.construct_path();
            self.state = SearchState::PathFound;
            tracing::info!(cost = self.cells[self.goal].g, "Path found");
            return;
        }

        let neighbors: Vec<usize> = self.orthogonal_neighbors(current).collect();
        for n in neighbors {
            if self.cells[n].is_wall || self.cells[n].closed {
                continue;
            }
            let tentative = self.cells[current].g + 1.0;
            if tentative < self.cells[n].g {
                let f = tentative + self.astar_weight * self.manhattan(n);
                self.cells[n].g = tentative;
                self.cells[n].f = f;
                self.cells[n].observed = true;
                self.open.push(OpenEntry { f, idx: n });
            }
        }
    }

    /// Walk from the goal back to the start by always stepping to an
    /// orthogonal non-wall neighbor with strictly smaller g, marking each
    /// step validated. Strict descent guarantees termination and marks
    /// every path cell exactly once.
    fn construct_path(&mut self) {
        let mut current = self.goal;
        self.cells[current].validated = true;
        while current != self.start {
            let down = self
                .orthogonal_neighbors(current)
                .filter(|&n| !self.cells[n].is_wall && self.cells[n].g < self.cells[current].g)
                .min_by(|&a, &b| self.cells[a].g.total_cmp(&self.cells[b].g));
            match down {
                Some(next) => {
                    self.cells[next].validated = true;
                    current = next;
                }
                None => break,
            }
        }
    }

    fn render(&self, surface: &mut Surface) {
        surface.clear(Rgba::BACKGROUND);
        let side = self.cell_side;
        for cell in &self.cells {
            let x = cell.col as f64 * side;
            let y = cell.row as f64 * side;
            let fill = if cell.col == 0 && cell.row == 0 {
                DEPARTURE
            } else if cell.col == self.cols - 1 && cell.row == self.rows - 1 {
                ARRIVAL
            } else if cell.is_wall {
                WALL
            } else if cell.validated {
                VALIDATED
            } else if cell.observed {
                OBSERVED
            } else if cell.closed {
                CLOSED
            } else {
                FLOOR
            };
            surface.stroke_rect(x, y, side, side, Rgba::BLACK);
            surface.fill_rect(x + 1.0, y + 1.0, side - 2.0, side - 2.0, fill);
        }
    }
}

impl Simulation for PathfindingSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Pathfinding
    }

    fn init(&mut self, surface: &mut Surface) {
        let diag = surface.diag_length();
        self.cell_side = (diag * self.config.cell_frac).round().max(2.0);
        self.cols = (f64::from(surface.width()) / self.cell_side) as usize;
        self.rows = (f64::from(surface.height()) / self.cell_side) as usize;
        if self.cols < 2 || self.rows < 2 {
            // Degenerate grid: nothing to search, every tick no-ops.
            self.cells.clear();
            return;
        }

        self.cells = (0..self.cols * self.rows)
            .map(|idx| Cell::new(idx % self.cols, idx / self.cols))
            .collect();
        self.start = 0;
        self.goal = self.cols * self.rows - 1;

        for idx in 0..self.cells.len() {
            if idx == self.start || idx == self.goal {
                continue;
            }
            if self.rng.gen::<f64>() < self.config.wall_density {
                self.cells[idx].is_wall = true;
            }
        }

        self.cells[self.start].g = 0.0;
        let f = self.astar_weight * self.manhattan(self.start);
        self.cells[self.start].f = f;
        self.cells[self.start].observed = true;
        self.open.push(OpenEntry { f, idx: self.start });

        self.render(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() || self.cells.is_empty() {
            return;
        }
        if self.state == SearchState::Searching {
            self.expand();
        }
        self.render(surface);
    }

    fn update_settings(&mut self, settings: &Settings) {
        match settings {
            Settings::PathBlend { astar_weight } => {
                self.astar_weight = astar_weight.clamp(0.0, 1.0);
            }
            other => tracing::debug!(?other, "Ignoring settings payload for another simulation"),
        }
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

/// One blend slider: 0 = Dijkstra, 1 = A*.
pub struct PathfindingToolbar {
    controls: [Control; 1],
}

impl PathfindingToolbar {
    pub fn new(astar_weight: f64) -> Self {
        Self {
            controls: [Control::new("dijkstra <-> astar", 0.0, 1.0, 0.01, astar_weight)],
        }
    }
}

impl Toolbar for PathfindingToolbar {
    fn controls(&self) -> &[Control] {
        &self.controls
    }

    fn adjust(&mut self, index: usize, steps: i32) -> Option<Settings> {
        self.controls.get_mut(index)?.nudge(steps);
        Some(Settings::PathBlend {
            astar_weight: self.controls[0].value,
        })
    }
}
