//! Conway's Game of Life with pattern seeding and pre-run editing.
//!
//! Each cell carries a precomputed list of its Moore neighbors; a generation
//! is computed against the previous one held in a second buffer, never in
//! place. Seeds arrive either as standard RLE pattern strings or as sparse
//! coordinate sets, are centered on the grid, and replace the whole
//! automaton. A pattern that does not fit is rejected whole: a partial
//! placement would corrupt the generation-consistency invariant.

use std::time::Duration;

use simarium_data::{Rgba, Settings, SimulationKind};
use thiserror::Error;

use crate::config::LifeConfig;
use crate::engine::Simulation;
use crate::surface::Surface;
use crate::toolbar::{Control, Toolbar};

const LIVE: Rgba = Rgba::rgb(230, 230, 230);
const GRID_LINE: Rgba = Rgba::rgb(60, 60, 60);

/// A decoded seed pattern: a bounding box plus the live cells inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<(usize, usize)>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern has no live cells")]
    Empty,
    #[error("unexpected character '{0}' in pattern")]
    UnexpectedCharacter(char),
    #[error("pattern is missing its '!' terminator")]
    Unterminated,
}

/// Decode a run-length-encoded pattern: digits repeat the next tag, `b` is
/// a dead run, `o` a live run, `$` ends a row, `!` ends the pattern.
/// `#`-comment lines and the `x = …` header line are tolerated and skipped.
pub fn decode_rle(src: &str) -> Result<Pattern, PatternError> {
    let body = src
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('#') && !trimmed.starts_with("x =") && !trimmed.starts_with("x=")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut cells = Vec::new();
    let mut x = 0usize;
    let mut y = 0usize;
    let mut width = 0usize;
    let mut count = 0usize;
    let mut terminated = false;

    for ch in body.chars() {
        match ch {
            '0'..='9' => {
                count = count * 10 + ch.to_digit(10).unwrap_or(0) as usize;
            }
            'b' => {
                x += count.max(1);
                count = 0;
            }
            'o' => {
                for _ in 0..count.max(1) {
                    cells.push((x, y));
                    x += 1;
                }
                count = 0;
            }
            '$' => {
                width = width.max(x);
                y += count.max(1);
                x = 0;
                count = 0;
            }
            '!' => {
                terminated = true;
                break;
            }
            c if c.is_whitespace() => {}
            other => return Err(PatternError::UnexpectedCharacter(other)),
        }
    }

    if !terminated {
        return Err(PatternError::Unterminated);
    }
    if cells.is_empty() {
        return Err(PatternError::Empty);
    }
    width = width.max(x);
    Ok(Pattern {
        width,
        height: y + 1,
        cells,
    })
}

/// Decode a plaintext pattern: `.` dead, `O` live, one text line per row,
/// `!`-comment lines skipped.
pub fn decode_plaintext(src: &str) -> Result<Pattern, PatternError> {
    let mut cells = Vec::new();
    let mut width = 0usize;
    let mut y = 0usize;
    for line in src.lines() {
        if line.trim_start().starts_with('!') {
            continue;
        }
        for (x, ch) in line.chars().enumerate() {
            match ch {
                'O' => {
                    cells.push((x, y));
                    width = width.max(x + 1);
                }
                '.' | ' ' => width = width.max(x + 1),
                other => return Err(PatternError::UnexpectedCharacter(other)),
            }
        }
        y += 1;
    }
    if cells.is_empty() {
        return Err(PatternError::Empty);
    }
    Ok(Pattern {
        width,
        height: y,
        cells,
    })
}

/// Build a pattern from a sparse coordinate set, normalized to its own
/// bounding box.
pub fn pattern_from_cells(coords: &[(i32, i32)]) -> Result<Pattern, PatternError> {
    if coords.is_empty() {
        return Err(PatternError::Empty);
    }
    let min_x = coords.iter().map(|c| c.0).min().unwrap_or(0);
    let min_y = coords.iter().map(|c| c.1).min().unwrap_or(0);
    let cells: Vec<(usize, usize)> = coords
        .iter()
        .map(|&(x, y)| ((x - min_x) as usize, (y - min_y) as usize))
        .collect();
    let width = cells.iter().map(|c| c.0).max().unwrap_or(0) + 1;
    let height = cells.iter().map(|c| c.1).max().unwrap_or(0) + 1;
    Ok(Pattern {
        width,
        height,
        cells,
    })
}

pub struct LifeSim {
    config: LifeConfig,
    cols: usize,
    rows: usize,
    cell_side: f64,
    alive: Vec<bool>,
    scratch: Vec<bool>,
    neighbors: Vec<Vec<usize>>,
    editable: bool,
    pending: Option<Pattern>,
    generation: u64,
}

impl LifeSim {
    pub fn new(config: LifeConfig) -> Self {
        Self {
            config,
            cols: 0,
            rows: 0,
            cell_side: 0.0,
            alive: Vec::new(),
            scratch: Vec::new(),
            neighbors: Vec::new(),
            editable: true,
            pending: None,
            generation: 0,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_alive(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.alive[row * self.cols + col]
    }

    pub fn set_cell(&mut self, col: usize, row: usize, alive: bool) {
        if col < self.cols && row < self.rows {
            self.alive[row * self.cols + col] = alive;
        }
    }

    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Advance one generation against the snapshot of the previous one.
    pub fn step_generation(&mut self) {
        for idx in 0..self.alive.len() {
            let live_neighbors = self.neighbors[idx]
                .iter()
                .filter(|&&n| self.alive[n])
                .count();
            self.scratch[idx] = if self.alive[idx] {
                (2..=3).contains(&live_neighbors)
            } else {
                live_neighbors == 3
            };
        }
        std::mem::swap(&mut self.alive, &mut self.scratch);
        self.generation += 1;
    }

    /// Center `pattern` on a fresh grid. Returns false without touching
    /// anything if the pattern does not fit.
    pub fn apply_pattern(&mut self, pattern: &Pattern) -> bool {
        if pattern.width > self.cols || pattern.height > self.rows {
            tracing::warn!(
                pattern_width = pattern.width,
                pattern_height = pattern.height,
                "Pattern larger than grid, rejected"
            );
            return false;
        }
        let pad_x = (self.cols - pattern.width) / 2;
        let pad_y = (self.rows - pattern.height) / 2;
        self.alive.fill(false);
        for &(x, y) in &pattern.cells {
            self.alive[(y + pad_y) * self.cols + (x + pad_x)] = true;
        }
        self.generation = 0;
        true
    }

    fn render_cell(&self, surface: &mut Surface, idx: usize) {
        let x = (idx % self.cols) as f64 * self.cell_side;
        let y = (idx / self.cols) as f64 * self.cell_side;
        let fill = if self.alive[idx] {
            LIVE
        } else {
            Rgba::BACKGROUND
        };
        surface.fill_rect(x, y, self.cell_side, self.cell_side, fill);
        surface.stroke_rect(x, y, self.cell_side, self.cell_side, GRID_LINE);
    }

    fn render(&self, surface: &mut Surface) {
        surface.clear(Rgba::BACKGROUND);
        for idx in 0..self.alive.len() {
            self.render_cell(surface, idx);
        }
    }
}

impl Simulation for LifeSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Life
    }

    fn init(&mut self, surface: &mut Surface) {
        let diag = surface.diag_length();
        self.cell_side = (diag * self.config.cell_frac).round().max(2.0);
        self.cols = (f64::from(surface.width()) / self.cell_side) as usize;
        self.rows = (f64::from(surface.height()) / self.cell_side) as usize;
        if self.cols == 0 || self.rows == 0 {
            self.alive.clear();
            return;
        }

        let total = self.cols * self.rows;
        self.alive = vec![false; total];
        self.scratch = vec![false; total];
        self.neighbors = (0..total)
            .map(|idx| {
                let col = (idx % self.cols) as i64;
                let row = (idx / self.cols) as i64;
                let mut list = Vec::with_capacity(8);
                for dr in -1..=1i64 {
                    for dc in -1..=1i64 {
                        if dc == 0 && dr == 0 {
                            continue;
                        }
                        let nc = col + dc;
                        let nr = row + dr;
                        if nc >= 0 && nc < self.cols as i64 && nr >= 0 && nr < self.rows as i64 {
                            list.push(nr as usize * self.cols + nc as usize);
                        }
                    }
                }
                list
            })
            .collect();

        self.render(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() || self.alive.is_empty() {
            return;
        }
        // The automaton is running now; the edit channel closes.
        self.editable = false;

        if let Some(pattern) = self.pending.take() {
            // The reset is this tick's bounded unit of work.
            if self.apply_pattern(&pattern) {
                self.render(surface);
                return;
            }
        }

        self.step_generation();
        self.render(surface);
    }

    fn update_settings(&mut self, settings: &Settings) {
        match settings {
            Settings::LifePattern { rle } => match decode_rle(rle) {
                Ok(pattern) => self.pending = Some(pattern),
                Err(err) => tracing::warn!(%err, "Rejected seed pattern"),
            },
            Settings::LifeCells { cells } => match pattern_from_cells(cells) {
                Ok(pattern) => self.pending = Some(pattern),
                Err(err) => tracing::warn!(%err, "Rejected seed cells"),
            },
            other => tracing::debug!(?other, "Ignoring settings payload for another simulation"),
        }
    }

    fn pointer_down(&mut self, surface: &mut Surface, x: f64, y: f64) {
        if !self.editable || self.alive.is_empty() || x < 0.0 || y < 0.0 {
            return;
        }
        let col = (x / self.cell_side) as usize;
        let row = (y / self.cell_side) as usize;
        if col >= self.cols || row >= self.rows {
            return;
        }
        let idx = row * self.cols + col;
        self.alive[idx] = !self.alive[idx];
        self.render_cell(surface, idx);
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

/// Pattern-injection actions. Adjustable controls: none.
pub struct LifeToolbar {
    patterns: Vec<(&'static str, PatternSource)>,
    names: Vec<&'static str>,
}

enum PatternSource {
    Rle(&'static str),
    Plaintext(&'static str),
}

const GLIDER: &str = "bob$2bo$3o!";
const LWSS: &str = "bo2bo$o4b$o3bo$4o!";
const PULSAR: &str = "2b3o3b3o2b2$o4bobo4bo$o4bobo4bo$o4bobo4bo$2b3o3b3o2b2$2b3o3b3o2b$o4bobo4bo$o4bobo4bo$o4bobo4bo2$2b3o3b3o!";
const GOSPER_GUN: &str = "\
........................O
......................O.O
............OO......OO............OO
...........O...O....OO............OO
OO........O.....O...OO
OO........O...O.OO....O.O
..........O.....O.......O
...........O...O
............OO
";

impl LifeToolbar {
    pub fn new() -> Self {
        let patterns = vec![
            ("Glider", PatternSource::Rle(GLIDER)),
            ("Lightweight spaceship", PatternSource::Rle(LWSS)),
            ("Pulsar", PatternSource::Rle(PULSAR)),
            ("Gosper glider gun", PatternSource::Plaintext(GOSPER_GUN)),
        ];
        let names = patterns.iter().map(|(name, _)| *name).collect();
        Self { patterns, names }
    }
}

impl Default for LifeToolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbar for LifeToolbar {
    fn controls(&self) -> &[Control] {
        &[]
    }

    fn actions(&self) -> &[&'static str] {
        &self.names
    }

    fn adjust(&mut self, _index: usize, _steps: i32) -> Option<Settings> {
        None
    }

    fn trigger(&mut self, index: usize) -> Option<Settings> {
        match self.patterns.get(index)? {
            (_, PatternSource::Rle(rle)) => Some(Settings::LifePattern {
                rle: (*rle).to_string(),
            }),
            (_, PatternSource::Plaintext(text)) => {
                let pattern = decode_plaintext(text).ok()?;
                Some(Settings::LifeCells {
                    cells: pattern
                        .cells
                        .iter()
                        .map(|&(x, y)| (x as i32, y as i32))
                        .collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_50x30() -> (LifeSim, Surface) {
        let config = LifeConfig {
            cell_frac: 0.001,
            ..Default::default()
        };
        let mut sim = LifeSim::new(config);
        let mut surface = Surface::new(100, 60);
        sim.init(&mut surface);
        assert_eq!(sim.dimensions(), (50, 30));
        (sim, surface)
    }

    #[test]
    fn test_empty_grid_stays_empty() {
        let (mut sim, _) = sim_50x30();
        sim.step_generation();
        assert_eq!(sim.live_count(), 0);
    }

    #[test]
    fn test_lone_cell_dies() {
        let (mut sim, _) = sim_50x30();
        sim.set_cell(10, 10, true);
        sim.step_generation();
        assert_eq!(sim.live_count(), 0);
    }

    #[test]
    fn test_block_is_stable() {
        let (mut sim, _) = sim_50x30();
        for (c, r) in [(10, 10), (11, 10), (10, 11), (11, 11)] {
            sim.set_cell(c, r, true);
        }
        for _ in 0..5 {
            sim.step_generation();
        }
        assert_eq!(sim.live_count(), 4);
        assert!(sim.is_alive(10, 10) && sim.is_alive(11, 11));
    }

    #[test]
    fn test_blinker_oscillates() {
        let (mut sim, _) = sim_50x30();
        for c in [9, 10, 11] {
            sim.set_cell(c, 10, true);
        }
        sim.step_generation();
        assert!(sim.is_alive(10, 9) && sim.is_alive(10, 10) && sim.is_alive(10, 11));
        sim.step_generation();
        assert!(sim.is_alive(9, 10) && sim.is_alive(10, 10) && sim.is_alive(11, 10));
    }

    #[test]
    fn test_decode_rle_glider() {
        let pattern = decode_rle(GLIDER).unwrap();
        assert_eq!(pattern.width, 3);
        assert_eq!(pattern.height, 3);
        let mut cells = pattern.cells.clone();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 2), (1, 0), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_decode_rle_skips_header_and_comments() {
        let pattern = decode_rle("#N Glider\n#C classic\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!")
            .unwrap();
        assert_eq!(pattern.width, 3);
        assert_eq!(pattern.height, 3);
    }

    #[test]
    fn test_decode_rle_row_multiplier() {
        // Two live cells separated by two blank rows.
        let pattern = decode_rle("o3$o!").unwrap();
        assert_eq!(pattern.height, 4);
        assert_eq!(pattern.cells, vec![(0, 0), (0, 3)]);
    }

    #[test]
    fn test_decode_rle_rejects_garbage() {
        assert_eq!(
            decode_rle("3oz!"),
            Err(PatternError::UnexpectedCharacter('z'))
        );
        assert_eq!(decode_rle("3o"), Err(PatternError::Unterminated));
        assert_eq!(decode_rle("3b!"), Err(PatternError::Empty));
    }

    #[test]
    fn test_decode_plaintext_gun() {
        let pattern = decode_plaintext(GOSPER_GUN).unwrap();
        assert_eq!(pattern.width, 36);
        assert_eq!(pattern.height, 9);
        assert_eq!(pattern.cells.len(), 36);
    }

    #[test]
    fn test_oversized_pattern_rejected_whole() {
        let (mut sim, _) = sim_50x30();
        sim.set_cell(5, 5, true);
        let huge = Pattern {
            width: 100,
            height: 100,
            cells: vec![(0, 0)],
        };
        assert!(!sim.apply_pattern(&huge));
        // Prior state untouched.
        assert!(sim.is_alive(5, 5));
        assert_eq!(sim.live_count(), 1);
    }

    #[test]
    fn test_pattern_is_centered() {
        let (mut sim, _) = sim_50x30();
        let dot = Pattern {
            width: 1,
            height: 1,
            cells: vec![(0, 0)],
        };
        assert!(sim.apply_pattern(&dot));
        assert!(sim.is_alive(24, 14));
    }

    #[test]
    fn test_seed_resets_without_stepping() {
        let (mut sim, mut surface) = sim_50x30();
        sim.update_settings(&Settings::LifePattern {
            rle: GLIDER.to_string(),
        });
        sim.tick(&mut surface);
        // The reset consumed the tick: generation 0, glider intact.
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.live_count(), 5);
    }

    #[test]
    fn test_editing_closes_when_running_starts() {
        let (mut sim, mut surface) = sim_50x30();
        sim.pointer_down(&mut surface, 5.0, 5.0);
        assert_eq!(sim.live_count(), 1);
        sim.tick(&mut surface);
        let after_tick = sim.live_count();
        sim.pointer_down(&mut surface, 9.0, 9.0);
        assert_eq!(sim.live_count(), after_tick);
    }

    #[test]
    fn test_toolbar_payloads() {
        let mut toolbar = LifeToolbar::new();
        match toolbar.trigger(0) {
            Some(Settings::LifePattern { rle }) => assert_eq!(rle, GLIDER),
            other => panic!("unexpected payload: {other:?}"),
        }
        match toolbar.trigger(3) {
            Some(Settings::LifeCells { cells }) => assert_eq!(cells.len(), 36),
            other => panic!("unexpected payload: {other:?}"),
        }
        assert!(toolbar.trigger(9).is_none());
    }
}
