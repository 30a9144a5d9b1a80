//! Sierpinski fractal by iterative subdivision.
//!
//! One equilateral triangle is rendered at init; every tick replaces the
//! current frontier with three half-size children per triangle (top,
//! bottom-left, bottom-right). The canvas is never cleared between ticks,
//! so earlier levels stay visible. Subdivision stops once children would
//! drop below the minimum side, which ties the iteration count to surface
//! resolution.

use std::time::Duration;

use simarium_data::{color, Settings, SimulationKind};

use crate::config::FractalConfig;
use crate::engine::Simulation;
use crate::surface::Surface;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// An equilateral triangle: apex position and side length.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Triangle {
    fn render(&self, surface: &mut Surface) {
        let half = self.size / 2.0;
        let height = SQRT_3 / 2.0 * self.size;
        let tint = color::color_for_value(self.size, 0.0, f64::from(surface.width()));
        surface.fill_triangle(
            (self.x, self.y),
            (self.x + half, self.y + height),
            (self.x - half, self.y + height),
            tint,
        );
    }

    /// Split into the three half-size children of the Sierpinski recursion.
    pub fn divide(&self) -> [Triangle; 3] {
        let side = self.size / 2.0;
        let height = SQRT_3 / 2.0 * side;
        [
            Triangle {
                x: self.x,
                y: self.y,
                size: side,
            },
            Triangle {
                x: self.x - side / 2.0,
                y: self.y + height,
                size: side,
            },
            Triangle {
                x: self.x + side / 2.0,
                y: self.y + height,
                size: side,
            },
        ]
    }
}

pub struct FractalSim {
    config: FractalConfig,
    frontier: Vec<Triangle>,
    iteration: u32,
    max_iterations: u32,
}

impl FractalSim {
    pub fn new(config: FractalConfig) -> Self {
        Self {
            config,
            frontier: Vec::new(),
            iteration: 0,
            max_iterations: 0,
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn frontier(&self) -> &[Triangle] {
        &self.frontier
    }
}

impl Simulation for FractalSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Fractal
    }

    fn init(&mut self, surface: &mut Surface) {
        if surface.is_empty() {
            return;
        }
        let width = f64::from(surface.width());
        let height = f64::from(surface.height());
        // Largest equilateral triangle that fits below the apex margin.
        let side = (width * 0.9).min((height * 0.9) * 2.0 / SQRT_3);
        if side < self.config.min_side {
            return;
        }
        self.max_iterations = (side / self.config.min_side).log2().floor() as u32;

        let root = Triangle {
            x: width / 2.0,
            y: height * 0.05,
            size: side,
        };
        surface.clear(simarium_data::Rgba::BACKGROUND);
        root.render(surface);
        self.frontier.push(root);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() || self.iteration >= self.max_iterations {
            return;
        }
        let parents = std::mem::take(&mut self.frontier);
        for triangle in &parents {
            triangle.render(surface);
            for child in triangle.divide() {
                child.render(surface);
                self.frontier.push(child);
            }
        }
        self.iteration += 1;
    }

    fn update_settings(&mut self, settings: &Settings) {
        tracing::debug!(?settings, "Ignoring settings payload for another simulation");
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_on(width: u32, height: u32) -> (FractalSim, Surface) {
        let mut sim = FractalSim::new(FractalConfig::default());
        let mut surface = Surface::new(width, height);
        sim.init(&mut surface);
        (sim, surface)
    }

    #[test]
    fn test_frontier_triples_per_tick() {
        let (mut sim, mut surface) = sim_on(200, 200);
        assert_eq!(sim.frontier().len(), 1);
        sim.tick(&mut surface);
        assert_eq!(sim.frontier().len(), 3);
        sim.tick(&mut surface);
        assert_eq!(sim.frontier().len(), 9);
    }

    #[test]
    fn test_children_are_half_size() {
        let parent = Triangle {
            x: 50.0,
            y: 10.0,
            size: 40.0,
        };
        let children = parent.divide();
        assert!(children.iter().all(|c| c.size == 20.0));
        // Top child keeps the apex.
        assert_eq!(children[0].x, parent.x);
        assert_eq!(children[0].y, parent.y);
    }

    #[test]
    fn test_iteration_cap_scales_with_resolution() {
        let (small, _) = sim_on(64, 64);
        let (large, _) = sim_on(512, 512);
        assert!(large.max_iterations() > small.max_iterations());
    }

    #[test]
    fn test_subdivision_stops_at_cap() {
        let (mut sim, mut surface) = sim_on(128, 128);
        for _ in 0..sim.max_iterations() + 10 {
            sim.tick(&mut surface);
        }
        assert_eq!(sim.iteration(), sim.max_iterations());
        let smallest = sim.frontier().iter().map(|t| t.size).fold(f64::MAX, f64::min);
        assert!(smallest >= FractalConfig::default().min_side / 2.0);
    }
}
