//! Diffusion-limited aggregation.
//!
//! A pool of random walkers drifts in from the surface edges; a walker that
//! touches the growing tree sticks, joins it, and is replaced by a fresh
//! edge walker with a slightly smaller radius, so the aggregate tapers as it
//! grows. Positions are clamped to the surface bounds on every step; the
//! edge-seeded walkers rely on that clamping.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::{color, Circle, Rgba, Settings, SimulationKind};

use crate::config::AggregationConfig;
use crate::engine::Simulation;
use crate::surface::Surface;

const FREE_WALKER: Rgba = Rgba::rgb(160, 160, 160);

/// A walker: position, radius and whether it has joined the tree.
#[derive(Debug, Clone, Copy)]
pub struct Walker {
    pub circle: Circle,
    pub stuck: bool,
}

pub struct DlaSim {
    config: AggregationConfig,
    rng: ChaCha8Rng,
    tree: Vec<Walker>,
    walkers: Vec<Walker>,
    max_radius: f64,
    step_amplitude: f64,
    width: f64,
    height: f64,
}

impl DlaSim {
    pub fn new(config: AggregationConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            tree: Vec::new(),
            walkers: Vec::new(),
            max_radius: 0.0,
            step_amplitude: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn tree(&self) -> &[Walker] {
        &self.tree
    }

    pub fn is_grown(&self) -> bool {
        self.tree.len() >= self.config.target_tree_size
    }

    /// Spawn point on a uniformly chosen edge, uniform along it.
    fn edge_point(&mut self) -> (f64, f64) {
        match self.rng.gen_range(0..4u8) {
            0 => (self.rng.gen::<f64>() * self.width, 0.0),
            1 => (0.0, self.rng.gen::<f64>() * self.height),
            2 => (self.width, self.rng.gen::<f64>() * self.height),
            _ => (self.rng.gen::<f64>() * self.width, self.height),
        }
    }

    fn fresh_walker(&mut self, radius: f64) -> Walker {
        let (x, y) = self.edge_point();
        Walker {
            circle: Circle::new(x, y, radius),
            stuck: false,
        }
    }

    fn walk(&mut self, index: usize) {
        let amp = self.step_amplitude;
        let dx = self.rng.gen::<f64>() * amp - amp / 2.0;
        let dy = self.rng.gen::<f64>() * amp - amp / 2.0;
        let walker = &mut self.walkers[index];
        walker.circle.x = (walker.circle.x + dx).clamp(0.0, self.width);
        walker.circle.y = (walker.circle.y + dy).clamp(0.0, self.height);
    }

    fn touches_tree(&self, walker: &Walker) -> bool {
        self.tree.iter().any(|node| {
            let reach = node.circle.r + walker.circle.r;
            walker
                .circle
                .center()
                .distance_squared_to(&node.circle.center())
                < reach * reach
        })
    }

    fn render(&self, surface: &mut Surface) {
        surface.clear(Rgba::BACKGROUND);
        for node in &self.tree {
            let tint = color::color_for_value(
                node.circle.r,
                self.config.min_radius,
                self.max_radius,
            );
            surface.fill_circle(&node.circle, tint);
        }
        for walker in &self.walkers {
            surface.fill_circle(&walker.circle, FREE_WALKER);
        }
    }
}

impl Simulation for DlaSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Aggregation
    }

    fn init(&mut self, surface: &mut Surface) {
        self.width = f64::from(surface.width());
        self.height = f64::from(surface.height());
        let diag = surface.diag_length();
        self.max_radius = (diag * self.config.radius_frac).max(1.0);
        self.step_amplitude = (diag * self.config.step_frac).max(1.0);

        self.tree = vec![Walker {
            circle: Circle::new(self.width / 2.0, self.height / 2.0, self.max_radius),
            stuck: true,
        }];
        let mut walkers = Vec::with_capacity(self.config.walker_count);
        for _ in 0..self.config.walker_count {
            let walker = self.fresh_walker(self.max_radius);
            walkers.push(walker);
        }
        self.walkers = walkers;
        self.render(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() {
            return;
        }
        if self.is_grown() {
            // Target reached: the aggregate is complete, nothing moves.
            self.render(surface);
            return;
        }

        for _ in 0..self.config.substeps_per_tick {
            for index in 0..self.walkers.len() {
                self.walk(index);
                if self.touches_tree(&self.walkers[index]) {
                    let mut stuck = self.walkers[index];
                    stuck.stuck = true;
                    let next_radius =
                        (stuck.circle.r * self.config.radius_decay).max(self.config.min_radius);
                    self.tree.push(stuck);
                    self.walkers[index] = self.fresh_walker(next_radius);
                    if self.is_grown() {
                        tracing::info!(nodes = self.tree.len(), "Aggregate complete");
                        self.render(surface);
                        return;
                    }
                }
            }
        }
        self.render(surface);
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
    use rand::SeedableRng;

    fn small_sim() -> (DlaSim, Surface) {
        // Larger radii and steps than the defaults so walkers find the
        // aggregate quickly on a small surface.
        let config = AggregationConfig {
            walker_count: 40,
            substeps_per_tick: 50,
            target_tree_size: 30,
            radius_frac: 0.02,
            step_frac: 0.03,
            ..Default::default()
        };
        let mut sim = DlaSim::new(config, ChaCha8Rng::seed_from_u64(5));
        let mut surface = Surface::new(120, 90);
        sim.init(&mut surface);
        (sim, surface)
    }

    #[test]
    fn test_seed_starts_at_center() {
        let (sim, _) = small_sim();
        assert_eq!(sim.tree().len(), 1);
        let seed = sim.tree()[0];
        assert!(seed.stuck);
        assert_eq!(seed.circle.x, 60.0);
        assert_eq!(seed.circle.y, 45.0);
    }

    #[test]
    fn test_stick_distance_invariant() {
        let (mut sim, mut surface) = small_sim();
        for _ in 0..400 {
            sim.tick(&mut surface);
            if sim.is_grown() {
                break;
            }
        }
        let tree = sim.tree();
        assert!(tree.len() > 1, "nothing ever stuck");
        // Every non-seed node stuck against some earlier node.
        for (i, node) in tree.iter().enumerate().skip(1) {
            let attached = tree[..i].iter().any(|prior| {
                let reach = prior.circle.r + node.circle.r;
                node.circle
                    .center()
                    .distance_squared_to(&prior.circle.center())
                    < reach * reach
            });
            assert!(attached, "tree node {i} is detached");
        }
    }

    #[test]
    fn test_growth_stops_at_target() {
        let (mut sim, mut surface) = small_sim();
        for _ in 0..800 {
            sim.tick(&mut surface);
        }
        assert!(sim.tree().len() <= 30);
    }

    #[test]
    fn test_walker_pool_size_is_constant() {
        let (mut sim, mut surface) = small_sim();
        for _ in 0..50 {
            sim.tick(&mut surface);
        }
        assert_eq!(sim.walkers.len(), 40);
    }

    #[test]
    fn test_radii_taper_and_floor() {
        let (mut sim, mut surface) = small_sim();
        for _ in 0..400 {
            sim.tick(&mut surface);
            if sim.is_grown() {
                break;
            }
        }
        let max = sim.max_radius;
        for node in sim.tree() {
            assert!(node.circle.r <= max + 1e-9);
            assert!(node.circle.r >= sim.config.min_radius - 1e-9);
        }
    }
}
