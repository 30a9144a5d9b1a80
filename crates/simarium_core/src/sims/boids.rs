//! Flocking simulation (boids).
//!
//! A steering-behavior particle system: every boid combines three
//! contributions from its neighbors (cohesion toward the mean position,
//! alignment toward the mean velocity, inverse-distance separation), each
//! normalized to the maximum force and weighted by the host-adjustable
//! coefficients. The world wraps at the edges.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::{color, Circle, Settings, SimulationKind, Vec2};

use crate::config::FlockingConfig;
use crate::engine::Simulation;
use crate::surface::Surface;
use crate::toolbar::{Control, Toolbar};

/// One boid: position, radius, velocity, derived heading, and the neighbor
/// count used for density coloring.
#[derive(Debug, Clone)]
pub struct Boid {
    pub circle: Circle,
    pub velocity: Vec2,
    pub heading: f64,
    pub neighbor_count: usize,
}

/// Steering weights, default 1.0 each.
#[derive(Debug, Clone, Copy)]
struct Weights {
    cohesion: f64,
    alignment: f64,
    separation: f64,
}

pub struct FlockingSim {
    config: FlockingConfig,
    rng: ChaCha8Rng,
    boids: Vec<Boid>,
    weights: Weights,
    perception_radius: f64,
    separation_radius: f64,
}

impl FlockingSim {
    pub fn new(config: FlockingConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            boids: Vec::new(),
            weights: Weights {
                cohesion: 1.0,
                alignment: 1.0,
                separation: 1.0,
            },
            perception_radius: 0.0,
            separation_radius: 0.0,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn max_speed(&self) -> f64 {
        self.config.max_speed
    }

    /// Steering force for the boid at `index`, computed against the
    /// position/velocity snapshot taken at the start of the tick. A boid
    /// with no neighbors inside the perception radius coasts on pure
    /// inertia.
    fn flock(&self, index: usize, snapshot: &[(Circle, Vec2)]) -> (Vec2, usize) {
        let (me, _) = snapshot[index];
        let mut mass = Vec2::ZERO;
        let mut alignment = Vec2::ZERO;
        let mut separation = Vec2::ZERO;
        let mut perceived = 0usize;
        let mut density = 0usize;

        for (i, (other, velocity)) in snapshot.iter().enumerate() {
            if i == index {
                continue;
            }
            let distance = me.center().distance_to(&other.center());
            if distance < self.perception_radius {
                mass += Vec2::new(other.x, other.y);
                alignment += *velocity;
                perceived += 1;
                density += 1;
            }
            if distance < self.separation_radius && distance > 0.0 {
                // Inverse-distance weighting: dodge the closest boid first.
                separation += Vec2::new((me.x - other.x) / distance, (me.y - other.y) / distance);
                density += 1;
            }
        }

        if perceived == 0 {
            return (Vec2::ZERO, density);
        }

        let n = perceived as f64;
        let toward_mass = Vec2::new(mass.x / n - me.x, mass.y / n - me.y)
            .with_magnitude(self.config.max_force);
        let toward_heading = Vec2::new(alignment.x / n, alignment.y / n)
            .with_magnitude(self.config.max_force);
        let away = separation.with_magnitude(self.config.max_force);

        let force = toward_mass * self.weights.cohesion
            + toward_heading * self.weights.alignment
            + away * self.weights.separation;
        (force, density)
    }

    fn wrap(circle: &mut Circle, width: f64, height: f64) {
        if circle.x >= width {
            circle.x = 0.0;
        } else if circle.x < 0.0 {
            circle.x = width;
        }
        if circle.y >= height {
            circle.y = 0.0;
        } else if circle.y < 0.0 {
            circle.y = height;
        }
    }

    fn render(&self, surface: &mut Surface) {
        surface.clear(simarium_data::Rgba::BACKGROUND);
        let population = self.boids.len().max(1);
        for boid in &self.boids {
            let tint = color::color_for_value(boid.neighbor_count as f64, 0.0, population as f64);
            surface.fill_circle(&boid.circle, tint);
            let tip_x = boid.circle.x + 2.0 * boid.circle.r * boid.heading.cos();
            let tip_y = boid.circle.y + 2.0 * boid.circle.r * boid.heading.sin();
            surface.line(boid.circle.x, boid.circle.y, tip_x, tip_y, tint);
        }
    }
}

impl Simulation for FlockingSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Flocking
    }

    fn init(&mut self, surface: &mut Surface) {
        let diag = surface.diag_length();
        self.perception_radius = diag * self.config.perception_frac;
        self.separation_radius = diag * self.config.separation_frac;
        let radius = (diag * self.config.size_frac).max(1.0);

        let width = f64::from(surface.width()).max(1.0);
        let height = f64::from(surface.height()).max(1.0);
        self.boids = (0..self.config.population)
            .map(|_| {
                let velocity = Vec2::new(
                    (self.rng.gen::<f64>() - 0.5) * 2.0,
                    (self.rng.gen::<f64>() - 0.5) * 2.0,
                );
                Boid {
                    circle: Circle::new(
                        self.rng.gen::<f64>() * width,
                        self.rng.gen::<f64>() * height,
                        radius,
                    ),
                    heading: velocity.y.atan2(velocity.x),
                    velocity,
                    neighbor_count: 0,
                }
            })
            .collect();
        self.render(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() {
            return;
        }
        let width = f64::from(surface.width());
        let height = f64::from(surface.height());

        let snapshot: Vec<(Circle, Vec2)> =
            self.boids.iter().map(|b| (b.circle, b.velocity)).collect();

        for index in 0..self.boids.len() {
            let (force, density) = self.flock(index, &snapshot);
            let boid = &mut self.boids[index];
            boid.velocity = (boid.velocity + force).clamped(self.config.max_speed);
            boid.heading = boid.velocity.y.atan2(boid.velocity.x);
            boid.circle.x += boid.velocity.x;
            boid.circle.y += boid.velocity.y;
            boid.neighbor_count = density;
            Self::wrap(&mut boid.circle, width, height);
        }

        self.render(surface);
    }

    fn update_settings(&mut self, settings: &Settings) {
        match settings {
            Settings::Flocking {
                cohesion,
                alignment,
                separation,
            } => {
                self.weights = Weights {
                    cohesion: *cohesion,
                    alignment: *alignment,
                    separation: *separation,
                };
            }
            other => tracing::debug!(?other, "Ignoring settings payload for another simulation"),
        }
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

/// Three steering-weight sliders, range 0-2, default 1.0.
pub struct FlockingToolbar {
    controls: [Control; 3],
}

impl FlockingToolbar {
    pub fn new() -> Self {
        Self {
            controls: [
                Control::new("cohesion", 0.0, 2.0, 0.01, 1.0),
                Control::new("alignment", 0.0, 2.0, 0.01, 1.0),
                Control::new("separation", 0.0, 2.0, 0.01, 1.0),
            ],
        }
    }

    fn settings(&self) -> Settings {
        Settings::Flocking {
            cohesion: self.controls[0].value,
            alignment: self.controls[1].value,
            separation: self.controls[2].value,
        }
    }
}

impl Default for FlockingToolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbar for FlockingToolbar {
    fn controls(&self) -> &[Control] {
        &self.controls
    }

    fn adjust(&mut self, index: usize, steps: i32) -> Option<Settings> {
        self.controls.get_mut(index)?.nudge(steps);
        Some(self.settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn sim_with(population: usize) -> (FlockingSim, Surface) {
        let config = FlockingConfig {
            population,
            ..Default::default()
        };
        let mut sim = FlockingSim::new(config, ChaCha8Rng::seed_from_u64(21));
        let mut surface = Surface::new(200, 120);
        sim.init(&mut surface);
        (sim, surface)
    }

    #[test]
    fn test_speed_clamped_after_tick() {
        let (mut sim, mut surface) = sim_with(60);
        for _ in 0..10 {
            sim.tick(&mut surface);
        }
        let max = sim.max_speed();
        for boid in sim.boids() {
            assert!(boid.velocity.length() <= max + 1e-9);
        }
    }

    #[test]
    fn test_lone_boid_keeps_its_velocity() {
        let (mut sim, mut surface) = sim_with(1);
        let before = sim.boids()[0].velocity;
        sim.tick(&mut surface);
        assert_eq!(sim.boids()[0].velocity, before);
    }

    #[test]
    fn test_population_is_fixed_for_lifetime() {
        let (mut sim, mut surface) = sim_with(40);
        for _ in 0..5 {
            sim.tick(&mut surface);
        }
        assert_eq!(sim.boids().len(), 40);
    }

    #[test]
    fn test_positions_stay_in_wrapped_world() {
        let (mut sim, mut surface) = sim_with(80);
        for _ in 0..30 {
            sim.tick(&mut surface);
        }
        for boid in sim.boids() {
            assert!(boid.circle.x >= 0.0 && boid.circle.x <= 200.0);
            assert!(boid.circle.y >= 0.0 && boid.circle.y <= 120.0);
        }
    }

    #[test]
    fn test_weights_update_applies() {
        let (mut sim, _) = sim_with(10);
        sim.update_settings(&Settings::Flocking {
            cohesion: 0.5,
            alignment: 1.5,
            separation: 2.0,
        });
        assert_eq!(sim.weights.cohesion, 0.5);
        assert_eq!(sim.weights.alignment, 1.5);
        assert_eq!(sim.weights.separation, 2.0);
    }

    #[test]
    fn test_toolbar_builds_payload() {
        let mut toolbar = FlockingToolbar::new();
        let settings = toolbar.adjust(2, -1000).unwrap();
        assert_eq!(
            settings,
            Settings::Flocking {
                cohesion: 1.0,
                alignment: 1.0,
                separation: 0.0,
            }
        );
    }
}
