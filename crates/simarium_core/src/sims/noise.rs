//! Noise terrain: classic 2D gradient noise sampled per pixel.
//!
//! Two 512-entry tables are generated once from the seeded RNG: permutation
//! indices 0-255 doubled (so corner lookups never need a wrap-around
//! check) and unit gradient vectors. A sample fetches the four corner
//! gradients of its cell, takes dot products with the corner-to-point
//! vectors, and interpolates with the quintic fade curve in both axes.
//! Multiple octaves layer at doubling frequency and halving amplitude.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::{color, Settings, SimulationKind, Vec2};

use crate::config::NoiseConfig;
use crate::engine::Simulation;
use crate::surface::Surface;
use crate::toolbar::{Control, Toolbar};

/// The permutation and gradient tables behind `perlin2`. Built once,
/// reused for every sample.
pub struct NoiseField {
    perm: [usize; 512],
    grads: [Vec2; 512],
}

impl NoiseField {
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        let mut perm = [0usize; 512];
        for p in perm.iter_mut().take(256) {
            *p = rng.gen_range(0..256);
        }
        for i in 0..256 {
            perm[i + 256] = perm[i];
        }
        let mut grads = [Vec2::ZERO; 512];
        for g in grads.iter_mut() {
            let candidate = Vec2::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0);
            *g = if candidate.length() == 0.0 {
                Vec2::new(1.0, 0.0)
            } else {
                candidate.normalized()
            };
        }
        Self { perm, grads }
    }

    /// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        (1.0 - t) * a + t * b
    }

    /// Classic 2D gradient noise in roughly [-1, 1]. Deterministic for a
    /// fixed table pair, and continuous in both arguments.
    pub fn perlin2(&self, x: f64, y: f64) -> f64 {
        let cell_x = x.floor();
        let cell_y = y.floor();
        let fx = x - cell_x;
        let fy = y - cell_y;
        let ix = (cell_x as i64 & 255) as usize;
        let iy = (cell_y as i64 & 255) as usize;

        let n00 = self.grads[ix + self.perm[iy]].dot(Vec2::new(fx, fy));
        let n01 = self.grads[ix + self.perm[iy + 1]].dot(Vec2::new(fx, fy - 1.0));
        let n10 = self.grads[ix + 1 + self.perm[iy]].dot(Vec2::new(fx - 1.0, fy));
        let n11 = self.grads[ix + 1 + self.perm[iy + 1]].dot(Vec2::new(fx - 1.0, fy - 1.0));

        let u = Self::fade(fx);
        Self::lerp(
            Self::lerp(n00, n10, u),
            Self::lerp(n01, n11, u),
            Self::fade(fy),
        )
    }

    /// Layered octaves at doubling frequency and halving amplitude,
    /// normalized back into [-1, 1].
    pub fn fractal2(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;
        for _ in 0..octaves.max(1) {
            total += amplitude * self.perlin2(x * frequency, y * frequency);
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        total / norm
    }
}

pub struct NoiseSim {
    config: NoiseConfig,
    rng: ChaCha8Rng,
    field: Option<NoiseField>,
    frequency: f64,
    offset: f64,
}

impl NoiseSim {
    pub fn new(config: NoiseConfig, rng: ChaCha8Rng) -> Self {
        let frequency = config.frequency;
        Self {
            config,
            rng,
            field: None,
            frequency,
            offset: 0.0,
        }
    }

    fn blit(&self, surface: &mut Surface) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        surface.clear(simarium_data::Rgba::BACKGROUND);
        let width = surface.width();
        let height = surface.height();
        for py in 0..height {
            for px in 0..width {
                let sx = (f64::from(px) + self.offset) * self.frequency;
                let sy = (f64::from(py) + self.offset) * self.frequency;
                let value = field.fractal2(sx, sy, self.config.octaves);
                surface.put(
                    i64::from(px),
                    i64::from(py),
                    color::color_for_value(value, -1.0, 1.0),
                );
            }
        }
    }
}

impl Simulation for NoiseSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Noise
    }

    fn init(&mut self, surface: &mut Surface) {
        self.field = Some(NoiseField::new(&mut self.rng));
        self.blit(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() {
            return;
        }
        if self.config.time_varying {
            self.offset += self.config.drift;
        }
        self.blit(surface);
    }

    fn update_settings(&mut self, settings: &Settings) {
        match settings {
            Settings::NoiseSmoothness { frequency } => {
                self.frequency = frequency.clamp(1e-4, 0.5);
            }
            other => tracing::debug!(?other, "Ignoring settings payload for another simulation"),
        }
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

/// One smoothness slider rescaling the sampling frequency.
pub struct NoiseToolbar {
    controls: [Control; 1],
}

impl NoiseToolbar {
    pub fn new(frequency: f64) -> Self {
        Self {
            controls: [Control::new("smoothness", 0.0001, 0.5, 0.002, frequency)],
        }
    }
}

impl Toolbar for NoiseToolbar {
    fn controls(&self) -> &[Control] {
        &self.controls
    }

    fn adjust(&mut self, index: usize, steps: i32) -> Option<Settings> {
        self.controls.get_mut(index)?.nudge(steps);
        Some(Settings::NoiseSmoothness {
            frequency: self.controls[0].value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn field(seed: u64) -> NoiseField {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        NoiseField::new(&mut rng)
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = field(42);
        let b = field(42);
        for i in 0..50 {
            let x = i as f64 * 0.37;
            let y = i as f64 * 0.11;
            assert_eq!(a.perlin2(x, y), b.perlin2(x, y));
        }
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let field = field(7);
        assert_eq!(field.perlin2(3.7, 9.1), field.perlin2(3.7, 9.1));
    }

    #[test]
    fn test_values_are_bounded() {
        let field = field(11);
        for i in 0..200 {
            let x = i as f64 * 0.173;
            let y = i as f64 * 0.291;
            let v = field.fractal2(x, y, 3);
            assert!(v.is_finite());
            assert!((-1.5..=1.5).contains(&v), "value {v} out of expected band");
        }
    }

    #[test]
    fn test_noise_is_continuous() {
        let field = field(13);
        let eps = 1e-5;
        for i in 0..100 {
            let x = i as f64 * 0.41;
            let y = i as f64 * 0.17;
            let delta = (field.perlin2(x + eps, y) - field.perlin2(x, y)).abs();
            assert!(delta < 1e-3, "discontinuity at ({x}, {y}): {delta}");
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        // Corner dot products all involve zero offsets at lattice points.
        let field = field(17);
        assert_eq!(field.perlin2(4.0, 9.0), 0.0);
    }

    #[test]
    fn test_negative_coordinates_are_valid() {
        let field = field(19);
        let v = field.perlin2(-12.34, -0.56);
        assert!(v.is_finite());
    }

    #[test]
    fn test_smoothness_setting_clamps() {
        let rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = NoiseSim::new(NoiseConfig::default(), rng);
        sim.update_settings(&Settings::NoiseSmoothness { frequency: 9.0 });
        assert_eq!(sim.frequency, 0.5);
    }
}
