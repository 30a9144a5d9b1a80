//! Configuration management for the simulation gallery.
//!
//! Strongly-typed configuration structures that map to an optional
//! `simarium.toml` file. Defaults reproduce the canonical gallery constants;
//! a config file overrides them.
//!
//! ## Example `simarium.toml`
//!
//! ```toml
//! seed = 42
//!
//! [flocking]
//! population = 300
//! max_speed = 5.0
//!
//! [pathfinding]
//! wall_density = 0.2
//! ```

use serde::{Deserialize, Serialize};

/// Flocking simulation parameters.
///
/// Radii and entity sizes are expressed as fractions of the surface diagonal
/// so the simulation is resolution-independent.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FlockingConfig {
    pub population: usize,
    pub max_force: f64,
    pub max_speed: f64,
    pub perception_frac: f64,
    pub separation_frac: f64,
    pub size_frac: f64,
    pub tick_ms: u64,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            population: 300,
            max_force: 5.0,
            max_speed: 5.0,
            perception_frac: 0.08,
            separation_frac: 0.04,
            size_frac: 0.004,
            tick_ms: 20,
        }
    }
}

/// Grid pathfinding parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PathfindingConfig {
    pub cell_frac: f64,
    pub wall_density: f64,
    /// Heuristic blend applied until the host sends a new one: 0 = Dijkstra,
    /// 1 = A*.
    pub astar_weight: f64,
    pub tick_ms: u64,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            cell_frac: 0.018,
            wall_density: 0.2,
            astar_weight: 1.0,
            tick_ms: 40,
        }
    }
}

/// Tour heuristic parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TourConfig {
    pub city_count: usize,
    pub spacing_frac: f64,
    pub margin_frac: f64,
    pub tick_ms: u64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            city_count: 50,
            spacing_frac: 0.08,
            margin_frac: 0.08,
            tick_ms: 30,
        }
    }
}

/// Cellular automaton parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LifeConfig {
    pub cell_frac: f64,
    pub tick_ms: u64,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            cell_frac: 0.014,
            tick_ms: 120,
        }
    }
}

/// Diffusion-limited aggregation parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AggregationConfig {
    pub walker_count: usize,
    pub substeps_per_tick: usize,
    pub radius_frac: f64,
    pub step_frac: f64,
    pub radius_decay: f64,
    pub min_radius: f64,
    pub target_tree_size: usize,
    pub tick_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            walker_count: 100,
            substeps_per_tick: 75,
            radius_frac: 0.008,
            step_frac: 0.008,
            radius_decay: 0.8,
            min_radius: 0.5,
            target_tree_size: 2000,
            tick_ms: 20,
        }
    }
}

/// Fractal subdivision parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FractalConfig {
    /// Subdivision stops once a child side would fall below this, which
    /// makes the iteration count proportional to surface resolution.
    pub min_side: f64,
    pub tick_ms: u64,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            min_side: 3.0,
            tick_ms: 150,
        }
    }
}

/// Noise terrain parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NoiseConfig {
    pub octaves: u32,
    pub frequency: f64,
    pub time_varying: bool,
    /// Sample-origin drift per tick when `time_varying` is set.
    pub drift: f64,
    pub tick_ms: u64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 3,
            frequency: 0.04,
            time_varying: true,
            drift: 0.35,
            tick_ms: 50,
        }
    }
}

/// Top-level gallery configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GalleryConfig {
    /// Seed for every simulation's RNG. `None` lets the host pick one.
    pub seed: Option<u64>,
    pub flocking: FlockingConfig,
    pub pathfinding: PathfindingConfig,
    pub tour: TourConfig,
    pub life: LifeConfig,
    pub aggregation: AggregationConfig,
    pub fractal: FractalConfig,
    pub noise: NoiseConfig,
}

impl GalleryConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` describing the
    /// first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        let tick_range = |name: &str, ms: u64| {
            anyhow::ensure!(
                (10..=150).contains(&ms),
                "{name} tick period must be in [10, 150] ms"
            );
            Ok(())
        };
        tick_range("flocking", self.flocking.tick_ms)?;
        tick_range("pathfinding", self.pathfinding.tick_ms)?;
        tick_range("tour", self.tour.tick_ms)?;
        tick_range("life", self.life.tick_ms)?;
        tick_range("aggregation", self.aggregation.tick_ms)?;
        tick_range("fractal", self.fractal.tick_ms)?;
        tick_range("noise", self.noise.tick_ms)?;

        anyhow::ensure!(
            self.flocking.population > 0,
            "Flocking population must be positive"
        );
        anyhow::ensure!(
            self.flocking.population <= 10_000,
            "Flocking population too large (max 10000)"
        );
        anyhow::ensure!(
            self.flocking.max_speed > 0.0,
            "Flocking max speed must be positive"
        );
        anyhow::ensure!(
            self.flocking.max_force > 0.0,
            "Flocking max force must be positive"
        );
        anyhow::ensure!(
            self.flocking.separation_frac <= self.flocking.perception_frac,
            "Separation radius must not exceed perception radius"
        );

        anyhow::ensure!(
            self.pathfinding.cell_frac > 0.0,
            "Pathfinding cell size must be positive"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.pathfinding.wall_density),
            "Wall density must be in [0.0, 1.0)"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.pathfinding.astar_weight),
            "Heuristic blend must be in [0.0, 1.0]"
        );

        anyhow::ensure!(self.tour.city_count >= 2, "Tour needs at least 2 cities");
        anyhow::ensure!(
            self.tour.city_count <= 500,
            "Tour city count too large (max 500)"
        );
        anyhow::ensure!(
            self.tour.spacing_frac > 0.0,
            "Tour city spacing must be positive"
        );

        anyhow::ensure!(self.life.cell_frac > 0.0, "Life cell size must be positive");

        anyhow::ensure!(
            self.aggregation.walker_count > 0,
            "Aggregation walker pool must be positive"
        );
        anyhow::ensure!(
            self.aggregation.substeps_per_tick > 0,
            "Aggregation substeps must be positive"
        );
        anyhow::ensure!(
            self.aggregation.radius_decay > 0.0 && self.aggregation.radius_decay <= 1.0,
            "Radius decay must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.aggregation.target_tree_size > 1,
            "Aggregation target tree size must exceed the seed"
        );

        anyhow::ensure!(
            self.fractal.min_side >= 1.0,
            "Fractal minimum side must be at least 1 pixel"
        );

        anyhow::ensure!(self.noise.octaves >= 1, "Noise needs at least one octave");
        anyhow::ensure!(self.noise.octaves <= 8, "Noise octave count too large (max 8)");
        anyhow::ensure!(
            self.noise.frequency > 0.0 && self.noise.frequency <= 0.5,
            "Noise frequency must be in (0.0, 0.5]"
        );

        Ok(())
    }

    /// Loads and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable digest of the algorithmic parameters, for reproducibility
    /// reporting alongside the seed.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.flocking).as_bytes());
        hasher.update(format!("{:?}", self.pathfinding).as_bytes());
        hasher.update(format!("{:?}", self.tour).as_bytes());
        hasher.update(format!("{:?}", self.life).as_bytes());
        hasher.update(format!("{:?}", self.aggregation).as_bytes());
        hasher.update(format!("{:?}", self.fractal).as_bytes());
        hasher.update(format!("{:?}", self.noise).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = GalleryConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_tick_period() {
        let config = GalleryConfig {
            flocking: FlockingConfig {
                tick_ms: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_wall_density() {
        let config = GalleryConfig {
            pathfinding: PathfindingConfig {
                wall_density: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_separation_radius_bounded_by_perception() {
        let config = GalleryConfig {
            flocking: FlockingConfig {
                perception_frac: 0.02,
                separation_frac: 0.04,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = GalleryConfig::from_toml(
            r#"
            seed = 7

            [flocking]
            population = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.flocking.population, 50);
        // Untouched sections keep their defaults.
        assert_eq!(config.tour.city_count, 50);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(GalleryConfig::from_toml("[noise]\noctaves = 0\n").is_err());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = GalleryConfig::default();
        let config2 = GalleryConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
    }
}
