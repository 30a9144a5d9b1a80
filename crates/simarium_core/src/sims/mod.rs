//! The gallery's simulation modules and the factory that pairs each
//! [`SimulationKind`] with its engine and toolbar.

use simarium_data::SimulationKind;

use crate::config::GalleryConfig;
use crate::engine::{rng_for, Simulation};
use crate::toolbar::{EmptyToolbar, Toolbar};

pub mod boids;
pub mod dla;
pub mod fractal;
pub mod life;
pub mod noise;
pub mod paths;
pub mod tour;

/// Construct the simulation for `kind` with its own seeded RNG stream.
pub(crate) fn build_simulation(
    kind: SimulationKind,
    config: &GalleryConfig,
    seed: u64,
) -> Box<dyn Simulation> {
    let rng = rng_for(kind, seed);
    match kind {
        SimulationKind::Flocking => Box::new(boids::FlockingSim::new(config.flocking.clone(), rng)),
        SimulationKind::Pathfinding => {
            Box::new(paths::PathfindingSim::new(config.pathfinding.clone(), rng))
        }
        SimulationKind::Tour => Box::new(tour::TourSim::new(config.tour.clone(), rng)),
        SimulationKind::Life => Box::new(life::LifeSim::new(config.life.clone())),
        SimulationKind::Aggregation => Box::new(dla::DlaSim::new(config.aggregation.clone(), rng)),
        SimulationKind::Fractal => Box::new(fractal::FractalSim::new(config.fractal.clone())),
        SimulationKind::Noise => Box::new(noise::NoiseSim::new(config.noise.clone(), rng)),
    }
}

/// Construct the toolbar paired with `kind`.
pub(crate) fn build_toolbar(kind: SimulationKind, config: &GalleryConfig) -> Box<dyn Toolbar> {
    match kind {
        SimulationKind::Flocking => Box::new(boids::FlockingToolbar::new()),
        SimulationKind::Pathfinding => {
            Box::new(paths::PathfindingToolbar::new(config.pathfinding.astar_weight))
        }
        SimulationKind::Life => Box::new(life::LifeToolbar::new()),
        SimulationKind::Noise => Box::new(noise::NoiseToolbar::new(config.noise.frequency)),
        SimulationKind::Tour | SimulationKind::Aggregation | SimulationKind::Fractal => {
            Box::new(EmptyToolbar)
        }
    }
}
