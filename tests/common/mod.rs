use simarium_core::config::{
    AggregationConfig, FlockingConfig, GalleryConfig, LifeConfig, PathfindingConfig, TourConfig,
};
use simarium_core::engine::Engine;
use simarium_data::SimulationKind;

/// Gallery configuration scaled down so integration tests stay fast while
/// exercising the same code paths as the defaults.
#[allow(dead_code)]
pub fn test_config() -> GalleryConfig {
    GalleryConfig {
        seed: Some(1234),
        flocking: FlockingConfig {
            population: 60,
            ..Default::default()
        },
        pathfinding: PathfindingConfig {
            wall_density: 0.1,
            ..Default::default()
        },
        tour: TourConfig {
            city_count: 16,
            ..Default::default()
        },
        life: LifeConfig::default(),
        aggregation: AggregationConfig {
            walker_count: 30,
            substeps_per_tick: 40,
            target_tree_size: 50,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Build a stopped engine on a small surface with the test configuration.
#[allow(dead_code)]
pub fn engine_for(kind: SimulationKind, seed: u64) -> Engine {
    Engine::new(kind, &test_config(), 160, 100, seed)
}
