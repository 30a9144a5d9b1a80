//! # Simarium Core
//!
//! The core of a gallery of small real-time 2D simulations, all driven by
//! one run/stop/update lifecycle:
//! - Flocking (boids), grid pathfinding (A*), a touring-salesman heuristic,
//!   Conway's Game of Life, diffusion-limited aggregation, Sierpinski
//!   subdivision and gradient-noise terrain
//! - A raster [`surface::Surface`] abstraction the host blits to the screen
//! - An explicit [`scheduler::Scheduler`] so start/stop/dispose ordering is
//!   testable without a real clock
//! - A [`toolbar::Toolbar`] contract that turns host controls into
//!   [`simarium_data::Settings`] payloads
//!
//! ## Determinism
//!
//! Every simulation draws from its own seeded `ChaCha8Rng` stream: the
//! visible state after tick *n* is fully determined by the state after tick
//! *n-1* and the last settings update.
//!
//! ## Example
//!
//! ```
//! use simarium_core::config::GalleryConfig;
//! use simarium_core::scheduler::Gallery;
//! use simarium_data::SimulationKind;
//! use std::time::Duration;
//!
//! let mut gallery = Gallery::new(GalleryConfig::default(), 42);
//! gallery.select(SimulationKind::Life, 160, 96);
//! gallery.engine_mut().unwrap().start();
//! gallery.advance(Duration::from_millis(250));
//! ```

/// Configuration management for gallery and per-simulation parameters
pub mod config;
/// Engine lifecycle contract and the simulation factory
pub mod engine;
/// Seeded Poisson-disk sampling
pub mod poisson;
/// Logical tick scheduler and the single-engine gallery
pub mod scheduler;
/// The seven simulation modules
pub mod sims;
/// The raster drawing surface
pub mod surface;
/// Control surface (toolbar) contract
pub mod toolbar;

pub use config::GalleryConfig;
pub use engine::{Engine, Simulation};
pub use scheduler::{Gallery, Scheduler};
pub use surface::Surface;
pub use toolbar::{Control, Toolbar};

/// Initialize the tracing subscriber for logging. Safe to call more than
/// once; later calls are ignored.
pub fn init_logging() {
    use tracing_subscriber::FmtSubscriber;
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
