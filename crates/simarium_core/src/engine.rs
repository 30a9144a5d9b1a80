//! Engine lifecycle contract.
//!
//! An [`Engine`] owns the drawing surface and one boxed [`Simulation`]. The
//! simulation advances by one bounded unit of work per tick and repaints;
//! the engine holds the running flag, the fixed tick period and the tick
//! accumulator the [`crate::scheduler::Scheduler`] drains.
//!
//! Everything is single-threaded and cooperative: ticks only fire inside
//! `Scheduler::advance`, so once `stop` returns no further tick can run.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use simarium_data::{Settings, SimulationKind};

use crate::config::GalleryConfig;
use crate::sims;
use crate::surface::Surface;
use crate::toolbar::Toolbar;

/// One simulation behind the common lifecycle: a single synchronous
/// initialization pass, then one bounded step plus repaint per tick.
///
/// Implementations touch nothing but their own state and the surface they
/// are handed. `init` is called exactly once, by the engine factory, before
/// the first tick.
pub trait Simulation {
    fn kind(&self) -> SimulationKind;

    /// Build initial data structures and render frame 0.
    fn init(&mut self, surface: &mut Surface);

    /// Advance the algorithm by one bounded unit of work and repaint.
    fn tick(&mut self, surface: &mut Surface);

    /// Stage a host-supplied parameter update. Takes effect no earlier than
    /// the next tick; payload variants for other simulations are ignored.
    fn update_settings(&mut self, settings: &Settings);

    /// Pointer press at surface coordinates. Only the cellular automaton
    /// reacts, and only before it starts running.
    fn pointer_down(&mut self, _surface: &mut Surface, _x: f64, _y: f64) {}

    /// Fixed tick period for this simulation, in the 10-150 ms band.
    fn tick_period(&self) -> Duration;
}

/// The active simulation engine: surface + simulation + lifecycle state.
pub struct Engine {
    surface: Surface,
    sim: Box<dyn Simulation>,
    period: Duration,
    running: bool,
    accumulator: Duration,
    ticks: u64,
}

impl Engine {
    /// Build the engine for `kind`: construct the simulation and its seeded
    /// RNG, run the single init pass (which renders frame 0), and leave the
    /// engine stopped.
    pub fn new(
        kind: SimulationKind,
        config: &GalleryConfig,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Self {
        let mut surface = Surface::new(width, height);
        let mut sim = sims::build_simulation(kind, config, seed);
        sim.init(&mut surface);
        let period = sim.tick_period();
        tracing::info!(
            kind = kind.slug(),
            width,
            height,
            seed,
            period_ms = period.as_millis() as u64,
            "Engine initialized"
        );
        Self {
            surface,
            sim,
            period,
            running: false,
            accumulator: Duration::ZERO,
            ticks: 0,
        }
    }

    pub fn kind(&self) -> SimulationKind {
        self.sim.kind()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Direct surface access for host-routed input (e.g. cell toggling).
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn simulation_mut(&mut self) -> &mut dyn Simulation {
        self.sim.as_mut()
    }

    pub fn tick_period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin periodic ticking. Idempotent.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            tracing::debug!(kind = self.sim.kind().slug(), "Engine started");
        }
    }

    /// Halt periodic ticking. Idempotent; guarantees no tick fires after
    /// this returns.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.accumulator = Duration::ZERO;
            tracing::debug!(kind = self.sim.kind().slug(), "Engine stopped");
        }
    }

    /// Advance by one tick and repaint, regardless of the running flag. The
    /// scheduler gates on `is_running`; tests and single-step controls call
    /// this directly.
    pub fn tick(&mut self) {
        self.sim.tick(&mut self.surface);
        self.ticks += 1;
    }

    pub fn update_settings(&mut self, settings: &Settings) {
        self.sim.update_settings(settings);
    }

    /// Forward a pointer press to the simulation in surface coordinates.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.sim.pointer_down(&mut self.surface, x, y);
    }

    pub(crate) fn accumulate(&mut self, elapsed: Duration) {
        self.accumulator += elapsed;
    }

    pub(crate) fn drain_one_period(&mut self) -> bool {
        if self.accumulator >= self.period {
            self.accumulator -= self.period;
            true
        } else {
            false
        }
    }
}

/// Engine plus its paired toolbar, as produced by [`build`].
pub struct EnginePair {
    pub engine: Engine,
    pub toolbar: Box<dyn Toolbar>,
}

/// Factory keyed on the closed [`SimulationKind`] enumeration.
pub fn build(
    kind: SimulationKind,
    config: &GalleryConfig,
    width: u32,
    height: u32,
    seed: u64,
) -> EnginePair {
    EnginePair {
        engine: Engine::new(kind, config, width, height, seed),
        toolbar: sims::build_toolbar(kind, config),
    }
}

/// Seed one RNG stream per simulation so switching simulations does not
/// replay the same draws.
pub(crate) fn rng_for(kind: SimulationKind, seed: u64) -> ChaCha8Rng {
    use rand::SeedableRng;
    let stream = SimulationKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(0) as u64;
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}
