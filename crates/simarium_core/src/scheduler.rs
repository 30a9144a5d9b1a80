//! The logical tick scheduler and the gallery that owns the active engine.
//!
//! One logical clock drives one active engine at a time. The host measures
//! real elapsed time and feeds it into [`Scheduler::advance`]; the scheduler
//! converts it into zero or more ticks of the active engine. Because ticks
//! only ever fire here, `Engine::stop` trivially guarantees that no tick
//! runs after it returns, and there is no timer handle to leak.

use std::time::Duration;

use simarium_data::SimulationKind;

use crate::config::GalleryConfig;
use crate::engine::{build, Engine, EnginePair};
use crate::toolbar::Toolbar;

/// Upper bound on ticks fired per `advance` call. A host that stalls (say,
/// a suspended terminal) resumes with a bounded burst instead of replaying
/// the whole gap.
const MAX_TICKS_PER_ADVANCE: u32 = 8;

/// Converts elapsed wall time into engine ticks.
#[derive(Debug, Default)]
pub struct Scheduler {
    logical_time: Duration,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total logical time this scheduler has observed.
    pub fn logical_time(&self) -> Duration {
        self.logical_time
    }

    /// Feed `elapsed` real time to the engine; fires due ticks. Returns the
    /// number of ticks fired. A stopped engine accumulates nothing and
    /// fires nothing.
    pub fn advance(&mut self, engine: &mut Engine, elapsed: Duration) -> u32 {
        self.logical_time += elapsed;
        if !engine.is_running() {
            return 0;
        }
        engine.accumulate(elapsed);
        let mut fired = 0;
        while fired < MAX_TICKS_PER_ADVANCE && engine.drain_one_period() {
            engine.tick();
            fired += 1;
        }
        fired
    }
}

/// The gallery: configuration, scheduler, and at most one live engine with
/// its toolbar. Selecting a simulation always stops and discards the
/// previous engine before the next one touches a surface.
pub struct Gallery {
    config: GalleryConfig,
    seed: u64,
    scheduler: Scheduler,
    active: Option<EnginePair>,
}

impl Gallery {
    pub fn new(config: GalleryConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            scheduler: Scheduler::new(),
            active: None,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Replace the active simulation. The outgoing engine is stopped before
    /// disposal so its surface can never be touched again.
    pub fn select(&mut self, kind: SimulationKind, width: u32, height: u32) {
        if let Some(pair) = self.active.as_mut() {
            pair.engine.stop();
        }
        self.active = Some(build(kind, &self.config, width, height, self.seed));
    }

    /// Stop and discard the active engine.
    pub fn close(&mut self) {
        if let Some(pair) = self.active.as_mut() {
            pair.engine.stop();
        }
        self.active = None;
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.active.as_ref().map(|p| &p.engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut Engine> {
        self.active.as_mut().map(|p| &mut p.engine)
    }

    pub fn toolbar_mut(&mut self) -> Option<&mut (dyn Toolbar + 'static)> {
        self.active.as_mut().map(|p| p.toolbar.as_mut())
    }

    /// Toolbar and engine together, for forwarding control changes.
    pub fn parts_mut(&mut self) -> Option<(&mut Engine, &mut (dyn Toolbar + 'static))> {
        self.active
            .as_mut()
            .map(|p| (&mut p.engine, p.toolbar.as_mut()))
    }

    /// Drive the active engine with elapsed real time.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        match self.active.as_mut() {
            Some(pair) => self.scheduler.advance(&mut pair.engine, elapsed),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractal_engine() -> Engine {
        Engine::new(
            SimulationKind::Fractal,
            &GalleryConfig::default(),
            64,
            64,
            1,
        )
    }

    #[test]
    fn test_stopped_engine_never_ticks() {
        let mut scheduler = Scheduler::new();
        let mut engine = fractal_engine();
        assert_eq!(scheduler.advance(&mut engine, Duration::from_secs(5)), 0);
        assert_eq!(engine.ticks(), 0);
    }

    #[test]
    fn test_advance_fires_due_ticks() {
        let mut scheduler = Scheduler::new();
        let mut engine = fractal_engine();
        engine.start();
        let period = engine.tick_period();
        let fired = scheduler.advance(&mut engine, period * 3);
        assert_eq!(fired, 3);
        assert_eq!(engine.ticks(), 3);
    }

    #[test]
    fn test_advance_burst_is_bounded() {
        let mut scheduler = Scheduler::new();
        let mut engine = fractal_engine();
        engine.start();
        let period = engine.tick_period();
        let fired = scheduler.advance(&mut engine, period * 1000);
        assert_eq!(fired, MAX_TICKS_PER_ADVANCE);
    }

    #[test]
    fn test_no_tick_after_stop() {
        let mut scheduler = Scheduler::new();
        let mut engine = fractal_engine();
        engine.start();
        let period = engine.tick_period();
        scheduler.advance(&mut engine, period);
        let before = engine.ticks();
        engine.stop();
        scheduler.advance(&mut engine, Duration::from_secs(10));
        assert_eq!(engine.ticks(), before);
    }

    #[test]
    fn test_gallery_select_replaces_engine() {
        let mut gallery = Gallery::new(GalleryConfig::default(), 1);
        gallery.select(SimulationKind::Fractal, 64, 64);
        gallery.engine_mut().unwrap().start();
        gallery.select(SimulationKind::Life, 64, 64);
        let engine = gallery.engine().unwrap();
        assert_eq!(engine.kind(), SimulationKind::Life);
        // A fresh selection starts stopped.
        assert!(!engine.is_running());
    }
}
