//! Settings payloads and the closed enumeration of simulation kinds.
//!
//! The toolbar builds `Settings` values and the host forwards them into the
//! active engine. The payload shape varies per simulation; an engine silently
//! ignores variants that are not addressed to it.

use serde::{Deserialize, Serialize};

/// The gallery's simulations. Engines and toolbars are constructed from this
/// enum by the factory, never from string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationKind {
    Flocking,
    Pathfinding,
    Tour,
    Life,
    Aggregation,
    Fractal,
    Noise,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 7] = [
        SimulationKind::Flocking,
        SimulationKind::Pathfinding,
        SimulationKind::Tour,
        SimulationKind::Life,
        SimulationKind::Aggregation,
        SimulationKind::Fractal,
        SimulationKind::Noise,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SimulationKind::Flocking => "Flocking (boids)",
            SimulationKind::Pathfinding => "Shortest paths (A*)",
            SimulationKind::Tour => "Touring salesman (MST + 2-opt)",
            SimulationKind::Life => "Game of Life",
            SimulationKind::Aggregation => "Diffusion-limited aggregation",
            SimulationKind::Fractal => "Sierpinski fractal",
            SimulationKind::Noise => "Noise terrain",
        }
    }

    /// Stable identifier used by the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            SimulationKind::Flocking => "flocking",
            SimulationKind::Pathfinding => "paths",
            SimulationKind::Tour => "tour",
            SimulationKind::Life => "life",
            SimulationKind::Aggregation => "dla",
            SimulationKind::Fractal => "fractal",
            SimulationKind::Noise => "noise",
        }
    }
}

impl std::str::FromStr for SimulationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimulationKind::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("unknown simulation '{s}'"))
    }
}

/// Tour-improvement algorithm selection. A closed enum so new heuristics are
/// added here rather than matched on free-form names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TourAlgorithm {
    /// Prim MST, preorder walk, then randomized 2-opt improvement.
    #[default]
    MstTwoOpt,
}

/// A host-supplied parameter update. Takes effect no earlier than the next
/// tick of the receiving engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Settings {
    /// Steering weights for the flocking simulation, default 1.0 each.
    Flocking {
        cohesion: f64,
        alignment: f64,
        separation: f64,
    },
    /// Heuristic blend for pathfinding: 0 = Dijkstra, 1 = A*.
    PathBlend { astar_weight: f64 },
    /// Tour-improvement algorithm selection.
    TourAlgorithm(TourAlgorithm),
    /// Run-length-encoded seed pattern; resets the whole automaton.
    LifePattern { rle: String },
    /// Sparse live-cell seed; resets the whole automaton.
    LifeCells { cells: Vec<(i32, i32)> },
    /// Base sampling frequency for the noise terrain.
    NoiseSmoothness { frequency: f64 },
}
