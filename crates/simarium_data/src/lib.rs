//! # Simarium Data
//!
//! Plain data types shared across the simarium workspace: geometry
//! primitives, colors and the gallery palette, settings payloads, and the
//! closed enumeration of simulation kinds.
//!
//! This crate contains no simulation logic. Everything here is a value type
//! that the core engines, the toolbars and the host exchange.

pub mod color;
pub mod geometry;
pub mod settings;

pub use color::{Rgba, PALETTE};
pub use geometry::{Circle, Point, Vec2};
pub use settings::{Settings, SimulationKind, TourAlgorithm};
