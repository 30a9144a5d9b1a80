//! Simarium host library: the terminal front end that owns the real clock
//! and drives the gallery core. All algorithmic logic lives in
//! `simarium_core`; this crate only builds the surface, routes input into
//! the toolbar, and blits frames to the terminal.

pub mod app;
