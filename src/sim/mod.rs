//! Simulation module
//!
//! The vegetation ecology and the world orchestrator that drives the
//! per-tick pipeline.

pub(crate) mod ecology;
mod world;

pub use ecology::{BYPRODUCT_DURATION, Byproduct, DORMANT_AGE, Ecology, Vegetation, VegetationState};
pub use world::{Selection, TILE_SIZE, World};
