//! A predator-prey-forager ecosystem simulation on a tile grid
//!
//! This crate provides:
//! - A* pathfinding over a mutable walkability grid
//! - Per-agent behavioral state machines (herbivores, predators, guardian)
//! - A deterministic, tick-driven world orchestrator with a query surface
//!   for external renderers and editors

pub mod ai;
pub mod core;
pub mod ecs;
pub mod sim;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        Grid, Guardian, HerbivoreBrain, HerbivoreState, PredatorBrain, PredatorState, find_path,
    };
    pub use crate::core::{EventQueue, SimConfig, SimEvent, Time};
    pub use crate::ecs::{Body, Bounds, EntityStore, Vitals};
    pub use crate::sim::{Byproduct, Ecology, Selection, Vegetation, VegetationState, World};
    pub use glam::{IVec2, Vec2};
}
