//! AI and navigation module
//!
//! Pathfinding over the tile grid, steering helpers, state machine plumbing,
//! and the per-agent behaviors for herbivores, predators and the guardian.

mod fsm;
mod guardian;
pub(crate) mod herbivore;
mod pathfinding;
pub(crate) mod predator;
mod steering;

pub use fsm::{Transition, UpdateGate};
pub use guardian::{GUARDIAN_SPEED, Guardian};
pub use herbivore::{
    HERBIVORE_MAX_HEALTH, HerbivoreBrain, HerbivoreState, REPRODUCE_HEALTH_THRESHOLD,
    REPRODUCTION_COOLDOWN,
};
pub use pathfinding::{Grid, find_path};
pub use predator::{PREDATOR_MAX_HEALTH, PredatorBrain, PredatorState};
pub use steering::{Roam, flee, random_direction, seek};
