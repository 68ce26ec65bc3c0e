//! Entity storage and shared agent components

mod components;
mod world;

pub use components::{Body, Bounds, Vitals};
pub use world::EntityStore;
