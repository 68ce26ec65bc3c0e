//! Player-controlled guardian
//!
//! The guardian walks wherever it is told: a command plans a path to the
//! target tile and each tick consumes waypoints at a fixed speed. Predators
//! sense its position to decide between fleeing and attacking; a landed
//! attack sets the hit cooldown and knocks it back.

use glam::{IVec2, Vec2};

use crate::ai::pathfinding::{self, Grid};
use crate::ai::steering;

/// Movement speed in world units per second
pub const GUARDIAN_SPEED: f32 = 170.0;

/// Distance at which a waypoint counts as reached
const WAYPOINT_RADIUS: f32 = 5.0;

/// Seconds the hit marker stays up after a predator lands an attack
pub const HIT_FLASH_DURATION: f32 = 1.0;

/// The player's avatar and the predators' deterrence target
#[derive(Debug, Clone)]
pub struct Guardian {
    pub position: Vec2,
    pub path: Vec<IVec2>,
    /// Counts down after a predator hit; renderers flash while positive
    pub hit_timer: f32,
}

impl Guardian {
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            path: Vec::new(),
            hit_timer: 0.0,
        }
    }

    /// Command the guardian to walk to the tile containing `target`.
    /// Unwalkable targets are ignored and any current path is kept.
    pub fn command(&mut self, grid: &Grid, target: Vec2) {
        let goal = grid.position_to_tile(target);
        if grid.is_walkable(goal) {
            let start = grid.position_to_tile(self.position);
            self.path = pathfinding::find_path(grid, start, goal);
        }
    }

    /// Register a landed predator attack
    pub fn take_hit(&mut self) {
        self.hit_timer = HIT_FLASH_DURATION;
        self.path.clear();
    }

    /// Advance along the current path and decay the hit timer
    pub fn update(&mut self, grid: &Grid, dt: f32) {
        if self.hit_timer > 0.0 {
            self.hit_timer = (self.hit_timer - dt).max(0.0);
        }

        if let Some(&next) = self.path.first() {
            let waypoint = grid.tile_to_position(next);
            if self.position.distance(waypoint) < WAYPOINT_RADIUS {
                self.path.remove(0);
            } else {
                let direction = steering::seek(self.position, waypoint);
                self.position += direction * GUARDIAN_SPEED * dt;
            }
        }
    }

    /// Re-plan toward the current goal after the grid changed; the path is
    /// dropped if the goal became unwalkable.
    pub fn replan(&mut self, grid: &Grid) {
        let Some(&goal) = self.path.last() else {
            return;
        };
        if grid.is_walkable(goal) {
            let start = grid.position_to_tile(self.position);
            self.path = pathfinding::find_path(grid, start, goal);
        } else {
            self.path.clear();
        }
    }
}
