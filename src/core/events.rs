//! Simulation event stream for external collaborators
//!
//! The core never calls out to renderers or audio directly; it records what
//! happened as typed events in a double-buffered queue. Events pushed during
//! tick N become readable after the swap at the start of tick N+1, so
//! consumers always see a frame-consistent batch regardless of which pipeline
//! phase produced an event.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use hecs::Entity;

/// Things that happened in the simulation, for consumers to react to
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SimEvent {
    /// A reproduction pairing consummated and spawned offspring.
    HerbivoreBorn {
        /// The newborn
        entity: Entity,
        /// Spawn position (midpoint of the parents)
        position: Vec2,
    },

    /// A predator caught and removed a herbivore.
    HerbivoreKilled {
        /// The removed prey (handle is already stale)
        prey: Entity,
        /// The predator that made the kill
        predator: Entity,
    },

    /// A herbivore's health was drained to zero by hunger.
    HerbivoreStarved { entity: Entity },

    /// A predator's health was drained to zero by hunger.
    PredatorStarved { entity: Entity },

    /// A predator landed an attack on the guardian.
    GuardianHit { predator: Entity },

    /// A herbivore finished eating the vegetation on a tile.
    VegetationGrazed { tile: IVec2 },

    /// A byproduct seeded its neighboring tiles.
    ByproductSpread { tile: IVec2 },
}

/// Double-buffered event queue for tick-consistent event processing.
#[derive(Debug, Default)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<SimEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<SimEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: SimEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues. Called once per tick at the
    /// start of the world update.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.processing.iter()
    }

    /// Whether the previous tick produced no events
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Drop all events, pending and processing
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_become_visible_after_swap() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::VegetationGrazed {
            tile: IVec2::new(2, 3),
        });
        assert!(queue.is_empty(), "events must not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert!(matches!(
            queue.iter().next(),
            Some(SimEvent::VegetationGrazed { tile }) if *tile == IVec2::new(2, 3)
        ));
    }

    #[test]
    fn test_double_buffer_isolation() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::ByproductSpread {
            tile: IVec2::new(0, 0),
        });
        queue.swap();

        // Written mid-tick: must not appear until the next swap
        queue.push(SimEvent::ByproductSpread {
            tile: IVec2::new(5, 5),
        });
        assert_eq!(queue.len(), 1);

        queue.swap();
        let tiles: Vec<IVec2> = queue
            .iter()
            .map(|e| match e {
                SimEvent::ByproductSpread { tile } => *tile,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(tiles, vec![IVec2::new(5, 5)]);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::VegetationGrazed { tile: IVec2::ZERO });
        queue.swap();
        queue.push(SimEvent::VegetationGrazed { tile: IVec2::ONE });

        queue.clear();
        queue.swap();
        assert!(queue.is_empty());
    }
}
