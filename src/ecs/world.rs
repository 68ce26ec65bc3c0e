//! Entity store wrapper around hecs
//!
//! Agents reference each other through `hecs::Entity` handles; the generation
//! counter baked into a handle means a despawned agent can never be resolved
//! again, so stale reproduction partners and hunt targets degrade to `None`
//! instead of dangling.

use hecs::{Component, DynamicBundle, Entity, Query, QueryBorrow};

/// Simulation entity store containing every herbivore and predator
#[derive(Default)]
pub struct EntityStore {
    inner: hecs::World,
}

impl EntityStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity; unknown handles are ignored
    pub fn despawn(&mut self, entity: Entity) {
        let _ = self.inner.despawn(entity);
    }

    /// Check whether a handle still resolves to a live entity
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Copy a component out of an entity.
    ///
    /// Agent updates work on copies and write back when done, so no component
    /// borrow is held while the rest of the world is inspected or mutated.
    #[must_use]
    pub fn cloned<T: Component + Clone>(&self, entity: Entity) -> Option<T> {
        self.inner.get::<&T>(entity).ok().map(|c| (*c).clone())
    }

    /// Write a component back onto an entity; unknown handles are ignored
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) {
        if let Ok(mut slot) = self.inner.get::<&mut T>(entity) {
            *slot = value;
        }
    }

    /// Query for entities with specific components
    pub fn query<Q: Query>(&self) -> QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Entities carrying component `T`, in stable handle order.
    ///
    /// The update pipeline iterates this snapshot so the phase order is
    /// deterministic and unaffected by spawns or despawns mid-phase.
    #[must_use]
    pub fn collect_sorted<T: Component>(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .inner
            .query::<&T>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        entities.sort_unstable_by_key(|e| e.to_bits());
        entities
    }

    /// Number of live entities
    #[must_use]
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Whether the store holds no entities
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Body;
    use glam::Vec2;

    #[test]
    fn test_cloned_and_set_round_trip() {
        let mut store = EntityStore::new();
        let entity = store.spawn((Body::new(Vec2::ZERO, 1.0),));

        let mut body: Body = store.cloned(entity).expect("component present");
        body.position = Vec2::new(4.0, 2.0);
        store.set(entity, body);

        let read: Body = store.cloned(entity).expect("component present");
        assert_eq!(read.position, Vec2::new(4.0, 2.0));
    }

    #[test]
    fn test_stale_handle_degrades_gracefully() {
        let mut store = EntityStore::new();
        let entity = store.spawn((Body::new(Vec2::ZERO, 1.0),));
        store.despawn(entity);

        assert!(!store.contains(entity));
        assert!(store.cloned::<Body>(entity).is_none());
        // Writing through a stale handle is a no-op, not a panic
        store.set(entity, Body::new(Vec2::ONE, 1.0));
    }

    #[test]
    fn test_collect_sorted_is_stable() {
        let mut store = EntityStore::new();
        let a = store.spawn((Body::new(Vec2::ZERO, 1.0),));
        let b = store.spawn((Body::new(Vec2::ONE, 1.0),));
        let c = store.spawn((Body::new(Vec2::ONE, 2.0),));

        let mut expected = vec![a, b, c];
        expected.sort_unstable_by_key(|e| e.to_bits());
        assert_eq!(store.collect_sorted::<Body>(), expected);

        store.despawn(b);
        let remaining = store.collect_sorted::<Body>();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&b));
    }
}
