//! World orchestrator
//!
//! Owns the grid, the ecology, every entity collection and the guardian, and
//! drives the fixed per-tick pipeline:
//!
//! event swap → ecology → predators (+ containment) → herbivores
//! (+ containment) → byproducts → prune → guardian
//!
//! Pruning runs once per tick after all behavior updates so no agent ever
//! observes a partially-pruned collection mid-tick. The one exception is a
//! predator kill, which removes its prey immediately; every other agent
//! re-validates its handles before use, so the removal is safe.

use glam::{IVec2, Vec2};
use hecs::Entity;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::herbivore::{self, HerbivoreBrain, HerbivoreState};
use crate::ai::predator::{self, PredatorBrain, PredatorState};
use crate::ai::{Grid, Guardian, random_direction};
use crate::core::{EventQueue, SimConfig, SimEvent};
use crate::ecs::{Body, Bounds, EntityStore, Vitals};
use crate::sim::ecology::{Byproduct, Ecology, VegetationState};

/// Tile edge length in world units
pub const TILE_SIZE: f32 = 32.0;

/// Tiles of viewport margin left around the grid
const TILE_PADDING_X: i32 = 3;
const TILE_PADDING_Y: i32 = 2;

/// Pick radius used when selecting the guardian
const GUARDIAN_SELECT_RADIUS: f32 = 25.0;

/// Debug selection handle returned by [`World::select_at`].
///
/// Inspection only; the simulation logic never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Herbivore(Entity),
    Predator(Entity),
    Guardian,
}

/// The simulation world
pub struct World {
    pub(crate) grid: Grid,
    pub(crate) ecology: Ecology,
    pub(crate) entities: EntityStore,
    pub(crate) byproducts: Vec<Byproduct>,
    pub(crate) guardian: Guardian,
    pub(crate) bounds: Bounds,
    pub(crate) events: EventQueue,
    pub(crate) rng: ChaCha8Rng,
    selected: Option<Selection>,
    running: bool,
}

impl World {
    /// Build a world from a config: centered padded tile grid, randomly
    /// germinated vegetation, scattered starting populations, guardian in
    /// the middle.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let tile = TILE_SIZE as i32;
        let columns = (config.width as i32 / tile - TILE_PADDING_X).max(1);
        let rows = (config.height as i32 / tile - TILE_PADDING_Y).max(1);
        let origin = Vec2::new(
            ((config.width as i32 - columns * tile) / 2) as f32,
            ((config.height as i32 - rows * tile) / 2) as f32,
        );

        let grid = Grid::with_origin(columns, rows, TILE_SIZE, origin);
        let bounds = Bounds::new(
            origin,
            Vec2::new(columns as f32 * TILE_SIZE, rows as f32 * TILE_SIZE),
        );

        let mut ecology = Ecology::new(columns, rows);
        ecology.seed_random(&mut rng, config.vegetation_chance);

        let guardian = Guardian::new(bounds.center());

        let mut world = Self {
            grid,
            ecology,
            entities: EntityStore::new(),
            byproducts: Vec::new(),
            guardian,
            bounds,
            events: EventQueue::new(),
            rng,
            selected: None,
            running: true,
        };

        for _ in 0..config.herbivores {
            let position = world.random_position();
            let entity = world.spawn_herbivore(position);
            let direction = random_direction(&mut world.rng);
            if let Some(mut body) = world.entities.cloned::<Body>(entity) {
                body.direction = direction;
                world.entities.set(entity, body);
            }
        }
        for _ in 0..config.predators {
            let position = world.random_position();
            world.spawn_predator(position);
        }

        log::info!(
            "world initialized: {columns}x{rows} tiles, {} herbivores, {} predators, seed {}",
            config.herbivores,
            config.predators,
            config.seed,
        );
        world
    }

    /// A uniformly random position inside the world bounds
    pub fn random_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(self.bounds.min.x..=self.bounds.max.x),
            self.rng.gen_range(self.bounds.min.y..=self.bounds.max.y),
        )
    }

    /// Spawn a herbivore at a position
    pub fn spawn_herbivore(&mut self, position: Vec2) -> Entity {
        herbivore::spawn(self, position)
    }

    /// Spawn a predator at a position
    pub fn spawn_predator(&mut self, position: Vec2) -> Entity {
        predator::spawn(self, position)
    }

    /// Tear the world down
    pub fn shut(&mut self) {
        self.entities.clear();
        self.byproducts.clear();
        self.events.clear();
        self.selected = None;
        self.running = false;
    }

    /// Ask the world to stop; the current tick still completes
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one simulation tick. Returns false once the world has stopped.
    pub fn update(&mut self, dt: f32) -> bool {
        self.events.swap();

        self.ecology.update(dt);

        // Predators act before herbivores: a kill this tick removes prey the
        // herbivore phase must never observe.
        for entity in self.entities.collect_sorted::<PredatorBrain>() {
            predator::update(self, entity, dt);
            self.contain(entity);
        }

        for entity in self.entities.collect_sorted::<HerbivoreBrain>() {
            if !self.entities.contains(entity) {
                continue; // killed earlier this tick
            }
            herbivore::update(self, entity, dt);
            self.contain(entity);
        }

        for byproduct in &mut self.byproducts {
            if byproduct.update(dt, &self.grid, &mut self.ecology) {
                self.events.push(SimEvent::ByproductSpread {
                    tile: self.grid.position_to_tile(byproduct.position),
                });
            }
        }

        self.prune();

        self.guardian.update(&self.grid, dt);

        self.running
    }

    fn contain(&mut self, entity: Entity) {
        if let Some(mut body) = self.entities.cloned::<Body>(entity) {
            self.bounds.contain(&mut body);
            self.entities.set(entity, body);
        }
    }

    /// Single removal pass at the end of the tick
    fn prune(&mut self) {
        let mut dead: Vec<Entity> = Vec::new();
        for (entity, brain) in self.entities.query::<&PredatorBrain>().iter() {
            if matches!(brain.state, PredatorState::Dead) {
                dead.push(entity);
            }
        }
        for (entity, brain) in self.entities.query::<&HerbivoreBrain>().iter() {
            if matches!(brain.state, HerbivoreState::Dead) {
                dead.push(entity);
            }
        }
        for entity in dead {
            if matches!(
                self.selected,
                Some(Selection::Herbivore(e) | Selection::Predator(e)) if e == entity
            ) {
                self.selected = None;
            }
            self.entities.despawn(entity);
        }

        self.byproducts.retain(|b| b.active);
    }

    // --- coordinate queries -------------------------------------------------

    #[must_use]
    pub fn is_valid_coord(&self, coord: IVec2) -> bool {
        self.grid.is_valid_coord(coord)
    }

    #[must_use]
    pub fn is_walkable(&self, coord: IVec2) -> bool {
        self.grid.is_walkable(coord)
    }

    #[must_use]
    pub fn has_vegetation_at(&self, coord: IVec2) -> bool {
        self.ecology.has_live_at(coord)
    }

    #[must_use]
    pub fn position_to_tile(&self, position: Vec2) -> IVec2 {
        self.grid.position_to_tile(position)
    }

    #[must_use]
    pub fn tile_to_position(&self, coord: IVec2) -> Vec2 {
        self.grid.tile_to_position(coord)
    }

    /// Tile of the nearest live vegetation, if any exists
    #[must_use]
    pub fn nearest_live_vegetation(&self, from: IVec2) -> Option<IVec2> {
        self.ecology.nearest_live(from)
    }

    /// Tile of the nearest live herbivore, if any exists
    #[must_use]
    pub fn nearest_live_herbivore(&self, from: IVec2) -> Option<IVec2> {
        let mut best: Option<(IVec2, f32)> = None;
        for (_, (body, brain)) in self.entities.query::<(&Body, &HerbivoreBrain)>().iter() {
            if matches!(brain.state, HerbivoreState::Dead) {
                continue;
            }
            let coord = self.grid.position_to_tile(body.position);
            let distance = (coord - from).as_vec2().length_squared();
            if best.is_none_or(|(_, b)| distance < b) {
                best = Some((coord, distance));
            }
        }
        best.map(|(coord, _)| coord)
    }

    // --- editor mutation points ---------------------------------------------

    /// Editor: change a tile's walkability and re-route every agent
    pub fn set_walkable(&mut self, coord: IVec2, walkable: bool) {
        self.grid.set_walkable(coord, walkable);
        self.invalidate_paths();
    }

    /// Editor: overwrite a tile's vegetation state and age
    pub fn set_vegetation(&mut self, coord: IVec2, state: VegetationState, age: f32) {
        self.ecology.set_vegetation(coord, state, age);
        self.invalidate_paths();
    }

    /// Editor: return a tile to bare ground
    pub fn clear_vegetation(&mut self, coord: IVec2) {
        self.ecology.clear_vegetation(coord);
        self.invalidate_paths();
    }

    /// Recompute every agent's route against the current grid
    fn invalidate_paths(&mut self) {
        for entity in self.entities.collect_sorted::<HerbivoreBrain>() {
            herbivore::recalculate_path(self, entity);
        }
        for entity in self.entities.collect_sorted::<PredatorBrain>() {
            predator::recalculate_path(self, entity);
        }
        self.guardian.replan(&self.grid);
    }

    /// Command the guardian to walk to the tile under `target`
    pub fn command_guardian(&mut self, target: Vec2) {
        self.guardian.command(&self.grid, target);
    }

    // --- debug/selection ----------------------------------------------------

    /// Nearest qualifying agent under a world position, for debug display
    pub fn select_at(&mut self, position: Vec2, tolerance: f32) -> Option<Selection> {
        self.selected = None;

        for entity in self.entities.collect_sorted::<HerbivoreBrain>() {
            if let Some(body) = self.entities.cloned::<Body>(entity) {
                if position.distance(body.position) < body.radius + tolerance {
                    self.selected = Some(Selection::Herbivore(entity));
                    return self.selected;
                }
            }
        }
        for entity in self.entities.collect_sorted::<PredatorBrain>() {
            if let Some(body) = self.entities.cloned::<Body>(entity) {
                if position.distance(body.position) < body.radius + tolerance {
                    self.selected = Some(Selection::Predator(entity));
                    return self.selected;
                }
            }
        }
        if position.distance(self.guardian.position) < GUARDIAN_SELECT_RADIUS + tolerance {
            self.selected = Some(Selection::Guardian);
            return self.selected;
        }
        None
    }

    /// Current selection; a handle whose entity despawned reads as `None`
    #[must_use]
    pub fn selected(&self) -> Option<Selection> {
        match self.selected {
            Some(Selection::Herbivore(e) | Selection::Predator(e))
                if !self.entities.contains(e) =>
            {
                None
            }
            selected => selected,
        }
    }

    // --- read accessors for collaborators -----------------------------------

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn vegetation(&self) -> &Ecology {
        &self.ecology
    }

    #[must_use]
    pub fn byproducts(&self) -> &[Byproduct] {
        &self.byproducts
    }

    #[must_use]
    pub fn guardian(&self) -> &Guardian {
        &self.guardian
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Events produced by the previous tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Snapshot of all live herbivores, in stable order
    #[must_use]
    pub fn herbivores(&self) -> Vec<(Entity, Body, Vitals, HerbivoreState)> {
        let mut list: Vec<_> = self
            .entities
            .query::<(&Body, &Vitals, &HerbivoreBrain)>()
            .iter()
            .map(|(entity, (body, vitals, brain))| (entity, *body, *vitals, brain.state))
            .collect();
        list.sort_unstable_by_key(|(entity, ..)| entity.to_bits());
        list
    }

    /// Snapshot of all live predators, in stable order
    #[must_use]
    pub fn predators(&self) -> Vec<(Entity, Body, Vitals, PredatorState)> {
        let mut list: Vec<_> = self
            .entities
            .query::<(&Body, &Vitals, &PredatorBrain)>()
            .iter()
            .map(|(entity, (body, vitals, brain))| (entity, *body, *vitals, brain.state))
            .collect();
        list.sort_unstable_by_key(|(entity, ..)| entity.to_bits());
        list
    }

    /// Number of live herbivores
    #[must_use]
    pub fn herbivore_count(&self) -> usize {
        self.entities
            .query::<&HerbivoreBrain>()
            .iter()
            .filter(|(_, brain)| !matches!(brain.state, HerbivoreState::Dead))
            .count()
    }

    /// Number of live predators
    #[must_use]
    pub fn predator_count(&self) -> usize {
        self.entities
            .query::<&PredatorBrain>()
            .iter()
            .filter(|(_, brain)| !matches!(brain.state, PredatorState::Dead))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{HERBIVORE_MAX_HEALTH, PREDATOR_MAX_HEALTH};

    const DT: f32 = 1.0 / 60.0;

    fn empty_config() -> SimConfig {
        SimConfig {
            width: 640,
            height: 480,
            herbivores: 0,
            predators: 0,
            vegetation_chance: 0.0,
            seed: 42,
            run_seconds: 1.0,
        }
    }

    fn make_eligible(world: &mut World, entity: Entity) {
        let mut brain: HerbivoreBrain = world.entities.cloned(entity).unwrap();
        brain.reproduction_cooldown = 0.0;
        world.entities.set(entity, brain);
    }

    fn park_guardian_far(world: &mut World) {
        world.guardian.position = world.bounds.max + Vec2::splat(10_000.0);
    }

    #[test]
    fn test_init_populates_world() {
        let config = SimConfig {
            herbivores: 10,
            predators: 2,
            ..SimConfig::default()
        };
        let world = World::new(&config);

        assert_eq!(world.herbivore_count(), 10);
        assert_eq!(world.predator_count(), 2);
        assert_eq!(world.guardian().position, world.bounds().center());
        assert!(world.grid().width() > 0 && world.grid().height() > 0);
    }

    #[test]
    fn test_identical_seeds_give_identical_runs() {
        let config = SimConfig {
            herbivores: 8,
            predators: 1,
            vegetation_chance: 0.1,
            ..SimConfig::default()
        };
        let mut a = World::new(&config);
        let mut b = World::new(&config);

        for _ in 0..120 {
            a.update(DT);
            b.update(DT);
        }

        let positions_a: Vec<Vec2> = a.herbivores().iter().map(|(_, b, ..)| b.position).collect();
        let positions_b: Vec<Vec2> = b.herbivores().iter().map(|(_, b, ..)| b.position).collect();
        assert_eq!(positions_a, positions_b);
    }

    #[test]
    fn test_reproduction_spawns_exactly_one_offspring() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let center = world.bounds().center();
        let first = world.spawn_herbivore(center);
        let second = world.spawn_herbivore(center + Vec2::new(5.0, 0.0));
        make_eligible(&mut world, first);
        make_eligible(&mut world, second);

        let mut births = 0;
        for _ in 0..120 {
            world.update(DT);
            births += world
                .events()
                .iter()
                .filter(|e| matches!(e, SimEvent::HerbivoreBorn { .. }))
                .count();
        }

        assert_eq!(births, 1);
        assert_eq!(world.herbivore_count(), 3);

        // Both parents paid the health cost and had their cooldowns reset
        for parent in [first, second] {
            let vitals: Vitals = world.entities.cloned(parent).unwrap();
            assert_eq!(vitals.health, HERBIVORE_MAX_HEALTH - 30.0);
            let brain: HerbivoreBrain = world.entities.cloned(parent).unwrap();
            assert!(brain.reproduction_cooldown > 0.0);
            assert!(brain.partner.is_none());
        }
    }

    #[test]
    fn test_pairing_aborts_when_partner_is_removed() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let center = world.bounds().center();
        let first = world.spawn_herbivore(center);
        let second = world.spawn_herbivore(center + Vec2::new(5.0, 0.0));
        make_eligible(&mut world, first);
        make_eligible(&mut world, second);

        // Let them pair up
        for _ in 0..6 {
            world.update(DT);
        }
        let brain: HerbivoreBrain = world.entities.cloned(first).unwrap();
        assert!(matches!(brain.state, HerbivoreState::Reproducing { .. }));

        // Pull the partner out from under the pairing
        world.entities.despawn(second);
        for _ in 0..12 {
            world.update(DT);
        }

        let brain: HerbivoreBrain = world.entities.cloned(first).unwrap();
        assert!(!matches!(brain.state, HerbivoreState::Reproducing { .. }));
        assert!(brain.partner.is_none());
        // Aborting must not charge the health cost
        let vitals: Vitals = world.entities.cloned(first).unwrap();
        assert_eq!(vitals.health, HERBIVORE_MAX_HEALTH);
        assert_eq!(world.herbivore_count(), 1);
    }

    #[test]
    fn test_predation_removes_prey_and_resets_predator() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let center = world.bounds().center();
        let prey = world.spawn_herbivore(center);
        let hunter = world.spawn_predator(center + Vec2::new(30.0, 0.0));

        let mut kills = 0;
        for _ in 0..10 {
            world.update(DT);
            kills += world
                .events()
                .iter()
                .filter(|e| matches!(e, SimEvent::HerbivoreKilled { .. }))
                .count();
            if world.herbivore_count() == 0 {
                break;
            }
        }

        // The prey is gone from every query surface
        assert_eq!(world.herbivore_count(), 0);
        assert!(world.herbivores().is_empty());
        assert!(!world.entities.contains(prey));

        let vitals: Vitals = world.entities.cloned(hunter).unwrap();
        assert_eq!(vitals.health, PREDATOR_MAX_HEALTH);
        assert_eq!(vitals.hunger, 0.0);
        let brain: PredatorBrain = world.entities.cloned(hunter).unwrap();
        assert!(matches!(
            brain.state,
            PredatorState::Eating { .. } | PredatorState::Sleeping { .. }
        ));

        // Drain one more tick so the kill event surfaces even if the kill
        // landed on the final loop iteration
        world.update(DT);
        kills += world
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::HerbivoreKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_eating_grazes_tile_and_leaves_byproduct() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let tile = IVec2::new(3, 3);
        world.set_vegetation(tile, VegetationState::Grown, 12.0);
        let eater = world.spawn_herbivore(world.tile_to_position(tile));

        for _ in 0..240 {
            world.update(DT);
        }

        assert!(!world.has_vegetation_at(tile));
        assert_eq!(world.byproducts().len(), 1);
        assert_eq!(world.position_to_tile(world.byproducts()[0].position), tile);

        let brain: HerbivoreBrain = world.entities.cloned(eater).unwrap();
        assert!(brain.is_full);
        let vitals: Vitals = world.entities.cloned(eater).unwrap();
        assert_eq!(vitals.health, HERBIVORE_MAX_HEALTH);
    }

    #[test]
    fn test_starved_herbivore_is_pruned() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let entity = world.spawn_herbivore(world.bounds().center());
        let mut vitals: Vitals = world.entities.cloned(entity).unwrap();
        vitals.hunger = 50.0;
        vitals.health = 0.5;
        world.entities.set(entity, vitals);

        let mut starved = 0;
        for _ in 0..5 {
            world.update(DT);
            starved += world
                .events()
                .iter()
                .filter(|e| matches!(e, SimEvent::HerbivoreStarved { .. }))
                .count();
        }

        assert_eq!(starved, 1);
        assert!(!world.entities.contains(entity));
        assert_eq!(world.herbivore_count(), 0);
    }

    #[test]
    fn test_editor_wall_edit_invalidates_paths() {
        let mut world = World::new(&empty_config());
        park_guardian_far(&mut world);

        let food = IVec2::new(10, 5);
        world.set_vegetation(food, VegetationState::Grown, 12.0);

        let start = world.tile_to_position(IVec2::new(1, 5));
        let forager = world.spawn_herbivore(start);
        let mut vitals: Vitals = world.entities.cloned(forager).unwrap();
        vitals.hunger = 6.0;
        world.entities.set(forager, vitals);

        for _ in 0..4 {
            world.update(DT);
        }
        let brain: HerbivoreBrain = world.entities.cloned(forager).unwrap();
        assert!(!brain.path.is_empty());

        // Wall off the goal tile: the route is recomputed and dropped
        world.set_walkable(food, false);
        let brain: HerbivoreBrain = world.entities.cloned(forager).unwrap();
        assert!(brain.path.is_empty());
    }

    #[test]
    fn test_selection_finds_agents_and_degrades() {
        let mut world = World::new(&empty_config());

        let position = world.bounds().center() + Vec2::new(60.0, 0.0);
        let entity = world.spawn_herbivore(position);

        assert_eq!(
            world.select_at(position, 10.0),
            Some(Selection::Herbivore(entity))
        );
        assert_eq!(world.selected(), Some(Selection::Herbivore(entity)));

        // Selection degrades once the entity is removed
        world.entities.despawn(entity);
        assert_eq!(world.selected(), None);

        let guardian_position = world.guardian().position;
        assert_eq!(
            world.select_at(guardian_position, 5.0),
            Some(Selection::Guardian)
        );

        assert_eq!(
            world.select_at(world.bounds().min - Vec2::splat(500.0), 1.0),
            None
        );
    }

    #[test]
    fn test_guardian_command_walks_to_target() {
        let mut world = World::new(&empty_config());

        let goal = IVec2::new(5, 5);
        world.command_guardian(world.tile_to_position(goal));
        assert!(!world.guardian().path.is_empty());

        for _ in 0..600 {
            world.update(DT);
        }

        let arrived = world.guardian().position;
        assert!(arrived.distance(world.tile_to_position(goal)) < 6.0);
    }

    #[test]
    fn test_shut_empties_world() {
        let mut world = World::new(&SimConfig::default());
        world.shut();

        assert!(!world.is_running());
        assert_eq!(world.herbivore_count(), 0);
        assert_eq!(world.predator_count(), 0);
        assert!(world.byproducts().is_empty());
    }

    #[test]
    fn test_update_returns_running_flag() {
        let mut world = World::new(&empty_config());
        assert!(world.update(DT));
        world.stop();
        assert!(!world.update(DT));
    }
}
