//! Herbivore behavior
//!
//! Per-agent state machine: forage, graze, flock, flee predators, pair up and
//! reproduce. Each update works on copies of the agent's components and
//! writes them back at the end, so handlers are free to inspect and mutate
//! the rest of the world without holding borrows into the entity store.
//!
//! Reproduction is the delicate part: pairing marks both partners with
//! mutual entity handles, and consummation is performed by exactly one side,
//! chosen by comparing handle bits. The other side holds position until it is
//! reset by the spawning partner or its timeout fires, so exactly one
//! offspring appears no matter which partner updates first.

use glam::{IVec2, Vec2};
use hecs::Entity;
use rand::Rng;

use crate::ai::fsm::{Transition, UpdateGate};
use crate::ai::{pathfinding, steering};
use crate::core::SimEvent;
use crate::ecs::{Body, Vitals};
use crate::sim::{Byproduct, World};

pub const HERBIVORE_MAX_HEALTH: f32 = 100.0;
pub const HERBIVORE_RADIUS: f32 = 15.0;
pub const WALKING_SPEED: f32 = 70.0;
pub const RUNNING_SPEED: f32 = 150.0;

/// Health gained by finishing a meal
const HEAL_PER_MEAL: f32 = 20.0;
/// Health lost per second once hunger passes the starvation threshold
const STARVATION_RATE: f32 = 119.0 / 2.0;
const STARVATION_HUNGER: f32 = 10.0;
/// Hunger level at which foraging starts
const FORAGE_HUNGER: f32 = 5.0;
const EATING_DURATION: f32 = 3.0;
const SATIETY_DURATION: f32 = 5.0;

pub const REPRODUCE_HEALTH_THRESHOLD: f32 = 60.0;
const REPRODUCE_HEALTH_COST: f32 = 30.0;
pub const REPRODUCTION_COOLDOWN: f32 = 2.0;
const REPRODUCTION_PAUSE: f32 = 1.5;
/// Pause timer value below which a stalled pairing aborts
const REPRODUCTION_TIMEOUT: f32 = -2.0;
const PAIR_RADIUS: f32 = 20.0;
/// How far away a prospective partner may be for long-range courtship
const PARTNER_SEARCH_RADIUS: f32 = 200.0;

const PREDATOR_ALERT_RADIUS: f32 = 100.0;
const FOLLOW_RADIUS: f32 = 150.0;
const FOLLOW_CHANCE: f64 = 0.3;
const WAYPOINT_RADIUS: f32 = 5.0;

/// Behavioral state, with per-state timers stored inline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HerbivoreState {
    Wandering,
    Seeking,
    Eating { timer: f32 },
    Escaping,
    Reproducing { timer: f32 },
    Dead,
}

impl HerbivoreState {
    /// State name for debug overlays and logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wandering => "Wandering",
            Self::Seeking => "Seeking",
            Self::Eating { .. } => "Eating",
            Self::Escaping => "Escaping",
            Self::Reproducing { .. } => "Reproducing",
            Self::Dead => "Dead",
        }
    }

    fn update_interval(&self) -> f32 {
        match self {
            Self::Wandering => 0.03,
            _ => 0.02,
        }
    }
}

/// Per-herbivore behavioral memory
#[derive(Debug, Clone)]
pub struct HerbivoreBrain {
    pub state: HerbivoreState,
    pub path: Vec<IVec2>,
    pub gate: UpdateGate,
    pub reproduction_cooldown: f32,
    pub satiety_timer: f32,
    pub is_full: bool,
    /// Current reproduction partner; re-validated on every dereference
    pub partner: Option<Entity>,
}

impl HerbivoreBrain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: HerbivoreState::Wandering,
            path: Vec::new(),
            gate: UpdateGate::new(),
            reproduction_cooldown: REPRODUCTION_COOLDOWN,
            satiety_timer: 0.0,
            is_full: false,
            partner: None,
        }
    }
}

impl Default for HerbivoreBrain {
    fn default() -> Self {
        Self::new()
    }
}

/// What the herbivore noticed this gated tick
struct Senses {
    /// Position of the nearest predator inside the alert radius
    predator: Option<Vec2>,
}

pub(crate) fn spawn(world: &mut World, position: Vec2) -> Entity {
    let mut body = Body::new(position, HERBIVORE_RADIUS);
    body.direction = Vec2::X;
    world.entities.spawn((
        body,
        Vitals::new(HERBIVORE_MAX_HEALTH),
        HerbivoreBrain::new(),
    ))
}

pub(crate) fn update(world: &mut World, entity: Entity, dt: f32) {
    let Some(mut brain) = world.entities.cloned::<HerbivoreBrain>(entity) else {
        return;
    };
    if matches!(brain.state, HerbivoreState::Dead) {
        return;
    }
    let Some(mut body) = world.entities.cloned::<Body>(entity) else {
        return;
    };
    let Some(mut vitals) = world.entities.cloned::<Vitals>(entity) else {
        return;
    };

    brain.reproduction_cooldown -= dt;

    // Hunger runs on wall time, not the gated step; pairing suspends it
    if !matches!(brain.state, HerbivoreState::Reproducing { .. }) {
        vitals.hunger += dt;
        if vitals.starve(STARVATION_HUNGER, STARVATION_RATE, dt) {
            brain.state = HerbivoreState::Dead;
            world.events.push(SimEvent::HerbivoreStarved { entity });
            write_back(world, entity, body, vitals, brain);
            return;
        }
    }

    if brain.is_full {
        brain.satiety_timer -= dt;
        if brain.satiety_timer <= 0.0 {
            brain.is_full = false;
        }
    }

    let interval = brain.state.update_interval();
    let Some(step) = brain.gate.tick(dt, interval) else {
        write_back(world, entity, body, vitals, brain);
        return;
    };

    let senses = sense(world, entity, &body);

    // Priority re-decision for the travel states; eating and pairing run
    // their own course and only break out from inside their handlers.
    if !matches!(
        brain.state,
        HerbivoreState::Eating { .. } | HerbivoreState::Reproducing { .. }
    ) {
        decide(world, entity, &mut body, &vitals, &mut brain, &senses).apply(&mut brain.state);
    }

    let transition = match brain.state {
        HerbivoreState::Wandering => wander(world, entity, &mut body, step),
        HerbivoreState::Seeking => follow_path(world, entity, &mut body, &vitals, &mut brain, step),
        HerbivoreState::Eating { timer } => {
            eat(world, &mut body, &mut vitals, &mut brain, &senses, timer, step)
        }
        HerbivoreState::Escaping => escape(&mut body, &senses, step),
        HerbivoreState::Reproducing { timer } => {
            reproduce(world, entity, &mut body, &mut vitals, &mut brain, timer, step, &senses)
        }
        HerbivoreState::Dead => Transition::Stay,
    };
    transition.apply(&mut brain.state);

    write_back(world, entity, body, vitals, brain);
}

fn write_back(world: &mut World, entity: Entity, body: Body, vitals: Vitals, brain: HerbivoreBrain) {
    world.entities.set(entity, body);
    world.entities.set(entity, vitals);
    world.entities.set(entity, brain);
}

fn sense(world: &World, _entity: Entity, body: &Body) -> Senses {
    use crate::ai::predator::PredatorBrain;

    let mut nearest: Option<(Vec2, f32)> = None;
    for (_, (predator_body, _)) in world.entities.query::<(&Body, &PredatorBrain)>().iter() {
        let distance = body.position.distance(predator_body.position);
        if distance < PREDATOR_ALERT_RADIUS && nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((predator_body.position, distance));
        }
    }
    Senses {
        predator: nearest.map(|(position, _)| position),
    }
}

/// Priority ladder run every gated tick for the travel states
fn decide(
    world: &mut World,
    entity: Entity,
    body: &mut Body,
    vitals: &Vitals,
    brain: &mut HerbivoreBrain,
    senses: &Senses,
) -> Transition<HerbivoreState> {
    if try_pair(world, entity, body, vitals, brain) {
        return Transition::To(HerbivoreState::Reproducing {
            timer: REPRODUCTION_PAUSE,
        });
    }

    if senses.predator.is_some() {
        brain.path.clear();
        return Transition::To(HerbivoreState::Escaping);
    }

    if brain.is_full {
        brain.path.clear();
        return Transition::To(HerbivoreState::Wandering);
    }

    let tile = world.grid.position_to_tile(body.position);
    if world.ecology.has_live_at(tile) {
        // Settle onto the tile center and start the meal
        body.position = world.grid.tile_to_position(tile);
        body.direction = Vec2::ZERO;
        brain.path.clear();
        return Transition::To(HerbivoreState::Eating { timer: 0.0 });
    }

    if vitals.hunger > FORAGE_HUNGER {
        if brain.path.is_empty() {
            if let Some(goal) = world.ecology.nearest_live(tile) {
                brain.path = pathfinding::find_path(&world.grid, tile, goal);
            }
        }
        if brain.path.is_empty() {
            // Nothing edible reachable right now
            return Transition::To(HerbivoreState::Wandering);
        }
        return Transition::To(HerbivoreState::Seeking);
    }

    // Not hungry: walk toward a distant eligible partner if there is one
    if vitals.health >= REPRODUCE_HEALTH_THRESHOLD && brain.reproduction_cooldown <= 0.0 {
        if let Some(goal) = nearest_eligible_partner_tile(world, entity, body) {
            if goal != tile && world.grid.is_walkable(goal) {
                let path = pathfinding::find_path(&world.grid, tile, goal);
                if !path.is_empty() {
                    brain.path = path;
                    return Transition::To(HerbivoreState::Seeking);
                }
            }
        }
    }

    Transition::To(HerbivoreState::Wandering)
}

/// Mutually pair with the nearest eligible herbivore in close range.
/// Both sides record each other and enter the paused reproduction state.
fn try_pair(
    world: &mut World,
    entity: Entity,
    body: &Body,
    vitals: &Vitals,
    brain: &mut HerbivoreBrain,
) -> bool {
    if vitals.health < REPRODUCE_HEALTH_THRESHOLD || brain.reproduction_cooldown > 0.0 {
        return false;
    }

    let mut best: Option<(Entity, f32)> = None;
    for (other, (other_body, other_brain, other_vitals)) in world
        .entities
        .query::<(&Body, &HerbivoreBrain, &Vitals)>()
        .iter()
    {
        if other == entity {
            continue;
        }
        if matches!(
            other_brain.state,
            HerbivoreState::Dead | HerbivoreState::Reproducing { .. }
        ) {
            continue;
        }
        if other_vitals.health < REPRODUCE_HEALTH_THRESHOLD
            || other_brain.reproduction_cooldown > 0.0
        {
            continue;
        }
        let distance = body.position.distance(other_body.position);
        if distance >= PAIR_RADIUS {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_entity, best_distance)) => {
                distance < best_distance
                    || (distance == best_distance && other.to_bits() < best_entity.to_bits())
            }
        };
        if better {
            best = Some((other, distance));
        }
    }

    let Some((partner, _)) = best else {
        return false;
    };
    let Some(mut partner_brain) = world.entities.cloned::<HerbivoreBrain>(partner) else {
        return false;
    };

    partner_brain.state = HerbivoreState::Reproducing {
        timer: REPRODUCTION_PAUSE,
    };
    partner_brain.partner = Some(entity);
    partner_brain.path.clear();
    world.entities.set(partner, partner_brain);

    brain.partner = Some(partner);
    brain.path.clear();
    true
}

fn nearest_eligible_partner_tile(world: &World, entity: Entity, body: &Body) -> Option<IVec2> {
    let mut best: Option<(Vec2, f32)> = None;
    for (other, (other_body, other_brain, other_vitals)) in world
        .entities
        .query::<(&Body, &HerbivoreBrain, &Vitals)>()
        .iter()
    {
        if other == entity {
            continue;
        }
        if matches!(
            other_brain.state,
            HerbivoreState::Dead | HerbivoreState::Reproducing { .. }
        ) {
            continue;
        }
        if other_vitals.health < REPRODUCE_HEALTH_THRESHOLD
            || other_brain.reproduction_cooldown > 0.0
        {
            continue;
        }
        let distance = body.position.distance(other_body.position);
        if distance < PARTNER_SEARCH_RADIUS && best.is_none_or(|(_, b)| distance < b) {
            best = Some((other_body.position, distance));
        }
    }
    best.map(|(position, _)| world.grid.position_to_tile(position))
}

/// Wandering: drift with the flock or in a random direction
fn wander(world: &mut World, entity: Entity, body: &mut Body, step: f32) -> Transition<HerbivoreState> {
    let mut flock_target: Option<(Vec2, f32)> = None;
    if world.rng.gen_bool(FOLLOW_CHANCE) {
        for (other, (other_body, other_brain)) in
            world.entities.query::<(&Body, &HerbivoreBrain)>().iter()
        {
            if other == entity || matches!(other_brain.state, HerbivoreState::Dead) {
                continue;
            }
            let distance = body.position.distance(other_body.position);
            if distance < FOLLOW_RADIUS && flock_target.is_none_or(|(_, best)| distance < best) {
                flock_target = Some((other_body.position, distance));
            }
        }
    }

    let direction = match flock_target {
        Some((position, _)) => steering::seek(body.position, position),
        None => steering::random_direction(&mut world.rng),
    };
    body.advance(direction, WALKING_SPEED, step);
    Transition::Stay
}

/// Seeking: walk the planned path tile by tile
fn follow_path(
    world: &mut World,
    entity: Entity,
    body: &mut Body,
    vitals: &Vitals,
    brain: &mut HerbivoreBrain,
    step: f32,
) -> Transition<HerbivoreState> {
    let Some(&next) = brain.path.first() else {
        return arrive(world, body);
    };

    let waypoint = world.grid.tile_to_position(next);
    if body.position.distance(waypoint) < WAYPOINT_RADIUS {
        brain.path.remove(0);

        // Opportunistic pairing on waypoint arrival
        if try_pair(world, entity, body, vitals, brain) {
            return Transition::To(HerbivoreState::Reproducing {
                timer: REPRODUCTION_PAUSE,
            });
        }
        if brain.path.is_empty() {
            return arrive(world, body);
        }
    } else {
        body.advance(steering::seek(body.position, waypoint), WALKING_SPEED, step);
    }
    Transition::Stay
}

/// End of path: eat if the destination has vegetation, otherwise re-plan
fn arrive(world: &World, body: &mut Body) -> Transition<HerbivoreState> {
    let tile = world.grid.position_to_tile(body.position);
    if world.ecology.has_live_at(tile) {
        body.position = world.grid.tile_to_position(tile);
        body.direction = Vec2::ZERO;
        return Transition::To(HerbivoreState::Eating { timer: 0.0 });
    }
    Transition::To(HerbivoreState::Wandering)
}

/// Eating: hold still through the meal, then graze the tile
fn eat(
    world: &mut World,
    body: &mut Body,
    vitals: &mut Vitals,
    brain: &mut HerbivoreBrain,
    senses: &Senses,
    timer: f32,
    step: f32,
) -> Transition<HerbivoreState> {
    if senses.predator.is_some() {
        return Transition::To(HerbivoreState::Escaping);
    }

    let timer = timer + step;
    if timer < EATING_DURATION {
        return Transition::To(HerbivoreState::Eating { timer });
    }

    vitals.heal(HEAL_PER_MEAL, HERBIVORE_MAX_HEALTH);

    let tile = world.grid.position_to_tile(body.position);
    if world.ecology.graze_at(tile) {
        world.events.push(SimEvent::VegetationGrazed { tile });

        // One active byproduct per tile at most
        let occupied = world
            .byproducts
            .iter()
            .any(|b| b.active && world.grid.position_to_tile(b.position) == tile);
        if !occupied {
            let quality = world.rng.gen_range(1..=5) as f32;
            world
                .byproducts
                .push(Byproduct::new(world.grid.tile_to_position(tile), quality));
        }
    }

    vitals.hunger = 0.0;
    brain.is_full = true;
    brain.satiety_timer = SATIETY_DURATION;
    brain.path.clear();
    body.direction = steering::random_direction(&mut world.rng);
    Transition::To(HerbivoreState::Wandering)
}

/// Escaping: run straight away from the nearest sensed predator
fn escape(body: &mut Body, senses: &Senses, step: f32) -> Transition<HerbivoreState> {
    match senses.predator {
        Some(threat) => {
            body.advance(steering::flee(body.position, threat), RUNNING_SPEED, step);
            Transition::Stay
        }
        None => Transition::To(HerbivoreState::Wandering),
    }
}

/// Reproducing: both partners hold position until one of them (the smaller
/// handle) consummates, or the pairing falls apart.
fn reproduce(
    world: &mut World,
    entity: Entity,
    body: &mut Body,
    vitals: &mut Vitals,
    brain: &mut HerbivoreBrain,
    timer: f32,
    step: f32,
    senses: &Senses,
) -> Transition<HerbivoreState> {
    if senses.predator.is_some() {
        brain.partner = None;
        return Transition::To(HerbivoreState::Escaping);
    }

    let timer = timer - step;

    // Hold position with a slight shuffle
    body.position += Vec2::new(
        world.rng.gen_range(-2.0..=2.0),
        world.rng.gen_range(-2.0..=2.0),
    );

    let Some(partner) = brain.partner else {
        return Transition::To(HerbivoreState::Wandering);
    };
    let paired_back = world
        .entities
        .cloned::<HerbivoreBrain>(partner)
        .is_some_and(|other| {
            matches!(other.state, HerbivoreState::Reproducing { .. })
                && other.partner == Some(entity)
        });
    if !paired_back {
        // Partner died, was removed, or broke off: abort with no side effects
        brain.partner = None;
        return Transition::To(HerbivoreState::Wandering);
    }

    if timer < REPRODUCTION_TIMEOUT {
        brain.partner = None;
        return Transition::To(HerbivoreState::Wandering);
    }

    if timer <= 0.0 {
        if entity.to_bits() < partner.to_bits() {
            return consummate(world, entity, partner, body, vitals, brain);
        }
        // The other side owns the spawn; keep holding until it resets us
        // or the timeout above fires.
    }

    Transition::To(HerbivoreState::Reproducing { timer })
}

fn consummate(
    world: &mut World,
    _entity: Entity,
    partner: Entity,
    body: &mut Body,
    vitals: &mut Vitals,
    brain: &mut HerbivoreBrain,
) -> Transition<HerbivoreState> {
    let Some(partner_body) = world.entities.cloned::<Body>(partner) else {
        brain.partner = None;
        return Transition::To(HerbivoreState::Wandering);
    };

    let position = (body.position + partner_body.position) * 0.5;
    let offspring = spawn(world, position);
    world.events.push(SimEvent::HerbivoreBorn {
        entity: offspring,
        position,
    });

    vitals.health -= REPRODUCE_HEALTH_COST;
    brain.reproduction_cooldown = REPRODUCTION_COOLDOWN;
    brain.partner = None;

    if let Some(mut partner_vitals) = world.entities.cloned::<Vitals>(partner) {
        partner_vitals.health -= REPRODUCE_HEALTH_COST;
        world.entities.set(partner, partner_vitals);
    }
    if let Some(mut partner_brain) = world.entities.cloned::<HerbivoreBrain>(partner) {
        partner_brain.state = HerbivoreState::Wandering;
        partner_brain.partner = None;
        partner_brain.reproduction_cooldown = REPRODUCTION_COOLDOWN;
        world.entities.set(partner, partner_brain);
    }

    Transition::To(HerbivoreState::Wandering)
}

/// Editor hook: the grid changed under us, recompute the current route
pub(crate) fn recalculate_path(world: &mut World, entity: Entity) {
    let Some(body) = world.entities.cloned::<Body>(entity) else {
        return;
    };
    let Some(mut brain) = world.entities.cloned::<HerbivoreBrain>(entity) else {
        return;
    };
    if brain.path.is_empty() {
        return;
    }

    let start = world.grid.position_to_tile(body.position);
    match world.ecology.nearest_live(start) {
        Some(goal) if world.grid.is_walkable(goal) => {
            brain.path = pathfinding::find_path(&world.grid, start, goal);
        }
        _ => brain.path.clear(),
    }
    world.entities.set(entity, brain);
}
