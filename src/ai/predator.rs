//! Predator behavior
//!
//! Mirrors the herbivore structure: gated sense/decide/act over copied
//! components. Predators hunt the nearest herbivore, but the guardian
//! overrides everything: inside the attack radius they charge it, inside the
//! larger safety radius they flee it. A completed catch removes the prey from
//! the world immediately so the next re-scan never sees a corpse.

use glam::{IVec2, Vec2};
use hecs::Entity;
use rand::Rng;

use crate::ai::fsm::{Transition, UpdateGate};
use crate::ai::herbivore::HerbivoreState;
use crate::ai::steering::{self, Roam};
use crate::ai::{HerbivoreBrain, pathfinding};
use crate::core::SimEvent;
use crate::ecs::{Body, Vitals};
use crate::sim::World;

pub const PREDATOR_MAX_HEALTH: f32 = 100.0;
pub const PREDATOR_RADIUS: f32 = 10.0;
pub const WALKING_SPEED: f32 = 50.0;
pub const RUNNING_SPEED: f32 = 100.0;

/// Health lost per second once hunger passes the starvation threshold
const STARVATION_RATE: f32 = 119.0 / 2.0;
const STARVATION_HUNGER: f32 = 5.0;

const HUNT_RADIUS: f32 = 200.0;
const CATCH_RADIUS: f32 = 50.0;
const GUARDIAN_ATTACK_RADIUS: f32 = 100.0;
const GUARDIAN_SAFE_RADIUS: f32 = 150.0;
const GUARDIAN_CONTACT_RADIUS: f32 = 10.0;
const KNOCKBACK_DISTANCE: f32 = 70.0;
const KNOCKBACK_INSET: f32 = 10.0;

const EATING_PAUSE: f32 = 1.0;
const NAP_AFTER_MEAL: f32 = 1.0;
const NAP_AFTER_ATTACK: f32 = 1.0;
const NAP_DURATION: f32 = 1.5;
/// Chance per gated seek tick to doze off, keeping the hunt pressure fair
const NAP_CHANCE: f64 = 0.01;
const WAYPOINT_RADIUS: f32 = 5.0;

/// Behavioral state, with pause timers stored inline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredatorState {
    Seeking,
    Catching,
    Eating { timer: f32 },
    Sleeping { timer: f32 },
    Attacking,
    Escaping,
    Dead,
}

impl PredatorState {
    /// State name for debug overlays and logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Seeking => "Seeking",
            Self::Catching => "Catching",
            Self::Eating { .. } => "Eating",
            Self::Sleeping { .. } => "Sleeping",
            Self::Attacking => "Attacking",
            Self::Escaping => "Escaping",
            Self::Dead => "Dead",
        }
    }

    fn update_interval(&self) -> f32 {
        match self {
            Self::Seeking => 0.01,
            Self::Catching => 0.02,
            Self::Sleeping { .. } => 0.03,
            _ => 0.05,
        }
    }
}

/// Per-predator behavioral memory
#[derive(Debug, Clone)]
pub struct PredatorBrain {
    pub state: PredatorState,
    pub path: Vec<IVec2>,
    pub gate: UpdateGate,
    /// Current hunt target; re-validated on every dereference
    pub target: Option<Entity>,
    pub roam: Roam,
}

impl PredatorBrain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PredatorState::Seeking,
            path: Vec::new(),
            gate: UpdateGate::new(),
            target: None,
            roam: Roam::default(),
        }
    }
}

impl Default for PredatorBrain {
    fn default() -> Self {
        Self::new()
    }
}

/// What the predator noticed this gated tick
struct Senses {
    guardian_position: Vec2,
    guardian_distance: f32,
    /// Nearest live herbivore inside the hunt radius
    prey: Option<Entity>,
}

pub(crate) fn spawn(world: &mut World, position: Vec2) -> Entity {
    world.entities.spawn((
        Body::new(position, PREDATOR_RADIUS),
        Vitals::new(PREDATOR_MAX_HEALTH),
        PredatorBrain::new(),
    ))
}

pub(crate) fn update(world: &mut World, entity: Entity, dt: f32) {
    let Some(mut brain) = world.entities.cloned::<PredatorBrain>(entity) else {
        return;
    };
    if matches!(brain.state, PredatorState::Dead) {
        return;
    }
    let Some(mut body) = world.entities.cloned::<Body>(entity) else {
        return;
    };
    let Some(mut vitals) = world.entities.cloned::<Vitals>(entity) else {
        return;
    };

    // Hunger runs on wall time; feeding and napping suspend it
    if !matches!(
        brain.state,
        PredatorState::Eating { .. } | PredatorState::Sleeping { .. }
    ) {
        vitals.hunger += dt;
        if vitals.starve(STARVATION_HUNGER, STARVATION_RATE, dt) {
            brain.state = PredatorState::Dead;
            world.events.push(SimEvent::PredatorStarved { entity });
            write_back(world, entity, body, vitals, brain);
            return;
        }
    }

    let interval = brain.state.update_interval();
    let Some(step) = brain.gate.tick(dt, interval) else {
        write_back(world, entity, body, vitals, brain);
        return;
    };

    let transition = match brain.state {
        PredatorState::Sleeping { timer } => {
            let timer = timer - step;
            if timer <= 0.0 {
                Transition::To(PredatorState::Seeking)
            } else {
                Transition::To(PredatorState::Sleeping { timer })
            }
        }
        PredatorState::Eating { timer } => {
            vitals.hunger = 0.0;
            let timer = timer - step;
            if timer <= 0.0 {
                Transition::To(PredatorState::Sleeping {
                    timer: NAP_AFTER_MEAL,
                })
            } else {
                Transition::To(PredatorState::Eating { timer })
            }
        }
        PredatorState::Dead => Transition::Stay,
        _ => {
            // Active states sense first, then act
            let senses = sense(world, &body);
            decide(&senses, &mut brain).apply(&mut brain.state);

            match brain.state {
                PredatorState::Seeking => prowl(world, &mut body, &mut brain, step),
                PredatorState::Catching => {
                    catch(world, entity, &mut body, &mut vitals, &mut brain, step)
                }
                PredatorState::Attacking => attack(world, entity, &mut body, &senses, step),
                PredatorState::Escaping => {
                    body.advance(
                        steering::flee(body.position, senses.guardian_position),
                        RUNNING_SPEED,
                        step,
                    );
                    Transition::Stay
                }
                _ => Transition::Stay,
            }
        }
    };
    transition.apply(&mut brain.state);

    write_back(world, entity, body, vitals, brain);
}

fn write_back(world: &mut World, entity: Entity, body: Body, vitals: Vitals, brain: PredatorBrain) {
    world.entities.set(entity, body);
    world.entities.set(entity, vitals);
    world.entities.set(entity, brain);
}

fn sense(world: &World, body: &Body) -> Senses {
    let guardian_position = world.guardian.position;
    let guardian_distance = body.position.distance(guardian_position);

    let mut prey: Option<(Entity, f32)> = None;
    if guardian_distance >= GUARDIAN_SAFE_RADIUS {
        for (other, (other_body, other_brain)) in
            world.entities.query::<(&Body, &HerbivoreBrain)>().iter()
        {
            if matches!(other_brain.state, HerbivoreState::Dead) {
                continue;
            }
            let distance = body.position.distance(other_body.position);
            if distance < HUNT_RADIUS && prey.is_none_or(|(_, best)| distance < best) {
                prey = Some((other, distance));
            }
        }
    }

    Senses {
        guardian_position,
        guardian_distance,
        prey: prey.map(|(e, _)| e),
    }
}

/// Sensing priority: guardian attack > guardian flight > hunt > prowl
fn decide(senses: &Senses, brain: &mut PredatorBrain) -> Transition<PredatorState> {
    if senses.guardian_distance < GUARDIAN_ATTACK_RADIUS {
        brain.target = None;
        brain.path.clear();
        return Transition::To(PredatorState::Attacking);
    }
    if senses.guardian_distance < GUARDIAN_SAFE_RADIUS {
        brain.target = None;
        brain.path.clear();
        return Transition::To(PredatorState::Escaping);
    }
    if let Some(prey) = senses.prey {
        brain.target = Some(prey);
        return Transition::To(PredatorState::Catching);
    }
    brain.target = None;
    Transition::To(PredatorState::Seeking)
}

/// Seeking: roam on a timed random heading, occasionally dozing off
fn prowl(
    world: &mut World,
    body: &mut Body,
    brain: &mut PredatorBrain,
    step: f32,
) -> Transition<PredatorState> {
    if world.rng.gen_bool(NAP_CHANCE) {
        return Transition::To(PredatorState::Sleeping {
            timer: NAP_DURATION,
        });
    }
    let direction = brain.roam.direction(&mut world.rng, step);
    body.advance(direction, WALKING_SPEED, step);
    Transition::Stay
}

fn is_live_herbivore(world: &World, entity: Entity) -> bool {
    world
        .entities
        .cloned::<HerbivoreBrain>(entity)
        .is_some_and(|brain| !matches!(brain.state, HerbivoreState::Dead))
}

/// Catching: chase the target along a planned path and strike on contact
fn catch(
    world: &mut World,
    entity: Entity,
    body: &mut Body,
    vitals: &mut Vitals,
    brain: &mut PredatorBrain,
    step: f32,
) -> Transition<PredatorState> {
    // The target may have died or been removed since the last scan
    let target = match brain.target {
        Some(target) if is_live_herbivore(world, target) => target,
        _ => {
            brain.target = None;
            brain.path.clear();
            return Transition::Stay;
        }
    };
    let Some(target_body) = world.entities.cloned::<Body>(target) else {
        brain.target = None;
        brain.path.clear();
        return Transition::Stay;
    };

    if brain.path.is_empty() {
        let start = world.grid.position_to_tile(body.position);
        let goal = world.grid.position_to_tile(target_body.position);
        if world.grid.is_walkable(goal) {
            brain.path = pathfinding::find_path(&world.grid, start, goal);
        }
    }

    if let Some(&next) = brain.path.first() {
        let waypoint = world.grid.tile_to_position(next);
        if body.position.distance(waypoint) < WAYPOINT_RADIUS {
            brain.path.remove(0);
        } else {
            body.advance(steering::seek(body.position, waypoint), RUNNING_SPEED, step);
        }
    }

    if body.position.distance(target_body.position) < CATCH_RADIUS {
        // The catch lands. Remove the prey immediately so next-tick rescans
        // and every held handle see it as gone.
        world.entities.despawn(target);
        world.events.push(SimEvent::HerbivoreKilled {
            prey: target,
            predator: entity,
        });
        vitals.health = PREDATOR_MAX_HEALTH;
        vitals.hunger = 0.0;
        brain.target = None;
        brain.path.clear();
        return Transition::To(PredatorState::Eating {
            timer: EATING_PAUSE,
        });
    }

    Transition::Stay
}

/// Attacking: charge the guardian; on contact, hit it, shove it back and nap
fn attack(
    world: &mut World,
    entity: Entity,
    body: &mut Body,
    senses: &Senses,
    step: f32,
) -> Transition<PredatorState> {
    body.advance(
        steering::seek(body.position, senses.guardian_position),
        RUNNING_SPEED,
        step,
    );

    if body.position.distance(world.guardian.position) < GUARDIAN_CONTACT_RADIUS {
        world.guardian.take_hit();
        let shove = steering::flee(world.guardian.position, body.position);
        let pushed = world.guardian.position + shove * KNOCKBACK_DISTANCE;
        world.guardian.position = world.bounds.clamp_inset(pushed, KNOCKBACK_INSET);
        world.events.push(SimEvent::GuardianHit { predator: entity });
        return Transition::To(PredatorState::Sleeping {
            timer: NAP_AFTER_ATTACK,
        });
    }
    Transition::Stay
}

/// Editor hook: the grid changed under us, recompute the chase route
pub(crate) fn recalculate_path(world: &mut World, entity: Entity) {
    let Some(body) = world.entities.cloned::<Body>(entity) else {
        return;
    };
    let Some(mut brain) = world.entities.cloned::<PredatorBrain>(entity) else {
        return;
    };

    match brain.target {
        Some(target) if is_live_herbivore(world, target) => {
            let Some(target_body) = world.entities.cloned::<Body>(target) else {
                brain.path.clear();
                world.entities.set(entity, brain);
                return;
            };
            let start = world.grid.position_to_tile(body.position);
            let goal = world.grid.position_to_tile(target_body.position);
            if world.grid.is_walkable(goal) {
                brain.path = pathfinding::find_path(&world.grid, start, goal);
            } else {
                brain.path.clear();
            }
        }
        _ => brain.path.clear(),
    }
    world.entities.set(entity, brain);
}
