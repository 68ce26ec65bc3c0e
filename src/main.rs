//! Headless demo runner
//!
//! Drives the simulation at a fixed 60 Hz timestep, periodically sends the
//! guardian to a random spot (standing in for mouse input), and logs the
//! event stream so a run can be watched from a terminal.

use pasture::core::{SimConfig, SimEvent, Time};
use pasture::sim::World;

/// Fixed simulation timestep
const DT: f32 = 1.0 / 60.0;

/// Ticks between guardian move commands
const GUARDIAN_COMMAND_PERIOD: u64 = 300;

/// Ticks between population log lines
const REPORT_PERIOD: u64 = 600;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    let mut world = World::new(&config);
    let mut time = Time::new();

    let total_ticks = (config.run_seconds / DT).ceil() as u64;
    for tick in 1..=total_ticks {
        if tick % GUARDIAN_COMMAND_PERIOD == 0 {
            let target = world.random_position();
            world.command_guardian(target);
            log::debug!("guardian commanded to {:.0},{:.0}", target.x, target.y);
        }

        let running = world.update(DT);

        for event in world.events().iter() {
            match event {
                SimEvent::HerbivoreBorn { position, .. } => {
                    log::info!("herbivore born at {:.0},{:.0}", position.x, position.y);
                }
                SimEvent::HerbivoreKilled { .. } => log::info!("herbivore caught by a predator"),
                SimEvent::HerbivoreStarved { .. } => log::info!("herbivore starved"),
                SimEvent::PredatorStarved { .. } => log::info!("predator starved"),
                SimEvent::GuardianHit { .. } => log::info!("guardian was hit"),
                SimEvent::VegetationGrazed { tile } => {
                    log::debug!("vegetation grazed at {},{}", tile.x, tile.y);
                }
                SimEvent::ByproductSpread { tile } => {
                    log::debug!("byproduct spread around {},{}", tile.x, tile.y);
                }
                _ => {}
            }
        }

        if tick % REPORT_PERIOD == 0 {
            log::info!(
                "t={:.0}s herbivores={} predators={} byproducts={}",
                tick as f32 * DT,
                world.herbivore_count(),
                world.predator_count(),
                world.byproducts().len(),
            );
        }

        if !running {
            break;
        }
    }

    time.update();
    log::info!(
        "simulated {:.0}s in {:.2}s wall time: {} herbivores and {} predators remain",
        config.run_seconds,
        time.elapsed().as_secs_f32(),
        world.herbivore_count(),
        world.predator_count(),
    );
    world.shut();
}
