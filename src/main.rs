use std::process::ExitCode;

use evo_racer::simulation::generation::{GenerationController, TickOutcome};
use evo_racer::simulation::params::Params;
use evo_racer::simulation::track::RingTrack;
use log::{error, info};

const GENERATIONS: u32 = 50;
const MAX_TICKS_PER_GENERATION: u32 = 5_000;
const DT: f64 = 0.02;

fn run() -> evo_racer::Result<()> {
    let params = match std::env::args().nth(1) {
        Some(path) => Params::load_from_file(&path)?,
        None => Params::default(),
    };

    info!(
        "starting evolution: {} cars, topology {:?}",
        params.population_size, params.layer_sizes
    );

    let mut controller = GenerationController::new(RingTrack::default(), params)?;
    let mut ticks = 0;

    while controller.generation() <= GENERATIONS {
        match controller.tick(DT)? {
            TickOutcome::Evolved { .. } => ticks = 0,
            TickOutcome::Running => {
                ticks += 1;
                // cars circling forever never crash
                if ticks >= MAX_TICKS_PER_GENERATION {
                    controller.force_evolve();
                }
            }
        }
    }

    if let Some(summary) = controller.last_summary() {
        info!(
            "final generation {}: best fitness {:.3}, {} finished",
            summary.generation, summary.best_fitness, summary.finished
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
