#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_racer::simulation::environment::{Track, Vehicle};
use evo_racer::simulation::generation::{GenerationController, TickOutcome};
use evo_racer::simulation::params::Params;
use evo_racer::simulation::track::{RingParams, RingTrack};

fn create_test_params() -> Params {
    Params {
        population_size: 12,
        layer_sizes: vec![5, 4, 2],
        seed: Some(2024),
        ..Params::default()
    }
}

fn run_generations(generations: u32) -> GenerationController<RingTrack> {
    let mut controller =
        GenerationController::new(RingTrack::default(), create_test_params()).unwrap();
    let mut ticks = 0;
    while controller.generation() <= generations {
        match controller.tick(0.02).unwrap() {
            TickOutcome::Evolved { .. } => ticks = 0,
            TickOutcome::Running => {
                ticks += 1;
                if ticks >= 2_000 {
                    controller.force_evolve();
                }
            }
        }
    }
    controller
}

#[test]
fn test_population_size_is_stable_across_generations() {
    let controller = run_generations(5);
    assert_eq!(controller.generation(), 6);
    assert_eq!(controller.agents().len(), 12);
    assert!(controller.agents().iter().all(|a| !a.is_crashed()));
    assert!(controller.population().all(|g| g.fitness == 0.0));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let a: Vec<Vec<f64>> = run_generations(3)
        .population()
        .map(|g| g.genes().to_vec())
        .collect();
    let b: Vec<Vec<f64>> = run_generations(3)
        .population()
        .map(|g| g.genes().to_vec())
        .collect();
    assert_eq!(a, b);
}

#[test]
fn test_fresh_cars_have_five_valid_readings() {
    let mut track = RingTrack::new(RingParams::default());
    let car = track.spawn_vehicle();
    let readings = car.distances();
    assert_eq!(readings.len(), 5);
    assert!(readings.iter().all(|&d| (0.0..=5.0).contains(&d)));
    assert_eq!(car.lap_fraction(), 0.0);
}
