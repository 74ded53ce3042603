//! # Evo Racer - Neuroevolution of Track-Driving Controllers
//!
//! A population of small feedforward networks steers simulated cars around a
//! track from distance-sensor readings. A genetic algorithm breeds the next
//! population from the fittest drivers each generation.
//!
//! ## Features
//!
//! - Feedforward networks (tanh by default) with a flat parameter codec
//! - Elitism, gene-wise crossover and uniform mutation
//! - Per-tick sense → infer → act loop with checkpoint scoring
//! - Generation lifecycle with normal and fast termination modes
//! - Injected, seedable random source for reproducible runs
//! - Headless ring track for experiments and tests
//!
//! ## Core Modules
//!
//! - [`simulation::network`] - Neural network implementation
//! - [`simulation::genome`] - Parameter vector plus fitness
//! - [`simulation::evolution`] - Selection, crossover and mutation
//! - [`simulation::agent`] - Per-tick decision loop
//! - [`simulation::generation`] - Generation lifecycle

/// Core simulation logic and data structures.
pub mod simulation {
    /// Runtime pairing of a network with a vehicle.
    pub mod agent;
    /// Car kinematics driven by network outputs.
    pub mod car;
    /// Collaborator traits for vehicles, tracks and checkpoint scoring.
    pub mod environment;
    /// Error taxonomy.
    pub mod error;
    /// Event system for applying marker contacts serially.
    pub mod events;
    /// Elitism, crossover and mutation.
    pub mod evolution;
    /// Generation lifecycle controller.
    pub mod generation;
    /// Parameter vector and fitness.
    pub mod genome;
    /// Feedforward neural network.
    pub mod network;
    /// Run parameters.
    pub mod params;
    /// Headless ring track.
    pub mod track;
}

pub use simulation::error::{Result, SimulationError};
