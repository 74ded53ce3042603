//! Run configuration.
//!
//! Parameters are plain serde data. They are read from JSON and validated once
//! when a generation is bootstrapped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::car::CarParams;
use super::error::{Result, SimulationError};
use super::evolution::{EvolutionParams, MIN_EVOLVABLE_POPULATION};
use super::network;
use super::network::layer::Activation;

/// Finishers needed to end a generation early in fast mode.
pub const EARLY_FINISH_THRESHOLD: usize = 2;

/// Parameters that control a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of genomes (and agents) per generation.
    pub population_size: usize,
    /// Smallest size accepted by [`crate::simulation::generation::GenerationController::set_population_size`].
    pub min_population: usize,
    /// Largest size accepted by the same setter.
    pub max_population: usize,
    /// Neural network layer widths, sensors first, actions last.
    pub layer_sizes: Vec<usize>,
    /// Activation used by every layer of every controller network.
    pub activation: Activation,
    /// Width of the uniform weight range for bootstrap networks.
    pub init_range: f64,
    /// Lower bound of the bootstrap weight range.
    pub init_shift: f64,
    /// Simulation speed multiplier; above 1 enables the early-finish rule.
    pub time_scale: f64,
    /// Finishers that end a generation early when `time_scale > 1`.
    pub early_finish_threshold: usize,
    /// Step agents on the rayon pool.
    pub parallel: bool,
    /// Seed for the run's random source; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Genetic operator settings.
    pub evolution: EvolutionParams,
    /// Car motion limits.
    pub car: CarParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 200,
            min_population: 3,
            max_population: 299,
            layer_sizes: vec![5, 2],
            activation: Activation::Tanh,
            init_range: 1.0,
            init_shift: -0.5,
            time_scale: 1.0,
            early_finish_threshold: EARLY_FINISH_THRESHOLD,
            parallel: true,
            seed: None,
            evolution: EvolutionParams::default(),
            car: CarParams::default(),
        }
    }
}

impl Params {
    /// Checks every rule a run depends on.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < MIN_EVOLVABLE_POPULATION {
            return Err(SimulationError::InvalidConfiguration(format!(
                "population_size must be at least {MIN_EVOLVABLE_POPULATION}, got {}",
                self.population_size
            )));
        }
        if self.min_population < MIN_EVOLVABLE_POPULATION || self.min_population > self.max_population {
            return Err(SimulationError::InvalidConfiguration(format!(
                "population range [{}, {}] is empty or below {MIN_EVOLVABLE_POPULATION}",
                self.min_population, self.max_population
            )));
        }
        network::validate_topology(&self.layer_sizes)?;
        if !(self.init_range.is_finite() && self.init_shift.is_finite()) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "init_range and init_shift must be finite, got {} and {}",
                self.init_range, self.init_shift
            )));
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        self.car.validate()?;
        self.evolution.validate()
    }

    /// Clamps a requested population size into `[min_population, max_population]`.
    pub fn clamp_population(&self, requested: usize) -> usize {
        requested.clamp(self.min_population, self.max_population)
    }

    /// Saves the params to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads params from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params = serde_json::from_str(&json)?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn rejects_small_population_and_short_topology() {
        let params = Params {
            population_size: 1,
            ..Params::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let params = Params {
            layer_sizes: vec![5],
            ..Params::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn clamps_requested_population() {
        let params = Params::default();
        assert_eq!(params.clamp_population(1), 3);
        assert_eq!(params.clamp_population(50), 50);
        assert_eq!(params.clamp_population(1000), 299);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params: Params =
            serde_json::from_str(r#"{ "population_size": 12, "evolution": { "mutation_prob": 0.2 } }"#)
                .unwrap();
        assert_eq!(params.population_size, 12);
        assert_eq!(params.evolution.mutation_prob, 0.2);
        assert_eq!(params.evolution.swap_prob, 0.75);
        assert_eq!(params.layer_sizes, vec![5, 2]);
    }
}
