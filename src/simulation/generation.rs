//! Generation lifecycle.
//!
//! The controller owns the agents (and through them the population), runs the
//! per-tick step phase, applies contact events and decides when to evolve.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::agent::Agent;
use super::environment::Track;
use super::error::{Result, SimulationError};
use super::events::{self, EventQueue};
use super::evolution::EvolutionEngine;
use super::genome::Genome;
use super::network;
use super::params::Params;

/// Result of one [`GenerationController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The current generation keeps running.
    Running,
    /// The population evolved; `generation` is the new generation number.
    Evolved {
        /// Generation that starts on the next tick.
        generation: u32,
    },
}

/// Statistics of a finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    /// Generation number.
    pub generation: u32,
    /// Highest fitness reached.
    pub best_fitness: f64,
    /// Mean fitness over all agents.
    pub mean_fitness: f64,
    /// Agents that reached the finish.
    pub finished: usize,
    /// Elapsed time when the generation ended.
    pub lap_time: f64,
}

/// Drives generations of agents on a track.
pub struct GenerationController<T: Track, R = StdRng> {
    track: T,
    params: Params,
    engine: EvolutionEngine,
    agents: Vec<Agent<T::Vehicle>>,
    generation: u32,
    lap_time: f64,
    last_lap_time: f64,
    force_evolve: bool,
    pending_population: Option<usize>,
    pending_topology: Option<Vec<usize>>,
    last_summary: Option<GenerationSummary>,
    rng: R,
}

impl<T: Track> GenerationController<T, StdRng> {
    /// Creates a controller whose random source is seeded from `params.seed`,
    /// or from the OS when no seed is set.
    pub fn new(track: T, params: Params) -> Result<Self> {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(track, params, rng)
    }
}

impl<T: Track, R: Rng> GenerationController<T, R> {
    /// Creates a controller with an explicit random source and bootstraps the
    /// first generation.
    pub fn with_rng(track: T, params: Params, rng: R) -> Result<Self> {
        params.validate()?;
        let mut controller = Self {
            track,
            engine: EvolutionEngine::new(params.evolution.clone()),
            params,
            agents: Vec::new(),
            generation: 0,
            lap_time: 0.0,
            last_lap_time: 0.0,
            force_evolve: false,
            pending_population: None,
            pending_topology: None,
            last_summary: None,
            rng,
        };
        controller.bootstrap()?;
        Ok(controller)
    }

    /// Creates generation 1 from randomly initialized networks.
    fn bootstrap(&mut self) -> Result<()> {
        let mut agents = Vec::with_capacity(self.params.population_size);
        for _ in 0..self.params.population_size {
            let vehicle = self.track.spawn_vehicle();
            agents.push(Agent::new_random(
                &self.params.layer_sizes,
                self.params.init_range,
                self.params.init_shift,
                self.params.car.clone(),
                vehicle,
                &mut self.rng,
            )?
            .with_activation(self.params.activation));
        }
        self.agents = agents;
        self.generation = 1;
        self.lap_time = 0.0;
        self.last_lap_time = 0.0;
        self.force_evolve = false;
        self.last_summary = None;
        self.track.reset_checkpoints();

        debug!(
            "bootstrapped {} agents with topology {:?}",
            self.agents.len(),
            self.params.layer_sizes
        );
        Ok(())
    }

    /// Advances the simulation by one tick.
    ///
    /// Every live agent steps, contacts are applied in slot order, the lap clock
    /// advances while nobody has finished, and the population evolves when the
    /// termination rule fires.
    pub fn tick(&mut self, dt: f64) -> Result<TickOutcome> {
        self.step_agents()?;

        let queue = EventQueue::collect(&mut self.agents);
        events::apply_events(&mut self.agents, &mut self.track, queue);

        if !self.any_finished() {
            self.lap_time += dt;
        }

        if self.should_evolve() {
            self.evolve_generation()?;
            return Ok(TickOutcome::Evolved {
                generation: self.generation,
            });
        }
        Ok(TickOutcome::Running)
    }

    fn step_agents(&mut self) -> Result<()> {
        if self.params.parallel {
            self.agents.par_iter_mut().try_for_each(Agent::step)
        } else {
            self.agents.iter_mut().try_for_each(Agent::step)
        }
    }

    /// Whether the current generation should end.
    ///
    /// At normal speed every agent must have crashed. Above 1× speed the
    /// generation also ends once `early_finish_threshold` agents have finished.
    /// A pending force-evolve request ends it either way.
    pub fn should_evolve(&self) -> bool {
        let all_done = self.force_evolve || self.agents.iter().all(Agent::is_crashed);
        if self.params.time_scale > 1.0 {
            all_done || self.finished_count() >= self.params.early_finish_threshold
        } else {
            all_done
        }
    }

    /// Ends the current generation and starts the next one.
    pub fn evolve_generation(&mut self) -> Result<()> {
        let summary = self.summarize();

        let population: Vec<Genome> = self.agents.drain(..).map(Agent::into_genome).collect();
        let mut next = self.engine.evolve(population, &mut self.rng)?;
        for genome in &mut next {
            genome.fitness = 0.0;
        }

        self.generation += 1;
        self.last_lap_time = self.lap_time;
        self.lap_time = 0.0;
        self.track.reset_checkpoints();

        let mut agents = Vec::with_capacity(next.len());
        for genome in next {
            let vehicle = self.track.spawn_vehicle();
            agents.push(Agent::new(
                genome,
                &self.params.layer_sizes,
                self.params.car.clone(),
                vehicle,
            )?
            .with_activation(self.params.activation));
        }
        self.agents = agents;
        self.force_evolve = false;

        info!(
            "generation {} done: best {:.3}, mean {:.3}, {} finished, lap {:.2}s",
            summary.generation,
            summary.best_fitness,
            summary.mean_fitness,
            summary.finished,
            summary.lap_time
        );
        self.last_summary = Some(summary);
        Ok(())
    }

    fn summarize(&self) -> GenerationSummary {
        let best_fitness = self
            .agents
            .iter()
            .map(Agent::fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_fitness = if self.agents.is_empty() {
            0.0
        } else {
            self.agents.iter().map(Agent::fitness).sum::<f64>() / self.agents.len() as f64
        };
        GenerationSummary {
            generation: self.generation,
            best_fitness,
            mean_fitness,
            finished: self.finished_count(),
            lap_time: self.lap_time,
        }
    }

    /// Slot of the fittest agent. Only a strictly positive, strictly higher
    /// fitness displaces slot 0.
    pub fn fittest_agent(&self) -> usize {
        let mut best = 0;
        let mut best_fitness = 0.0;
        for (slot, agent) in self.agents.iter().enumerate() {
            if agent.fitness() > best_fitness {
                best = slot;
                best_fitness = agent.fitness();
            }
        }
        best
    }

    /// Requests that the current generation end on the next tick.
    pub fn force_evolve(&mut self) {
        self.force_evolve = true;
    }

    /// Changes the simulation speed multiplier used by the termination rule.
    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<()> {
        if !time_scale.is_finite() || time_scale <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "time_scale must be positive, got {time_scale}"
            )));
        }
        self.params.time_scale = time_scale;
        Ok(())
    }

    /// Schedules a population size for the next [`reset`](Self::reset), clamped
    /// into the configured range. Returns the size that will be used.
    pub fn set_population_size(&mut self, requested: usize) -> usize {
        let size = self.params.clamp_population(requested);
        if size != requested {
            warn!("population size {requested} clamped to {size}");
        }
        self.pending_population = Some(size);
        size
    }

    /// Schedules a topology for the next [`reset`](Self::reset).
    pub fn set_topology(&mut self, layer_sizes: Vec<usize>) -> Result<()> {
        network::validate_topology(&layer_sizes)?;
        debug!("topology {layer_sizes:?} scheduled for next reset");
        self.pending_topology = Some(layer_sizes);
        Ok(())
    }

    /// Applies pending configuration and restarts at generation 1 with a
    /// fresh random population.
    pub fn reset(&mut self) -> Result<()> {
        let mut params = self.params.clone();
        if let Some(size) = self.pending_population {
            params.population_size = size;
        }
        if let Some(topology) = self.pending_topology.clone() {
            params.layer_sizes = topology;
        }
        params.validate()?;

        self.params = params;
        self.pending_population = None;
        self.pending_topology = None;
        self.bootstrap()
    }

    /// Current generation number, starting at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Elapsed time of the current generation.
    pub fn lap_time(&self) -> f64 {
        self.lap_time
    }

    /// Elapsed time recorded when the previous generation ended.
    pub fn last_lap_time(&self) -> f64 {
        self.last_lap_time
    }

    /// Summary of the previous generation, if any.
    pub fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }

    /// Agents of the current generation, in slot order.
    pub fn agents(&self) -> &[Agent<T::Vehicle>] {
        &self.agents
    }

    /// Genomes of the current generation, in slot order.
    pub fn population(&self) -> impl Iterator<Item = &Genome> {
        self.agents.iter().map(Agent::genome)
    }

    /// Agents that reached the finish.
    pub fn finished_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_finished()).count()
    }

    /// Whether any agent reached the finish.
    pub fn any_finished(&self) -> bool {
        self.agents.iter().any(Agent::is_finished)
    }

    /// Active params.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Hosting track.
    pub fn track(&self) -> &T {
        &self.track
    }

    /// Hosting track, mutably.
    pub fn track_mut(&mut self) -> &mut T {
        &mut self.track
    }
}
