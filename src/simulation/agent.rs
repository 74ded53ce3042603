//! Agent: one genome-derived network driving one vehicle for one generation.
//!
//! An agent is `Alive` until it crashes or finishes. Both states are terminal and
//! finishing implies crashing. While alive, every [`Agent::step`] runs
//! sense → infer → act.

use std::collections::HashSet;

use rand::Rng;

use super::car::{Car, CarParams};
use super::environment::{CheckpointId, Contact, Vehicle};
use super::error::{Result, ShapeContext, SimulationError};
use super::genome::Genome;
use super::network::NeuralNetwork;
use super::network::layer::Activation;

/// Number of actions a controller network must produce: throttle and steer.
pub const ACTION_SIZE: usize = 2;

/// Runtime pairing of a controller network with a vehicle.
#[derive(Debug)]
pub struct Agent<V> {
    network: NeuralNetwork,
    genome: Genome,
    car: Car,
    vehicle: V,
    crashed: bool,
    finished: bool,
    scored: HashSet<CheckpointId>,
}

impl<V: Vehicle> Agent<V> {
    /// Builds an agent whose network is decoded from `genome`.
    pub fn new(genome: Genome, topology: &[usize], car: CarParams, vehicle: V) -> Result<Self> {
        let mut network = NeuralNetwork::new(topology)?;
        network.set_parameters(genome.genes())?;
        Ok(Self::from_parts(network, genome, car, vehicle))
    }

    /// Builds an agent around a freshly randomized network and wraps its
    /// parameters into a new genome.
    pub fn new_random<R: Rng + ?Sized>(
        topology: &[usize],
        range: f64,
        shift: f64,
        car: CarParams,
        vehicle: V,
        rng: &mut R,
    ) -> Result<Self> {
        let mut network = NeuralNetwork::new(topology)?;
        network.initialize_random(range, shift, rng);
        let genome = Genome::new(network.parameters());
        Ok(Self::from_parts(network, genome, car, vehicle))
    }

    /// Switches every layer of the controller network to `activation`.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.network = self.network.with_activation(activation);
        self
    }

    fn from_parts(network: NeuralNetwork, genome: Genome, car: CarParams, vehicle: V) -> Self {
        Self {
            network,
            genome,
            car: Car::new(car),
            vehicle,
            crashed: false,
            finished: false,
            scored: HashSet::new(),
        }
    }

    /// Runs one tick of sensing, inference and actuation. Does nothing once
    /// the agent has crashed.
    pub fn step(&mut self) -> Result<()> {
        if self.crashed {
            return Ok(());
        }

        let distances = self.vehicle.distances();
        if distances.len() != self.network.input_size() {
            return Err(SimulationError::shape(
                ShapeContext::SensorInput,
                self.network.input_size(),
                distances.len(),
            ));
        }

        let action = self.network.feed_forward(&distances)?;
        if action.len() != ACTION_SIZE {
            return Err(SimulationError::shape(
                ShapeContext::ActionOutput,
                ACTION_SIZE,
                action.len(),
            ));
        }

        self.car.apply_throttle(action[0])?;
        self.car.apply_steer(action[1])?;

        if self
            .vehicle
            .advance(self.car.velocity(), self.car.turn_delta())
        {
            self.crashed = true;
        }
        Ok(())
    }

    /// Scores a checkpoint the first time this agent touches it.
    ///
    /// `price` is only called for a new checkpoint, so repeat contacts neither
    /// add fitness nor count as crossings. Returns whether points were awarded.
    pub fn score_checkpoint(
        &mut self,
        checkpoint: CheckpointId,
        price: impl FnOnce(CheckpointId) -> f64,
    ) -> bool {
        if !self.scored.insert(checkpoint) {
            return false;
        }
        self.genome.fitness += price(checkpoint);
        true
    }

    /// Marks the agent finished, which also ends its run.
    pub fn finish(&mut self) {
        self.finished = true;
        self.crashed = true;
    }

    /// Drains the markers the vehicle touched since the last call.
    pub fn take_contacts(&mut self) -> Vec<Contact> {
        self.vehicle.take_contacts()
    }

    /// Whether the run is over.
    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// Whether the agent reached the finish.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fitness accumulated so far.
    pub fn fitness(&self) -> f64 {
        self.genome.fitness
    }

    /// Genome this agent was built from.
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Controller network.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Car kinematics.
    pub fn car(&self) -> &Car {
        &self.car
    }

    /// Vehicle body.
    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    /// Ends the agent, handing its genome back. The vehicle is dropped.
    pub fn into_genome(self) -> Genome {
        self.genome
    }
}
