//! Event system for marker contacts.
//!
//! Agents may step in parallel, so contacts are collected into a queue after
//! the step phase and applied serially in agent-slot order. That keeps
//! checkpoint tiers deterministic.

use super::agent::Agent;
use super::environment::{CheckpointId, Contact, Track, Vehicle};

/// Events that modify agent fitness or state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEvent {
    /// An agent touched a checkpoint.
    CheckpointReached {
        /// Slot of the agent.
        agent: usize,
        /// Checkpoint touched.
        checkpoint: CheckpointId,
    },
    /// An agent touched the finish line.
    FinishReached {
        /// Slot of the agent.
        agent: usize,
    },
}

/// Queue for collecting events after a step phase.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }

    /// Collects every vehicle's contacts, slot by slot.
    pub fn collect<V: Vehicle>(agents: &mut [Agent<V>]) -> Self {
        let mut queue = Self::new();
        for (slot, agent) in agents.iter_mut().enumerate() {
            for contact in agent.take_contacts() {
                queue.push(match contact {
                    Contact::Checkpoint(checkpoint) => SimulationEvent::CheckpointReached {
                        agent: slot,
                        checkpoint,
                    },
                    Contact::Finish => SimulationEvent::FinishReached { agent: slot },
                });
            }
        }
        queue
    }
}

/// Applies all queued events to the agents.
pub fn apply_events<T: Track>(agents: &mut [Agent<T::Vehicle>], track: &mut T, mut queue: EventQueue) {
    for event in queue.drain() {
        match event {
            SimulationEvent::CheckpointReached { agent, checkpoint } => {
                if let Some(agent) = agents.get_mut(agent) {
                    agent.score_checkpoint(checkpoint, |id| track.point_value(id));
                }
            }
            SimulationEvent::FinishReached { agent } => {
                if let Some(agent) = agents.get_mut(agent) {
                    agent.finish();
                }
            }
        }
    }
}
