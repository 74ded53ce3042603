//! Collaborator traits the engine drives but does not implement.
//!
//! A [`Track`] spawns one [`Vehicle`] per agent each generation and prices
//! checkpoint crossings. Vehicles expose distance sensors, move the body and
//! report which markers they touched.

use std::collections::HashMap;

/// Identifier of a scoring checkpoint on a track.
pub type CheckpointId = usize;

/// A marker touched by a vehicle during its last advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Crossed a scoring checkpoint.
    Checkpoint(CheckpointId),
    /// Reached the finish line.
    Finish,
}

/// Sensor and physical body of one vehicle.
pub trait Vehicle: Send {
    /// Distances to the nearest obstacle along each ray, in a fixed order.
    ///
    /// Each value lies in `[0, max_distance]`; 0 means a collision is imminent.
    fn distances(&self) -> Vec<f64>;

    /// Moves the body by `velocity` and turns it by `turn`. Returns `true` when
    /// this move crashed the vehicle.
    fn advance(&mut self, velocity: f64, turn: f64) -> bool;

    /// Markers touched since the last call, in the order they were touched.
    fn take_contacts(&mut self) -> Vec<Contact> {
        Vec::new()
    }
}

/// Environment that hosts the vehicles and scores checkpoints.
pub trait Track {
    /// Vehicle type placed on this track.
    type Vehicle: Vehicle;

    /// Places a fresh vehicle at the start.
    fn spawn_vehicle(&mut self) -> Self::Vehicle;

    /// Points for the next crossing of `checkpoint`. Each call counts as a crossing.
    fn point_value(&mut self, checkpoint: CheckpointId) -> f64;

    /// Forgets every crossing; called once per generation.
    fn reset_checkpoints(&mut self);
}

/// Default checkpoint pricing: earlier crossers earn higher tiers.
#[derive(Debug, Clone)]
pub struct CheckpointScores {
    tiers: Vec<f64>,
    crossings: HashMap<CheckpointId, usize>,
}

impl Default for CheckpointScores {
    fn default() -> Self {
        Self::new(vec![1.5, 1.2, 1.0])
    }
}

impl CheckpointScores {
    /// Creates a scorer. `tiers[0]` goes to the first crosser; later crossers get
    /// later tiers down to the last one. An empty tier list scores nothing.
    pub fn new(tiers: Vec<f64>) -> Self {
        Self {
            tiers,
            crossings: HashMap::new(),
        }
    }

    /// Records a crossing and returns its points.
    pub fn point_value(&mut self, checkpoint: CheckpointId) -> f64 {
        let count = self.crossings.entry(checkpoint).or_insert(0);
        let tier = (*count).min(self.tiers.len().saturating_sub(1));
        *count += 1;
        self.tiers.get(tier).copied().unwrap_or(0.0)
    }

    /// Number of crossings recorded for `checkpoint`.
    pub fn crossings(&self, checkpoint: CheckpointId) -> usize {
        self.crossings.get(&checkpoint).copied().unwrap_or(0)
    }

    /// Zeroes every crossing counter.
    pub fn reset(&mut self) {
        self.crossings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_decrease_then_clamp() {
        let mut scores = CheckpointScores::default();
        let points: Vec<f64> = (0..5).map(|_| scores.point_value(3)).collect();
        assert_eq!(points, vec![1.5, 1.2, 1.0, 1.0, 1.0]);
        assert_eq!(scores.point_value(4), 1.5);
        assert_eq!(scores.crossings(3), 5);
    }

    #[test]
    fn reset_restores_top_tier() {
        let mut scores = CheckpointScores::default();
        scores.point_value(0);
        scores.point_value(0);
        scores.reset();
        assert_eq!(scores.crossings(0), 0);
        assert_eq!(scores.point_value(0), 1.5);
    }
}
