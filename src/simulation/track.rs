//! Headless ring track.
//!
//! The road is the annulus between two circles centred on the origin. Cars start
//! at angle 0 in the middle of the lane, facing counter-clockwise, and finish
//! after one full lap. Checkpoint gates are spaced evenly along the lap.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use serde::{Deserialize, Serialize};

use super::environment::{CheckpointId, CheckpointScores, Contact, Track, Vehicle};

/// Ray headings relative to the car: left, forward-left, forward, forward-right, right.
pub const RAY_ANGLES: [f64; 5] = [FRAC_PI_2, FRAC_PI_4, 0.0, -FRAC_PI_4, -FRAC_PI_2];

/// Index of the forward ray in [`RAY_ANGLES`].
const FORWARD_RAY: usize = 2;

/// Geometry of a ring track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingParams {
    /// Radius of the inner wall.
    pub inner_radius: f64,
    /// Radius of the outer wall.
    pub outer_radius: f64,
    /// Number of scoring gates per lap.
    pub checkpoints: usize,
    /// Sensor range; misses read this value.
    pub max_distance: f64,
    /// Readings below this distance read 0.
    pub min_distance: f64,
    /// Points per crossing order, first crosser first.
    pub points: Vec<f64>,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            inner_radius: 4.0,
            outer_radius: 6.0,
            checkpoints: 12,
            max_distance: 5.0,
            min_distance: 0.0325,
            points: vec![1.5, 1.2, 1.0],
        }
    }
}

/// A car on a [`RingTrack`].
#[derive(Debug, Clone)]
pub struct RingCar {
    params: RingParams,
    x: f64,
    y: f64,
    heading: f64,
    /// Unwrapped angle travelled around the centre.
    progress: f64,
    contacts: Vec<Contact>,
}

impl RingCar {
    fn new(params: RingParams) -> Self {
        let mid = (params.inner_radius + params.outer_radius) / 2.0;
        Self {
            params,
            x: mid,
            y: 0.0,
            heading: FRAC_PI_2,
            progress: 0.0,
            contacts: Vec::new(),
        }
    }

    /// Position on the plane.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Fraction of the lap completed, 1.0 at the finish.
    pub fn lap_fraction(&self) -> f64 {
        self.progress / TAU
    }

    fn ray_distance(&self, angle: f64) -> f64 {
        let (dx, dy) = (angle.cos(), angle.sin());
        let b = self.x * dx + self.y * dy;
        let r2 = self.x * self.x + self.y * self.y;

        let mut nearest = self.params.max_distance;
        for radius in [self.params.inner_radius, self.params.outer_radius] {
            if let Some(t) = first_hit(b, r2 - radius * radius) {
                nearest = nearest.min(t);
            }
        }
        if nearest < self.params.min_distance {
            0.0
        } else {
            nearest
        }
    }

    fn gate_angle(&self, gate: usize) -> f64 {
        TAU * (gate + 1) as f64 / (self.params.checkpoints + 1) as f64
    }

    fn record_progress(&mut self, before: f64) {
        let after = self.progress;
        if after <= before {
            return;
        }
        for gate in 0..self.params.checkpoints {
            let angle = self.gate_angle(gate);
            if before < angle && angle <= after {
                self.contacts.push(Contact::Checkpoint(gate));
            }
        }
        if before < TAU && TAU <= after {
            self.contacts.push(Contact::Finish);
        }
    }
}

/// Smallest positive root of `t² + 2bt + c = 0`, the ray parameter of the first
/// wall crossing.
fn first_hit(b: f64, c: f64) -> Option<f64> {
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t > 0.0)
}

/// Wraps an angle difference into `(-π, π]`.
fn wrap_angle(delta: f64) -> f64 {
    let wrapped = delta.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

impl Vehicle for RingCar {
    fn distances(&self) -> Vec<f64> {
        RAY_ANGLES
            .iter()
            .map(|offset| self.ray_distance(self.heading + offset))
            .collect()
    }

    fn advance(&mut self, velocity: f64, turn: f64) -> bool {
        let distances = self.distances();
        if distances.contains(&0.0) {
            return true;
        }

        let mut crashed = false;
        let mut travel = velocity;
        if distances[FORWARD_RAY] < travel {
            crashed = true;
            travel = distances[FORWARD_RAY];
        }

        let before_angle = self.y.atan2(self.x);
        self.x += travel * self.heading.cos();
        self.y += travel * self.heading.sin();
        self.heading += turn;

        let before = self.progress;
        self.progress += wrap_angle(self.y.atan2(self.x) - before_angle);
        self.record_progress(before);

        crashed
    }

    fn take_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }
}

/// Ring track with tiered checkpoint scoring.
#[derive(Debug, Clone)]
pub struct RingTrack {
    params: RingParams,
    scores: CheckpointScores,
}

impl Default for RingTrack {
    fn default() -> Self {
        Self::new(RingParams::default())
    }
}

impl RingTrack {
    /// Creates a track from its geometry.
    pub fn new(params: RingParams) -> Self {
        let scores = CheckpointScores::new(params.points.clone());
        Self { params, scores }
    }

    /// Track geometry.
    pub fn params(&self) -> &RingParams {
        &self.params
    }

    /// Checkpoint scorer.
    pub fn scores(&self) -> &CheckpointScores {
        &self.scores
    }
}

impl Track for RingTrack {
    type Vehicle = RingCar;

    fn spawn_vehicle(&mut self) -> RingCar {
        RingCar::new(self.params.clone())
    }

    fn point_value(&mut self, checkpoint: CheckpointId) -> f64 {
        self.scores.point_value(checkpoint)
    }

    fn reset_checkpoints(&mut self) {
        self.scores.reset();
    }
}
