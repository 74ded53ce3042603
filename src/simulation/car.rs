//! Car kinematics: the actuator side of a vehicle.

use serde::{Deserialize, Serialize};

use super::error::{ActionKind, Result, SimulationError};

/// Limits of a car's motion per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    /// Top speed (distance per tick).
    pub max_speed: f64,
    /// Lowest speed; a moving car never fully stops.
    pub min_speed: f64,
    /// Largest speed change per tick.
    pub max_acceleration: f64,
    /// Largest heading change per tick, in radians.
    pub max_turn_angle: f64,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            max_speed: 0.12,
            min_speed: 0.1,
            max_acceleration: 0.01,
            max_turn_angle: 0.08,
        }
    }
}

impl CarParams {
    /// Requires finite limits with `0 <= min_speed <= max_speed`.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_speed", self.max_speed),
            ("min_speed", self.min_speed),
            ("max_acceleration", self.max_acceleration),
            ("max_turn_angle", self.max_turn_angle),
        ];
        for (name, value) in limits {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "car.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.min_speed > self.max_speed {
            return Err(SimulationError::InvalidConfiguration(format!(
                "car.min_speed {} exceeds car.max_speed {}",
                self.min_speed, self.max_speed
            )));
        }
        Ok(())
    }
}

/// Velocity and turn state driven by network outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    params: CarParams,
    velocity: f64,
    turn_delta: f64,
}

impl Car {
    /// A stationary car with no turn applied.
    pub fn new(params: CarParams) -> Self {
        Self {
            params,
            velocity: 0.0,
            turn_delta: 0.0,
        }
    }

    /// Current speed.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Heading change applied on the next advance.
    pub fn turn_delta(&self) -> f64 {
        self.turn_delta
    }

    /// Accelerates by `multiplier * max_acceleration`, clamping speed to
    /// `[min_speed, max_speed]`.
    pub fn apply_throttle(&mut self, multiplier: f64) -> Result<()> {
        check_multiplier(ActionKind::Throttle, multiplier)?;
        self.velocity = (self.velocity + multiplier * self.params.max_acceleration)
            .clamp(self.params.min_speed, self.params.max_speed);
        Ok(())
    }

    /// Sets the turn to `multiplier * max_turn_angle`.
    pub fn apply_steer(&mut self, multiplier: f64) -> Result<()> {
        check_multiplier(ActionKind::Steer, multiplier)?;
        self.turn_delta = multiplier * self.params.max_turn_angle;
        Ok(())
    }
}

fn check_multiplier(kind: ActionKind, value: f64) -> Result<()> {
    // NaN fails the range test too
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::OutOfRangeAction { kind, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_clamps_speed() {
        let mut car = Car::new(CarParams::default());
        car.apply_throttle(-1.0).unwrap();
        assert_eq!(car.velocity(), 0.1);
        for _ in 0..10 {
            car.apply_throttle(1.0).unwrap();
        }
        assert_eq!(car.velocity(), 0.12);
    }

    #[test]
    fn steer_scales_turn_angle() {
        let mut car = Car::new(CarParams::default());
        car.apply_steer(-0.5).unwrap();
        assert_eq!(car.turn_delta(), -0.04);
    }

    #[test]
    fn out_of_range_multipliers_are_rejected() {
        let mut car = Car::new(CarParams::default());
        assert!(matches!(
            car.apply_throttle(1.5),
            Err(SimulationError::OutOfRangeAction {
                kind: ActionKind::Throttle,
                ..
            })
        ));
        assert!(matches!(
            car.apply_steer(f64::NAN),
            Err(SimulationError::OutOfRangeAction {
                kind: ActionKind::Steer,
                ..
            })
        ));
        assert_eq!(car.velocity(), 0.0);
    }

    #[test]
    fn inverted_or_nan_speed_limits_are_rejected() {
        assert!(CarParams::default().validate().is_ok());

        let inverted = CarParams {
            min_speed: 0.5,
            ..CarParams::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let nan = CarParams {
            max_turn_angle: f64::NAN,
            ..CarParams::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }
}
