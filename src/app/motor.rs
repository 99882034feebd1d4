//! Differential drive over an L298N dual H-bridge.
//!
//! Each motor is two direction pins plus one PWM enable pin:
//!
//! | speed | forward | backward | enable duty |
//! |-------|---------|----------|-------------|
//! | > 0   | HIGH    | LOW      | speed       |
//! | < 0   | LOW     | HIGH     | -speed      |
//! | 0     | LOW     | LOW      | 0 (brake)   |
//!
//! Zero speed always brakes; the bridge's free-running stop (enable LOW
//! with arbitrary direction) is never used.
//!
//! The caller holds the pin-table lock for the whole compound operation, so
//! both motors change together with respect to other requests.

use log::{info, warn};
use serde::Serialize;

use super::controller::PinController;
use super::ports::HardwareDriver;
use crate::config::{MotorConfig, MotorPins};
use crate::error::Result;
use crate::pins::PinId;

/// Speed magnitude limit in both directions.
pub const MAX_SPEED: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Motor {
    Left,
    Right,
}

/// Clamp a signed speed to [-100, 100].
pub fn clamp_speed(speed: i64) -> i64 {
    speed.clamp(-MAX_SPEED, MAX_SPEED)
}

/// Direction pin levels `(forward, backward)` for a signed speed.
fn direction_levels(speed: i64) -> (bool, bool) {
    match speed.signum() {
        1 => (true, false),
        -1 => (false, true),
        _ => (false, false),
    }
}

/// Last recorded enable duty for one motor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotorReading {
    pub enable_pin: PinId,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotorStatus {
    pub left: MotorReading,
    pub right: MotorReading,
}

/// Stateless translator from signed speeds to pin operations.
#[derive(Debug, Clone, Copy)]
pub struct MotorDrive {
    wiring: MotorConfig,
}

impl MotorDrive {
    pub fn new(wiring: MotorConfig) -> Self {
        Self { wiring }
    }

    pub fn pins(&self, motor: Motor) -> MotorPins {
        match motor {
            Motor::Left => self.wiring.left,
            Motor::Right => self.wiring.right,
        }
    }

    /// Apply both speeds, left then right.  Returns the clamped pair.
    pub fn drive<D: HardwareDriver>(
        &self,
        ctl: &mut PinController<D>,
        left: i64,
        right: i64,
    ) -> Result<(i64, i64)> {
        let left = clamp_speed(left);
        let right = clamp_speed(right);

        self.apply(ctl, Motor::Left, left)?;
        self.apply(ctl, Motor::Right, right)?;

        info!("Motor drive: left={}, right={}", left, right);
        Ok((left, right))
    }

    /// Emergency stop: both direction pairs LOW, both enables at 0 %.
    ///
    /// Pins are configured as needed, so this works from any prior state.
    /// Every step is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn stop<D: HardwareDriver>(&self, ctl: &mut PinController<D>) -> Result<()> {
        let mut first_err = None;
        for motor in [Motor::Left, Motor::Right] {
            let pins = self.pins(motor);
            let steps = [
                ctl.write_digital(pins.forward, false).map(drop),
                ctl.write_digital(pins.backward, false).map(drop),
                ctl.write_pwm(pins.enable, 0.0).map(drop),
            ];
            for step in steps {
                if let Err(e) = step {
                    warn!("Motor stop ({:?}): {}", motor, e);
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                info!("Motors stopped");
                Ok(())
            }
        }
    }

    /// Last recorded enable-pin duty per motor; 0 if never driven.
    pub fn status<D: HardwareDriver>(&self, ctl: &PinController<D>) -> MotorStatus {
        let reading = |motor| {
            let enable_pin = self.pins(motor).enable;
            MotorReading {
                enable_pin,
                speed: ctl.duty(enable_pin),
            }
        };
        MotorStatus {
            left: reading(Motor::Left),
            right: reading(Motor::Right),
        }
    }

    fn apply<D: HardwareDriver>(
        &self,
        ctl: &mut PinController<D>,
        motor: Motor,
        speed: i64,
    ) -> Result<()> {
        let pins = self.pins(motor);
        let (fwd, bwd) = direction_levels(speed);
        ctl.write_digital(pins.forward, fwd)?;
        ctl.write_digital(pins.backward, bwd)?;
        ctl.write_pwm(pins.enable, speed.unsigned_abs() as f32)?;
        Ok(())
    }
}
