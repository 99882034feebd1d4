//! System configuration parameters
//!
//! All tunable parameters for the bridge.  Values can be overridden by a
//! JSON config file (see [`crate::adapters::config_file`]) and the CLI.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins::{self, PinId};

/// Pin triple for one side of the L298N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPins {
    /// Direction pin driven HIGH for positive speed.
    pub forward: PinId,
    /// Direction pin driven HIGH for negative speed.
    pub backward: PinId,
    /// PWM-capable enable pin; duty = |speed|.
    pub enable: PinId,
}

impl MotorPins {
    fn all(&self) -> [PinId; 3] {
        [self.forward, self.backward, self.enable]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub left: MotorPins,
    pub right: MotorPins,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            left: MotorPins {
                forward: pins::MOTOR_LEFT_FORWARD,
                backward: pins::MOTOR_LEFT_BACKWARD,
                enable: pins::MOTOR_LEFT_ENABLE,
            },
            right: MotorPins {
                forward: pins::MOTOR_RIGHT_FORWARD,
                backward: pins::MOTOR_RIGHT_BACKWARD,
                enable: pins::MOTOR_RIGHT_ENABLE,
            },
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Network ---
    /// Listen address for the JSON-over-TCP server
    pub bind_addr: String,
    /// Longest accepted request line in bytes
    pub max_frame_bytes: usize,

    // --- PWM ---
    /// Carrier frequency for every PWM channel (Hz)
    pub pwm_frequency_hz: u32,

    // --- Motors ---
    pub motors: MotorConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::from("0.0.0.0:3001"),
            max_frame_bytes: 1024,
            pwm_frequency_hz: pins::PWM_FREQ_HZ,
            motors: MotorConfig::default(),
        }
    }
}

/// Range-check a configuration.  Invalid values are rejected, not clamped.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(1..=100_000).contains(&cfg.pwm_frequency_hz) {
        return Err(ConfigError::ValidationFailed(
            "pwm_frequency_hz must be 1–100000",
        ));
    }
    if !(64..=65_536).contains(&cfg.max_frame_bytes) {
        return Err(ConfigError::ValidationFailed(
            "max_frame_bytes must be 64–65536",
        ));
    }

    let mut motor_pins: heapless::Vec<PinId, 6> = heapless::Vec::new();
    for pin in cfg.motors.left.all().into_iter().chain(cfg.motors.right.all()) {
        if !pins::is_valid(pin) {
            return Err(ConfigError::ValidationFailed(
                "motor pins must be in the GPIO allow-list",
            ));
        }
        if motor_pins.contains(&pin) {
            return Err(ConfigError::ValidationFailed("motor pins must be distinct"));
        }
        // Capacity is exactly the six motor pins.
        let _ = motor_pins.push(pin);
    }

    Ok(())
}
