//! Results returned by the application service.
//!
//! The RPC layer maps these onto wire replies; nothing here knows about
//! JSON field names.

use crate::app::controller::PinMode;
use crate::app::motor::MotorStatus;
use crate::pins::{PIN_COUNT, PinId};

/// Successful outcome of an [`AppCommand`](super::commands::AppCommand).
#[derive(Debug, Clone, PartialEq)]
pub enum AppResponse {
    Digital { pin: PinId, level: bool },
    Pwm { pin: PinId, duty: f32 },
    Mode { pin: PinId, mode: PinMode },
    Status(StatusReport),
    Drive { left: i64, right: i64 },
    Stopped,
    Motors(MotorStatus),
    Health(HealthReport),
}

/// One registry pin as seen by a status query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinReport {
    pub pin: PinId,
    pub mode: PinMode,
    /// Output level, live input level, or `duty > 0` for PWM pins.
    pub level: bool,
    /// Present only for PWM pins.
    pub duty: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Every registry pin, ascending.
    pub pins: Vec<PinReport>,
}

impl StatusReport {
    pub fn get(&self, pin: PinId) -> Option<&PinReport> {
        self.pins.iter().find(|r| r.pin == pin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Pins that have left `Unconfigured`, ascending.
    pub configured_pins: heapless::Vec<PinId, PIN_COUNT>,
}
