//! Inbound commands to the application service.
//!
//! These represent the operations a remote client can request.  The RPC
//! engine validates wire input (pin allow-list, mode names, required
//! fields) before building a command, so every variant carries typed,
//! already-parsed values.

use crate::app::controller::PinMode;
use crate::pins::PinId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Drive a pin HIGH/LOW, switching it to output if needed.
    SetDigital { pin: PinId, level: bool },

    /// Set a PWM duty cycle (clamped to 0–100), switching to PWM if needed.
    SetPwm { pin: PinId, duty: f32 },

    /// Explicit mode change.
    SetMode { pin: PinId, mode: PinMode },

    /// Report every registry pin.
    Status,

    /// Signed speeds for both motors (clamped to ±100).
    Drive { left: i64, right: i64 },

    /// Emergency stop for both motors.
    StopMotors,

    /// Last recorded enable duty per motor.
    MotorStatus,

    /// Liveness probe.
    Health,
}
