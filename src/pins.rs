//! Pin registry and default wiring for the Raspberry Pi Zero W header.
//!
//! Single source of truth for which BCM pins the bridge may touch.  Every
//! operation validates against [`VALID_PINS`] before any hardware access.

use crate::error::{Error, Result};

/// BCM GPIO number.
pub type PinId = u8;

// ---------------------------------------------------------------------------
// Allow-list
// ---------------------------------------------------------------------------

/// Number of controllable pins.
pub const PIN_COUNT: usize = 18;

/// Controllable pins for the Pi Zero W (BCM numbering).  Sorted.
pub const VALID_PINS: [PinId; PIN_COUNT] = [
    2, 3, 4, 7, 8, 9, 10, 11, 12, 14, 15, 17, 18, 22, 23, 24, 25, 27,
];

/// True iff `pin` is in the allow-list.
pub fn is_valid(pin: PinId) -> bool {
    VALID_PINS.binary_search(&pin).is_ok()
}

/// Convert a raw request value into a [`PinId`], rejecting anything
/// outside the allow-list (including values that don't fit a `u8`).
pub fn parse(raw: i64) -> Result<PinId> {
    match PinId::try_from(raw) {
        Ok(pin) if is_valid(pin) => Ok(pin),
        _ => Err(Error::InvalidPin(raw)),
    }
}

// ---------------------------------------------------------------------------
// L298N dual H-bridge, default wiring
// ---------------------------------------------------------------------------

/// Left motor (A): ENA, PWM speed.
pub const MOTOR_LEFT_ENABLE: PinId = 18;
/// Left motor (A): IN1, HIGH = forward.
pub const MOTOR_LEFT_FORWARD: PinId = 17;
/// Left motor (A): IN2, HIGH = backward.
pub const MOTOR_LEFT_BACKWARD: PinId = 27;

/// Right motor (B): ENB, PWM speed.
pub const MOTOR_RIGHT_ENABLE: PinId = 12;
/// Right motor (B): IN3, HIGH = forward.
pub const MOTOR_RIGHT_FORWARD: PinId = 22;
/// Right motor (B): IN4, HIGH = backward.
pub const MOTOR_RIGHT_BACKWARD: PinId = 23;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Software PWM carrier (1 kHz; higher is smoother but costs CPU).
pub const PWM_FREQ_HZ: u32 = 1_000;
