//! Unified error types for the GPIO bridge.
//!
//! A single `Error` enum that every layer funnels into, so the RPC engine
//! can map any failure onto one wire shape.  All variants are `Copy` so they
//! can be logged at the point of detection and still be returned by value.

use core::fmt;

use crate::app::controller::PinMode;
use crate::pins::PinId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the bridge funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Pin number is not in the board allow-list.  Carries the raw request
    /// value, which may not even fit a [`PinId`].
    InvalidPin(i64),
    /// A request field was missing or malformed.
    InvalidParameter(&'static str),
    /// Mode string was not one of `input` / `output`.
    InvalidMode,
    /// The operation is incompatible with the pin's current mode.
    WrongMode { pin: PinId, mode: PinMode },
    /// A PWM channel already exists for this pin.
    AlreadyActive(PinId),
    /// No PWM channel exists for this pin.
    NoActiveChannel(PinId),
    /// The hardware driver rejected a call.
    HardwareFault(DriverError),
}

impl Error {
    /// Stable snake_case tag used in wire replies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPin(_) => "invalid_pin",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::InvalidMode => "invalid_mode",
            Self::WrongMode { .. } => "wrong_mode",
            Self::AlreadyActive(_) => "already_active",
            Self::NoActiveChannel(_) => "no_active_channel",
            Self::HardwareFault(_) => "hardware_fault",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "Invalid GPIO pin: {pin}"),
            Self::InvalidParameter(msg) => write!(f, "{msg}"),
            Self::InvalidMode => write!(f, "Mode must be \"input\" or \"output\""),
            Self::WrongMode { pin, mode } => {
                write!(f, "GPIO {pin} is in {mode} mode")
            }
            Self::AlreadyActive(pin) => write!(f, "PWM already active on GPIO {pin}"),
            Self::NoActiveChannel(pin) => write!(f, "no PWM channel on GPIO {pin}"),
            Self::HardwareFault(e) => write!(f, "hardware: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`HardwareDriver`](crate::app::ports::HardwareDriver).
///
/// Drivers log the underlying cause themselves; only the category and pin
/// cross the port boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The GPIO peripheral could not be opened or is gone.
    Unavailable,
    /// The pin has not been configured for the requested operation.
    NotConfigured(PinId),
    /// The PWM handle does not refer to a running generator.
    UnknownChannel(PinId),
    /// A register or device I/O operation failed.
    Io(PinId),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "GPIO peripheral unavailable"),
            Self::NotConfigured(pin) => write!(f, "GPIO {pin} not configured"),
            Self::UnknownChannel(pin) => write!(f, "no PWM generator on GPIO {pin}"),
            Self::Io(pin) => write!(f, "I/O failure on GPIO {pin}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::HardwareFault(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
