//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PinController / AppService (domain)
//! ```
//!
//! The GPIO peripheral is reached only through [`HardwareDriver`]; the
//! domain core never touches registers directly.  Drivers are passed to the
//! PWM channel manager at call sites, so one driver instance serves both
//! digital and PWM traffic.

use crate::config::SystemConfig;
use crate::error::DriverError;
use crate::pins::PinId;

// ───────────────────────────────────────────────────────────────
// Hardware driver port (driven adapter: domain → GPIO peripheral)
// ───────────────────────────────────────────────────────────────

/// Input bias resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Down,
    Up,
}

/// Electrical line configuration requested from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Output,
    Input(Pull),
}

/// Opaque token for a running PWM generator.
///
/// Only drivers mint handles; the channel manager owns them.
#[derive(Debug, PartialEq, Eq)]
pub struct PwmHandle {
    pin: PinId,
    frequency_hz: u32,
}

impl PwmHandle {
    /// For driver implementations only.
    pub fn new(pin: PinId, frequency_hz: u32) -> Self {
        Self { pin, frequency_hz }
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}

/// Raw GPIO capability.  Calls are synchronous and bounded.
pub trait HardwareDriver {
    /// Configure `pin` as a digital output or input.
    fn configure(&mut self, pin: PinId, mode: LineMode) -> Result<(), DriverError>;

    /// Drive an output pin HIGH (`true`) or LOW.
    fn write_digital(&mut self, pin: PinId, high: bool) -> Result<(), DriverError>;

    /// Sample an input pin.
    fn read_digital(&mut self, pin: PinId) -> Result<bool, DriverError>;

    /// Start a generator on an output pin at 0 % duty.
    fn pwm_start(&mut self, pin: PinId, frequency_hz: u32) -> Result<PwmHandle, DriverError>;

    /// Change duty cycle (0–100, already clamped by the caller).
    fn pwm_set_duty(&mut self, handle: &PwmHandle, percent: f32) -> Result<(), DriverError>;

    /// Halt a generator.  The pin is left as a LOW output.
    fn pwm_stop(&mut self, handle: &PwmHandle) -> Result<(), DriverError>;

    /// Return every claimed line to its power-on state.
    fn release_all(&mut self) -> Result<(), DriverError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ← persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST run [`validate_config`](crate::config::validate_config)
/// before returning, and MUST reject invalid values rather than clamp them.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
