//! Pin state manager.
//!
//! [`PinController`] is the only owner of the hardware driver and the PWM
//! channel table.  Every pin moves through a small state machine:
//!
//! ```text
//!  Unconfigured ──▶ Output ◀──▶ Input
//!        │            ▲           ▲
//!        │            │           │      leaving Pwm stops the
//!        └──────────▶ Pwm ────────┘      generator first
//! ```
//!
//! ## Invariants
//!
//! - A recorded `Pwm` pin always has a generator in [`PwmChannels`].
//! - Leaving `Pwm` stops the generator *before* the line is reconfigured.
//! - Pins outside the allow-list are rejected before any driver call.
//! - On a driver fault the recorded state is left as it was, except when a
//!   generator was already released: such a pin drops to `Unconfigured`.

use std::collections::BTreeMap;
use std::fmt;

use log::{error, info, warn};
use serde::Serialize;

use super::ports::{HardwareDriver, LineMode, Pull};
use super::pwm::{PwmChannels, clamp_percent};
use crate::error::{DriverError, Error, Result};
use crate::pins::{self, PinId};

/// Externally visible pin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    Unconfigured,
    Output,
    Input,
    Pwm,
}

impl PinMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Output => "output",
            Self::Input => "input",
            Self::Pwm => "pwm",
        }
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded per-pin state.  Unconfigured pins have no entry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PinState {
    Output { level: bool },
    /// Input levels are never cached.
    Input,
    Pwm { duty: f32 },
}

impl PinState {
    fn mode(self) -> PinMode {
        match self {
            Self::Output { .. } => PinMode::Output,
            Self::Input => PinMode::Input,
            Self::Pwm { .. } => PinMode::Pwm,
        }
    }
}

/// Value half of a snapshot entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinValue {
    Level(bool),
    Duty(f32),
    /// Input pin; must be sampled from hardware.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinSnapshot {
    pub mode: PinMode,
    pub value: PinValue,
}

impl PinSnapshot {
    const UNCONFIGURED: Self = Self {
        mode: PinMode::Unconfigured,
        value: PinValue::Level(false),
    };
}

/// Owns the driver, the per-pin state table and the PWM channel table.
pub struct PinController<D: HardwareDriver> {
    hw: D,
    pins: BTreeMap<PinId, PinState>,
    pwm: PwmChannels,
    pwm_frequency_hz: u32,
}

impl<D: HardwareDriver> PinController<D> {
    pub fn new(hw: D, pwm_frequency_hz: u32) -> Self {
        Self {
            hw,
            pins: BTreeMap::new(),
            pwm: PwmChannels::new(),
            pwm_frequency_hz,
        }
    }

    // ── Transitions ───────────────────────────────────────────

    /// Move `pin` into `target` mode.
    ///
    /// Re-entering the current mode is a no-op: an output keeps its level
    /// and a PWM pin keeps its generator and duty.
    pub fn set_mode(&mut self, pin: PinId, target: PinMode) -> Result<()> {
        Self::check_pin(pin)?;
        match target {
            PinMode::Output => self.enter_output(pin),
            PinMode::Input => self.enter_input(pin),
            PinMode::Pwm => self.enter_pwm(pin),
            PinMode::Unconfigured => {
                warn!("GPIO {}: cannot transition to unconfigured", pin);
                Err(Error::InvalidMode)
            }
        }
    }

    /// Drive `pin` HIGH or LOW, switching it to output first if needed.
    pub fn write_digital(&mut self, pin: PinId, level: bool) -> Result<bool> {
        Self::check_pin(pin)?;
        self.enter_output(pin)?;
        self.hw
            .write_digital(pin, level)
            .map_err(|e| Self::fault(pin, "write", e))?;
        self.pins.insert(pin, PinState::Output { level });
        info!("GPIO {} set {}", pin, if level { "HIGH" } else { "LOW" });
        Ok(level)
    }

    /// Set the PWM duty on `pin`, switching it to PWM first if needed.
    /// Returns the clamped duty actually applied.
    pub fn write_pwm(&mut self, pin: PinId, percent: f32) -> Result<f32> {
        Self::check_pin(pin)?;
        let percent = clamp_percent(percent).inspect_err(|_| {
            warn!("GPIO {}: rejected non-numeric duty", pin);
        })?;
        self.enter_pwm(pin)?;
        let duty = self.pwm.set_duty(&mut self.hw, pin, percent)?;
        self.pins.insert(pin, PinState::Pwm { duty });
        info!("GPIO {} PWM {:.1}%", pin, duty);
        Ok(duty)
    }

    /// Sample an input pin.  Fails with `WrongMode` unless the pin is
    /// currently an input.
    pub fn read_digital(&mut self, pin: PinId) -> Result<bool> {
        Self::check_pin(pin)?;
        let mode = self.mode(pin);
        if mode != PinMode::Input {
            warn!("GPIO {}: read refused in {} mode", pin, mode);
            return Err(Error::WrongMode { pin, mode });
        }
        self.hw
            .read_digital(pin)
            .map_err(|e| Self::fault(pin, "read", e))
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self, pin: PinId) -> PinMode {
        self.pins
            .get(&pin)
            .map_or(PinMode::Unconfigured, |s| s.mode())
    }

    /// Every registry pin with its recorded mode and value.
    pub fn snapshot(&self) -> BTreeMap<PinId, PinSnapshot> {
        pins::VALID_PINS
            .iter()
            .map(|&pin| {
                let snap = match self.pins.get(&pin) {
                    None => PinSnapshot::UNCONFIGURED,
                    Some(&PinState::Output { level }) => PinSnapshot {
                        mode: PinMode::Output,
                        value: PinValue::Level(level),
                    },
                    Some(PinState::Input) => PinSnapshot {
                        mode: PinMode::Input,
                        value: PinValue::Live,
                    },
                    Some(&PinState::Pwm { duty }) => PinSnapshot {
                        mode: PinMode::Pwm,
                        value: PinValue::Duty(duty),
                    },
                };
                (pin, snap)
            })
            .collect()
    }

    /// Pins that have left `Unconfigured`, ascending.
    pub fn configured_pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.keys().copied()
    }

    /// Recorded duty for a PWM pin, 0 otherwise.
    pub fn duty(&self, pin: PinId) -> f32 {
        match self.pins.get(&pin) {
            Some(&PinState::Pwm { duty }) => duty,
            _ => 0.0,
        }
    }

    pub fn pwm(&self) -> &PwmChannels {
        &self.pwm
    }

    pub fn driver(&self) -> &D {
        &self.hw
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.hw
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Stop every generator and release the hardware.  Best effort: all
    /// failures are logged, none abort the shutdown.
    pub fn shutdown(&mut self) {
        info!("Cleaning up GPIO...");
        let failures = self.pwm.stop_all(&mut self.hw);
        if failures > 0 {
            warn!("{} PWM channel(s) failed to stop cleanly", failures);
        }
        if let Err(e) = self.hw.release_all() {
            warn!("GPIO release failed: {}", e);
        }
        self.pins.clear();
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_pin(pin: PinId) -> Result<()> {
        if pins::is_valid(pin) {
            Ok(())
        } else {
            warn!("Invalid GPIO pin: {}", pin);
            Err(Error::InvalidPin(i64::from(pin)))
        }
    }

    fn fault(pin: PinId, op: &str, e: DriverError) -> Error {
        error!("GPIO {}: {} failed: {}", pin, op, e);
        Error::HardwareFault(e)
    }

    /// Stop the generator if `pin` is in PWM mode.  On success the pin is
    /// recorded as unconfigured until the caller records its new mode.
    fn leave_pwm(&mut self, pin: PinId) -> Result<()> {
        if self.mode(pin) == PinMode::Pwm {
            self.pwm.stop(&mut self.hw, pin)?;
            self.pins.remove(&pin);
        }
        Ok(())
    }

    fn enter_output(&mut self, pin: PinId) -> Result<()> {
        if self.mode(pin) == PinMode::Output {
            return Ok(());
        }
        self.leave_pwm(pin)?;
        self.hw
            .configure(pin, LineMode::Output)
            .map_err(|e| Self::fault(pin, "configure output", e))?;
        self.hw
            .write_digital(pin, false)
            .map_err(|e| Self::fault(pin, "initial write", e))?;
        self.pins.insert(pin, PinState::Output { level: false });
        info!("Configured GPIO {} as OUTPUT", pin);
        Ok(())
    }

    fn enter_input(&mut self, pin: PinId) -> Result<()> {
        if self.mode(pin) == PinMode::Input {
            return Ok(());
        }
        self.leave_pwm(pin)?;
        self.hw
            .configure(pin, LineMode::Input(Pull::Down))
            .map_err(|e| Self::fault(pin, "configure input", e))?;
        self.pins.insert(pin, PinState::Input);
        info!("Configured GPIO {} as INPUT", pin);
        Ok(())
    }

    fn enter_pwm(&mut self, pin: PinId) -> Result<()> {
        if self.mode(pin) == PinMode::Pwm {
            return Ok(());
        }
        self.hw
            .configure(pin, LineMode::Output)
            .map_err(|e| Self::fault(pin, "configure output", e))?;
        self.pwm.start(&mut self.hw, pin, self.pwm_frequency_hz)?;
        self.pins.insert(pin, PinState::Pwm { duty: 0.0 });
        info!("Configured GPIO {} as PWM output", pin);
        Ok(())
    }
}
