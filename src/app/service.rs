//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the [`PinController`] behind a single mutex together
//! with the motor wiring.  It is shared (`Arc`) between every connection
//! task; each command takes the lock once and holds it for the whole
//! operation, so a motor drive can never interleave with another request
//! touching the same pins.
//!
//! ```text
//!  RpcEngine ──AppCommand──▶ ┌──────────────────────────┐
//!                            │       AppService          │ ──▶ HardwareDriver
//!            ◀─AppResponse── │  Mutex<PinController>     │
//!                            │  MotorDrive               │
//!                            └──────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::Result;

use super::commands::AppCommand;
use super::controller::{PinController, PinValue};
use super::motor::MotorDrive;
use super::ports::HardwareDriver;
use super::responses::{AppResponse, HealthReport, PinReport, StatusReport};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<D: HardwareDriver> {
    controller: Mutex<PinController<D>>,
    motors: MotorDrive,
}

impl<D: HardwareDriver> AppService<D> {
    /// Construct the service around a driver.  No pin is touched until the
    /// first command arrives.
    pub fn new(hw: D, config: &SystemConfig) -> Self {
        Self {
            controller: Mutex::new(PinController::new(hw, config.pwm_frequency_hz)),
            motors: MotorDrive::new(config.motors),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute one command under the pin-table lock.
    pub fn handle_command(&self, cmd: AppCommand) -> Result<AppResponse> {
        let mut ctl = self.lock();
        match cmd {
            AppCommand::SetDigital { pin, level } => {
                let level = ctl.write_digital(pin, level)?;
                Ok(AppResponse::Digital { pin, level })
            }
            AppCommand::SetPwm { pin, duty } => {
                let duty = ctl.write_pwm(pin, duty)?;
                Ok(AppResponse::Pwm { pin, duty })
            }
            AppCommand::SetMode { pin, mode } => {
                ctl.set_mode(pin, mode)?;
                Ok(AppResponse::Mode { pin, mode })
            }
            AppCommand::Status => Self::status_locked(&mut *ctl).map(AppResponse::Status),
            AppCommand::Drive { left, right } => {
                let (left, right) = self.motors.drive(&mut *ctl, left, right)?;
                Ok(AppResponse::Drive { left, right })
            }
            AppCommand::StopMotors => {
                self.motors.stop(&mut *ctl)?;
                Ok(AppResponse::Stopped)
            }
            AppCommand::MotorStatus => Ok(AppResponse::Motors(self.motors.status(&*ctl))),
            AppCommand::Health => Ok(AppResponse::Health(Self::health_locked(&*ctl))),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Status of every registry pin; input pins are sampled live.
    pub fn status(&self) -> Result<StatusReport> {
        Self::status_locked(&mut self.lock())
    }

    pub fn health(&self) -> HealthReport {
        Self::health_locked(&self.lock())
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut PinController<D>) -> R) -> R {
        f(&mut self.lock())
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Stop all PWM and release the hardware.  Safe to call more than once.
    pub fn shutdown(&self) {
        self.lock().shutdown();
        info!("GPIO released");
    }

    // ── Internal ──────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, PinController<D>> {
        self.controller.lock().unwrap_or_else(|poisoned| {
            warn!("pin table lock poisoned; continuing with last recorded state");
            PoisonError::into_inner(poisoned)
        })
    }

    fn status_locked(ctl: &mut PinController<D>) -> Result<StatusReport> {
        let mut pins = Vec::new();
        for (pin, snap) in ctl.snapshot() {
            let (level, duty) = match snap.value {
                PinValue::Level(level) => (level, None),
                PinValue::Duty(duty) => (duty > 0.0, Some(duty)),
                PinValue::Live => (ctl.read_digital(pin)?, None),
            };
            pins.push(PinReport {
                pin,
                mode: snap.mode,
                level,
                duty,
            });
        }
        Ok(StatusReport { pins })
    }

    fn health_locked(ctl: &PinController<D>) -> HealthReport {
        let mut configured_pins = heapless::Vec::new();
        for pin in ctl.configured_pins() {
            // Only registry pins are ever recorded, so capacity suffices.
            let _ = configured_pins.push(pin);
        }
        HealthReport { configured_pins }
    }
}
