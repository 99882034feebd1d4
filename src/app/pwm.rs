//! PWM channel manager.
//!
//! Owns every running PWM generator, at most one per pin.  The driver is
//! injected per call, so the manager itself holds no hardware reference and
//! can never outlive or alias the [`PinController`](super::controller::PinController)'s
//! driver.
//!
//! ## Channel lifecycle
//!
//! 1. [`start`](PwmChannels::start) creates a generator at 0 % duty.
//!    A second start on the same pin is refused with `AlreadyActive`.
//! 2. [`set_duty`](PwmChannels::set_duty) clamps to [0, 100] and applies.
//! 3. [`stop`](PwmChannels::stop) halts the generator and drops the handle.
//!    Stopping a pin with no channel is a no-op.
//! 4. [`stop_all`](PwmChannels::stop_all) runs at shutdown.  It always empties
//!    the table, even if individual stops fail.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};

use super::ports::{HardwareDriver, PwmHandle};
use crate::error::{Error, Result};
use crate::pins::PinId;

/// Clamp a duty cycle to [0, 100].  NaN has no meaningful clamp and is
/// rejected.
pub fn clamp_percent(percent: f32) -> Result<f32> {
    if percent.is_nan() {
        return Err(Error::InvalidParameter("dutyCycle must be a number"));
    }
    Ok(percent.clamp(0.0, 100.0))
}

struct Channel {
    handle: PwmHandle,
    duty: f32,
}

/// Table of running generators keyed by pin.
#[derive(Default)]
pub struct PwmChannels {
    channels: BTreeMap<PinId, Channel>,
}

impl PwmChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a generator on `pin` at 0 % duty.
    pub fn start(
        &mut self,
        hw: &mut impl HardwareDriver,
        pin: PinId,
        frequency_hz: u32,
    ) -> Result<&PwmHandle> {
        if self.channels.contains_key(&pin) {
            warn!("PWM: start refused, GPIO {} already has a generator", pin);
            return Err(Error::AlreadyActive(pin));
        }

        let handle = hw.pwm_start(pin, frequency_hz).map_err(|e| {
            error!("PWM: start on GPIO {} failed: {}", pin, e);
            Error::from(e)
        })?;

        info!("PWM: started GPIO {} at {} Hz", pin, frequency_hz);
        let channel = self
            .channels
            .entry(pin)
            .or_insert(Channel { handle, duty: 0.0 });
        Ok(&channel.handle)
    }

    /// Apply a duty cycle.  Returns the clamped value actually applied.
    pub fn set_duty(
        &mut self,
        hw: &mut impl HardwareDriver,
        pin: PinId,
        percent: f32,
    ) -> Result<f32> {
        let percent = clamp_percent(percent)?;
        let Some(channel) = self.channels.get_mut(&pin) else {
            warn!("PWM: set_duty on GPIO {} without a generator", pin);
            return Err(Error::NoActiveChannel(pin));
        };

        hw.pwm_set_duty(&channel.handle, percent).map_err(|e| {
            error!("PWM: duty {:.1}% on GPIO {} failed: {}", percent, pin, e);
            Error::from(e)
        })?;

        channel.duty = percent;
        debug!("PWM: GPIO {} duty {:.1}%", pin, percent);
        Ok(percent)
    }

    /// Halt and release the generator on `pin`, if any.
    ///
    /// On driver failure the channel stays in the table so the caller can
    /// still see that a generator may be running.
    pub fn stop(&mut self, hw: &mut impl HardwareDriver, pin: PinId) -> Result<()> {
        let Some(channel) = self.channels.get(&pin) else {
            return Ok(());
        };

        hw.pwm_stop(&channel.handle).map_err(|e| {
            error!("PWM: stop on GPIO {} failed: {}", pin, e);
            Error::from(e)
        })?;

        self.channels.remove(&pin);
        info!("PWM: stopped GPIO {}", pin);
        Ok(())
    }

    /// Stop every generator.  Best effort: failures are logged and counted,
    /// and the table is empty afterwards regardless.
    pub fn stop_all(&mut self, hw: &mut impl HardwareDriver) -> usize {
        let mut failures = 0;
        for (pin, channel) in std::mem::take(&mut self.channels) {
            match hw.pwm_stop(&channel.handle) {
                Ok(()) => info!("PWM: stopped GPIO {}", pin),
                Err(e) => {
                    failures += 1;
                    warn!("PWM: stop on GPIO {} failed during shutdown: {}", pin, e);
                }
            }
        }
        failures
    }

    pub fn is_active(&self, pin: PinId) -> bool {
        self.channels.contains_key(&pin)
    }

    /// Last applied duty for `pin`.
    pub fn duty(&self, pin: PinId) -> Option<f32> {
        self.channels.get(&pin).map(|c| c.duty)
    }

    pub fn active_count(&self) -> usize {
        self.channels.len()
    }

    pub fn active_pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.channels.keys().copied()
    }
}
