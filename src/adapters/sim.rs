//! In-memory GPIO driver.
//!
//! Used by host builds (no `rpi` feature) and by unit tests.  Tracks line
//! modes, output levels and PWM generators without touching hardware, and
//! is strict where real silicon would misbehave: reconfiguring a pin while
//! its generator is still running is refused, so ordering bugs in the
//! controller show up as errors instead of passing silently.

use std::collections::BTreeMap;

use log::debug;

use crate::app::ports::{HardwareDriver, LineMode, Pull, PwmHandle};
use crate::error::DriverError;
use crate::pins::PinId;

#[derive(Debug, Clone, Copy)]
struct SimLine {
    mode: LineMode,
    level: bool,
}

#[derive(Debug, Clone, Copy)]
struct SimGenerator {
    frequency_hz: u32,
    duty: f32,
}

/// Simulated GPIO peripheral.
#[derive(Debug, Default)]
pub struct SimDriver {
    lines: BTreeMap<PinId, SimLine>,
    generators: BTreeMap<PinId, SimGenerator>,
    /// Externally applied levels on input pins (test stimulus).
    stimulus: BTreeMap<PinId, bool>,
    pwm_starts: usize,
    releases: usize,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive an input pin from "outside" the board.
    pub fn set_input_level(&mut self, pin: PinId, high: bool) {
        self.stimulus.insert(pin, high);
    }

    /// Current output level, or `None` if the pin isn't an output.
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.lines
            .get(&pin)
            .filter(|l| l.mode == LineMode::Output)
            .map(|l| l.level)
    }

    pub fn line_mode(&self, pin: PinId) -> Option<LineMode> {
        self.lines.get(&pin).map(|l| l.mode)
    }

    /// Duty of the running generator on `pin`.
    pub fn pwm_duty(&self, pin: PinId) -> Option<f32> {
        self.generators.get(&pin).map(|g| g.duty)
    }

    pub fn pwm_frequency(&self, pin: PinId) -> Option<u32> {
        self.generators.get(&pin).map(|g| g.frequency_hz)
    }

    pub fn active_generators(&self) -> usize {
        self.generators.len()
    }

    /// Total `pwm_start` calls since construction.
    pub fn pwm_starts(&self) -> usize {
        self.pwm_starts
    }

    /// Total `release_all` calls since construction.
    pub fn releases(&self) -> usize {
        self.releases
    }

    fn output_line(&mut self, pin: PinId) -> Result<&mut SimLine, DriverError> {
        match self.lines.get_mut(&pin) {
            Some(line) if line.mode == LineMode::Output => Ok(line),
            _ => Err(DriverError::NotConfigured(pin)),
        }
    }
}

impl HardwareDriver for SimDriver {
    fn configure(&mut self, pin: PinId, mode: LineMode) -> Result<(), DriverError> {
        if self.generators.contains_key(&pin) {
            return Err(DriverError::Io(pin));
        }
        self.lines.insert(pin, SimLine { mode, level: false });
        debug!("sim: GPIO {} configured {:?}", pin, mode);
        Ok(())
    }

    fn write_digital(&mut self, pin: PinId, high: bool) -> Result<(), DriverError> {
        self.output_line(pin)?.level = high;
        Ok(())
    }

    fn read_digital(&mut self, pin: PinId) -> Result<bool, DriverError> {
        match self.lines.get(&pin).map(|l| l.mode) {
            Some(LineMode::Input(pull)) => Ok(self
                .stimulus
                .get(&pin)
                .copied()
                .unwrap_or(pull == Pull::Up)),
            _ => Err(DriverError::NotConfigured(pin)),
        }
    }

    fn pwm_start(&mut self, pin: PinId, frequency_hz: u32) -> Result<PwmHandle, DriverError> {
        self.output_line(pin)?;
        self.generators.insert(
            pin,
            SimGenerator {
                frequency_hz,
                duty: 0.0,
            },
        );
        self.pwm_starts += 1;
        Ok(PwmHandle::new(pin, frequency_hz))
    }

    fn pwm_set_duty(&mut self, handle: &PwmHandle, percent: f32) -> Result<(), DriverError> {
        let pin = handle.pin();
        let generator = self
            .generators
            .get_mut(&pin)
            .ok_or(DriverError::UnknownChannel(pin))?;
        generator.duty = percent;
        Ok(())
    }

    fn pwm_stop(&mut self, handle: &PwmHandle) -> Result<(), DriverError> {
        let pin = handle.pin();
        self.generators
            .remove(&pin)
            .ok_or(DriverError::UnknownChannel(pin))?;
        if let Some(line) = self.lines.get_mut(&pin) {
            line.level = false;
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), DriverError> {
        self.generators.clear();
        self.lines.clear();
        self.releases += 1;
        Ok(())
    }
}
