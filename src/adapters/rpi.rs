//! Raspberry Pi GPIO driver (BCM numbering) via `rppal`.
//!
//! PWM is rppal's software PWM on an [`OutputPin`], so a generator can only
//! run on a line that is currently an output.  Lines are returned to their
//! power-on state when dropped.

use std::collections::{HashMap, HashSet};

use log::{debug, error};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::app::ports::{HardwareDriver, LineMode, Pull, PwmHandle};
use crate::error::DriverError;
use crate::pins::PinId;

enum Line {
    Output(OutputPin),
    Input(InputPin),
}

pub struct RpiDriver {
    gpio: Gpio,
    lines: HashMap<PinId, Line>,
    pwm: HashSet<PinId>,
}

impl RpiDriver {
    /// Open `/dev/gpiomem`.  Fails off-target or without permission.
    pub fn new() -> Result<Self, DriverError> {
        let gpio = Gpio::new().map_err(|e| {
            error!("GPIO: cannot open peripheral: {}", e);
            DriverError::Unavailable
        })?;
        Ok(Self {
            gpio,
            lines: HashMap::new(),
            pwm: HashSet::new(),
        })
    }

    fn output(&mut self, pin: PinId) -> Result<&mut OutputPin, DriverError> {
        match self.lines.get_mut(&pin) {
            Some(Line::Output(out)) => Ok(out),
            _ => Err(DriverError::NotConfigured(pin)),
        }
    }

    fn running(&mut self, handle: &PwmHandle) -> Result<&mut OutputPin, DriverError> {
        let pin = handle.pin();
        if !self.pwm.contains(&pin) {
            return Err(DriverError::UnknownChannel(pin));
        }
        self.output(pin)
    }
}

fn io_error(pin: PinId, e: rppal::gpio::Error) -> DriverError {
    error!("GPIO {}: {}", pin, e);
    DriverError::Io(pin)
}

impl HardwareDriver for RpiDriver {
    fn configure(&mut self, pin: PinId, mode: LineMode) -> Result<(), DriverError> {
        if self.pwm.contains(&pin) {
            return Err(DriverError::Io(pin));
        }
        // Drop any previous handle first so the pin can be re-acquired.
        self.lines.remove(&pin);

        let raw = self.gpio.get(pin).map_err(|e| io_error(pin, e))?;
        let line = match mode {
            LineMode::Output => Line::Output(raw.into_output_low()),
            LineMode::Input(Pull::None) => Line::Input(raw.into_input()),
            LineMode::Input(Pull::Down) => Line::Input(raw.into_input_pulldown()),
            LineMode::Input(Pull::Up) => Line::Input(raw.into_input_pullup()),
        };
        self.lines.insert(pin, line);
        debug!("GPIO {} configured {:?}", pin, mode);
        Ok(())
    }

    fn write_digital(&mut self, pin: PinId, high: bool) -> Result<(), DriverError> {
        let out = self.output(pin)?;
        if high {
            out.set_high();
        } else {
            out.set_low();
        }
        Ok(())
    }

    fn read_digital(&mut self, pin: PinId) -> Result<bool, DriverError> {
        match self.lines.get(&pin) {
            Some(Line::Input(input)) => Ok(input.is_high()),
            _ => Err(DriverError::NotConfigured(pin)),
        }
    }

    fn pwm_start(&mut self, pin: PinId, frequency_hz: u32) -> Result<PwmHandle, DriverError> {
        self.output(pin)?
            .set_pwm_frequency(f64::from(frequency_hz), 0.0)
            .map_err(|e| io_error(pin, e))?;
        self.pwm.insert(pin);
        Ok(PwmHandle::new(pin, frequency_hz))
    }

    fn pwm_set_duty(&mut self, handle: &PwmHandle, percent: f32) -> Result<(), DriverError> {
        let pin = handle.pin();
        let frequency = f64::from(handle.frequency_hz());
        self.running(handle)?
            .set_pwm_frequency(frequency, f64::from(percent) / 100.0)
            .map_err(|e| io_error(pin, e))
    }

    fn pwm_stop(&mut self, handle: &PwmHandle) -> Result<(), DriverError> {
        let pin = handle.pin();
        let out = self.running(handle)?;
        out.clear_pwm().map_err(|e| io_error(pin, e))?;
        out.set_low();
        self.pwm.remove(&pin);
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), DriverError> {
        for pin in self.pwm.drain() {
            if let Some(Line::Output(out)) = self.lines.get_mut(&pin) {
                if let Err(e) = out.clear_pwm() {
                    error!("GPIO {}: clear_pwm on release: {}", pin, e);
                }
            }
        }
        self.lines.clear();
        Ok(())
    }
}
