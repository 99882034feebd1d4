//! Mock GPIO driver for integration tests.
//!
//! Records every driver call so tests can assert on the full command
//! history, and fails selected calls on demand.  Unlike the simulation
//! driver it never enforces line modes itself.

use gpio_bridge::app::controller::PinController;
use gpio_bridge::app::ports::{HardwareDriver, LineMode, PwmHandle};
use gpio_bridge::app::service::AppService;
use gpio_bridge::config::SystemConfig;
use gpio_bridge::error::DriverError;
use gpio_bridge::pins::PinId;

// ── Driver call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverCall {
    Configure { pin: PinId, mode: LineMode },
    Write { pin: PinId, high: bool },
    Read { pin: PinId },
    PwmStart { pin: PinId, frequency_hz: u32 },
    PwmDuty { pin: PinId, percent: f32 },
    PwmStop { pin: PinId },
    ReleaseAll,
}

/// Call category used to arm failures.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Configure,
    Write,
    PwmStart,
    PwmDuty,
    PwmStop,
}

// ── MockDriver ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDriver {
    pub calls: Vec<DriverCall>,
    pub input_level: bool,
    failures: Vec<(Op, PinId)>,
}

#[allow(dead_code)]
impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` on `pin` fail with `DriverError::Io(pin)` from now on.
    pub fn fail_on(&mut self, op: Op, pin: PinId) {
        self.failures.push((op, pin));
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Last level written to `pin`.
    pub fn last_level(&self, pin: PinId) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match *c {
            DriverCall::Write { pin: p, high } if p == pin => Some(high),
            _ => None,
        })
    }

    /// Last duty applied to the generator on `pin`.
    pub fn last_duty(&self, pin: PinId) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match *c {
            DriverCall::PwmDuty { pin: p, percent } if p == pin => Some(percent),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&DriverCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }

    fn check(&self, op: Op, pin: PinId) -> Result<(), DriverError> {
        if self.failures.contains(&(op, pin)) {
            Err(DriverError::Io(pin))
        } else {
            Ok(())
        }
    }
}

impl HardwareDriver for MockDriver {
    fn configure(&mut self, pin: PinId, mode: LineMode) -> Result<(), DriverError> {
        self.calls.push(DriverCall::Configure { pin, mode });
        self.check(Op::Configure, pin)
    }

    fn write_digital(&mut self, pin: PinId, high: bool) -> Result<(), DriverError> {
        self.calls.push(DriverCall::Write { pin, high });
        self.check(Op::Write, pin)
    }

    fn read_digital(&mut self, pin: PinId) -> Result<bool, DriverError> {
        self.calls.push(DriverCall::Read { pin });
        Ok(self.input_level)
    }

    fn pwm_start(&mut self, pin: PinId, frequency_hz: u32) -> Result<PwmHandle, DriverError> {
        self.calls.push(DriverCall::PwmStart { pin, frequency_hz });
        self.check(Op::PwmStart, pin)?;
        Ok(PwmHandle::new(pin, frequency_hz))
    }

    fn pwm_set_duty(&mut self, handle: &PwmHandle, percent: f32) -> Result<(), DriverError> {
        let pin = handle.pin();
        self.calls.push(DriverCall::PwmDuty { pin, percent });
        self.check(Op::PwmDuty, pin)
    }

    fn pwm_stop(&mut self, handle: &PwmHandle) -> Result<(), DriverError> {
        let pin = handle.pin();
        self.calls.push(DriverCall::PwmStop { pin });
        self.check(Op::PwmStop, pin)
    }

    fn release_all(&mut self) -> Result<(), DriverError> {
        self.calls.push(DriverCall::ReleaseAll);
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub fn make_app() -> AppService<MockDriver> {
    AppService::new(MockDriver::new(), &SystemConfig::default())
}

/// Run `f` against the mock inside the service.
pub fn with_mock<R>(app: &AppService<MockDriver>, f: impl FnOnce(&mut MockDriver) -> R) -> R {
    app.with_controller(|ctl: &mut PinController<MockDriver>| f(ctl.driver_mut()))
}
