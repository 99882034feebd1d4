//! RPC engine: dispatches decoded requests to the [`AppService`].
//!
//! **Transport-decoupled**: the engine does not own a socket.  Callers feed
//! one decoded line via [`RpcEngine::dispatch_line`] and receive the reply
//! to write back.  All wire validation happens here, before an
//! [`AppCommand`] is built:
//!
//! 1. **Parse**: JSON object with a known `"op"`.
//! 2. **Required fields**: missing fields name themselves in the error.
//! 3. **Typed conversion**: pin allow-list, mode names, speed truncation.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::app::commands::AppCommand;
use crate::app::controller::PinMode;
use crate::app::ports::HardwareDriver;
use crate::app::responses::{AppResponse, HealthReport, StatusReport};
use crate::app::service::AppService;
use crate::error::{Error, Result};
use crate::pins;

use super::messages::{Reply, ReplyBody, Request};

/// Connection identifier assigned by the server, used for log context.
pub type ClientId = u64;

pub struct RpcEngine<D: HardwareDriver> {
    app: Arc<AppService<D>>,
}

impl<D: HardwareDriver> RpcEngine<D> {
    pub fn new(app: Arc<AppService<D>>) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &Arc<AppService<D>> {
        &self.app
    }

    /// Parse and execute one request line.
    pub fn dispatch_line(&self, client_id: ClientId, line: &str) -> Reply {
        match serde_json::from_str::<Request>(line) {
            Ok(req) => self.dispatch(client_id, req),
            Err(e) => {
                warn!("RPC[{}]: bad request: {}", client_id, e);
                Reply::error(&Error::InvalidParameter("Invalid request"))
            }
        }
    }

    /// Execute an already-parsed request.
    pub fn dispatch(&self, client_id: ClientId, req: Request) -> Reply {
        let op = req.op();
        debug!("RPC[{}]: {}", client_id, op);

        let result = Self::command(req).and_then(|cmd| self.app.handle_command(cmd));
        match result {
            Ok(resp) => Reply::ok(Self::body(resp)),
            Err(e) => {
                warn!("RPC[{}]: {} failed: {}", client_id, op, e);
                Reply::error(&e)
            }
        }
    }

    // ── Wire → command ────────────────────────────────────────

    fn command(req: Request) -> Result<AppCommand> {
        let cmd = match req {
            Request::GpioSet { gpio, state } => {
                let (Some(gpio), Some(level)) = (gpio, state) else {
                    return Err(Error::InvalidParameter("Missing gpio or state parameter"));
                };
                AppCommand::SetDigital {
                    pin: pins::parse(gpio)?,
                    level,
                }
            }
            Request::GpioPwm { gpio, duty_cycle } => {
                let (Some(gpio), Some(duty)) = (gpio, duty_cycle) else {
                    return Err(Error::InvalidParameter(
                        "Missing gpio or dutyCycle parameter",
                    ));
                };
                AppCommand::SetPwm {
                    pin: pins::parse(gpio)?,
                    duty: duty as f32,
                }
            }
            Request::GpioStatus => AppCommand::Status,
            Request::GpioMode { gpio, mode } => {
                let (Some(gpio), Some(mode)) = (gpio, mode) else {
                    return Err(Error::InvalidParameter("Missing gpio or mode parameter"));
                };
                let pin = pins::parse(gpio)?;
                AppCommand::SetMode {
                    pin,
                    mode: parse_mode(&mode)?,
                }
            }
            Request::MotorDrive { left, right } => AppCommand::Drive {
                // `as` truncates toward zero and saturates.
                left: left as i64,
                right: right as i64,
            },
            Request::MotorStop => AppCommand::StopMotors,
            Request::MotorStatus => AppCommand::MotorStatus,
            Request::Health => AppCommand::Health,
        };
        Ok(cmd)
    }

    // ── Response → wire ───────────────────────────────────────

    fn body(resp: AppResponse) -> ReplyBody {
        match resp {
            AppResponse::Digital { pin, level } => ReplyBody::Digital {
                gpio: pin,
                state: level,
            },
            AppResponse::Pwm { pin, duty } => ReplyBody::Pwm {
                gpio: pin,
                duty_cycle: duty,
                mode: PinMode::Pwm,
            },
            AppResponse::Mode { pin, mode } => ReplyBody::Mode { gpio: pin, mode },
            AppResponse::Status(report) => status_body(&report),
            AppResponse::Drive { left, right } => ReplyBody::Drive { left, right },
            AppResponse::Stopped => ReplyBody::Stopped { status: "stopped" },
            AppResponse::Motors(status) => ReplyBody::Motors {
                left: status.left,
                right: status.right,
            },
            AppResponse::Health(report) => health_body(&report),
        }
    }
}

fn parse_mode(mode: &str) -> Result<PinMode> {
    match mode {
        "input" => Ok(PinMode::Input),
        "output" => Ok(PinMode::Output),
        _ => Err(Error::InvalidMode),
    }
}

fn status_body(report: &StatusReport) -> ReplyBody {
    let mut pins = BTreeMap::new();
    let mut pwm = BTreeMap::new();
    let mut modes = BTreeMap::new();

    for r in &report.pins {
        pins.insert(r.pin, r.level);
        if let Some(duty) = r.duty {
            pwm.insert(r.pin, duty);
        }
        if r.mode != PinMode::Unconfigured {
            modes.insert(r.pin, r.mode);
        }
    }

    ReplyBody::Status { pins, pwm, modes }
}

fn health_body(report: &HealthReport) -> ReplyBody {
    ReplyBody::Health {
        status: "healthy",
        configured_pins: report.configured_pins.len(),
        pins: report.configured_pins.to_vec(),
    }
}
