//! JSON request and reply shapes.
//!
//! Field names (`gpio`, `state`, `dutyCycle`, ...) are part of the wire
//! contract existing clients speak, so they are kept verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::controller::PinMode;
use crate::app::motor::MotorReading;
use crate::error::Error;
use crate::pins::PinId;

// ───────────────────────────────────────────────────────────────
// Requests
// ───────────────────────────────────────────────────────────────

/// One inbound request, tagged by `"op"`.
///
/// Required fields are `Option` so a missing field produces a domain
/// error naming the field instead of a generic parse failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GpioSet {
        gpio: Option<i64>,
        state: Option<bool>,
    },
    GpioPwm {
        gpio: Option<i64>,
        #[serde(rename = "dutyCycle")]
        duty_cycle: Option<f64>,
    },
    GpioStatus,
    GpioMode {
        gpio: Option<i64>,
        mode: Option<String>,
    },
    MotorDrive {
        #[serde(default)]
        left: f64,
        #[serde(default)]
        right: f64,
    },
    MotorStop,
    MotorStatus,
    Health,
}

impl Request {
    /// Short operation name for logging.
    pub fn op(&self) -> &'static str {
        match self {
            Self::GpioSet { .. } => "gpio_set",
            Self::GpioPwm { .. } => "gpio_pwm",
            Self::GpioStatus => "gpio_status",
            Self::GpioMode { .. } => "gpio_mode",
            Self::MotorDrive { .. } => "motor_drive",
            Self::MotorStop => "motor_stop",
            Self::MotorStatus => "motor_status",
            Self::Health => "health",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Replies
// ───────────────────────────────────────────────────────────────

/// Reply envelope: every reply carries `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub success: bool,
    #[serde(flatten)]
    pub body: ReplyBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Digital {
        gpio: PinId,
        state: bool,
    },
    Pwm {
        gpio: PinId,
        #[serde(rename = "dutyCycle")]
        duty_cycle: f32,
        mode: PinMode,
    },
    Mode {
        gpio: PinId,
        mode: PinMode,
    },
    Status {
        pins: BTreeMap<PinId, bool>,
        pwm: BTreeMap<PinId, f32>,
        modes: BTreeMap<PinId, PinMode>,
    },
    Drive {
        left: i64,
        right: i64,
    },
    Stopped {
        status: &'static str,
    },
    Motors {
        left: MotorReading,
        right: MotorReading,
    },
    Health {
        status: &'static str,
        configured_pins: usize,
        pins: Vec<PinId>,
    },
    Error {
        error: String,
        kind: &'static str,
    },
}

impl Reply {
    pub fn ok(body: ReplyBody) -> Self {
        Self {
            success: true,
            body,
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            success: false,
            body: ReplyBody::Error {
                error: err.to_string(),
                kind: err.kind(),
            },
        }
    }

    /// Serialize to a single JSON line (without the trailing newline).
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("reply serialization failed: {}", e);
            r#"{"success":false,"error":"internal error","kind":"hardware_fault"}"#.to_owned()
        })
    }
}
