//! Application layer: hexagonal architecture core.
//!
//! ```text
//!   rpc::engine ──▶ AppService ──▶ PinController ──▶ HardwareDriver
//!                       │               │
//!                       └─ MotorDrive ──┘── PwmChannels
//! ```
//!
//! Nothing in here performs I/O directly; the driver is injected through
//! [`ports::HardwareDriver`] and configuration through [`ports::ConfigPort`].

pub mod commands;
pub mod controller;
pub mod motor;
pub mod ports;
pub mod pwm;
pub mod responses;
pub mod service;
