//! GPIO bridge library.
//!
//! Exposes the pin-control core and the JSON-over-TCP transport for
//! integration testing.  Hardware access is behind the `rpi` feature;
//! without it only the in-memory driver is built.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod rpc;
