//! Transport-agnostic RPC subsystem.
//!
//! Newline-delimited JSON over TCP.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      RPC Stack                           │
//! │                                                          │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────────────────┐  │
//! │  │  server  │──▶│  codec   │──▶│  engine (dispatcher) │  │
//! │  │ (tokio)  │   │ (lines)  │   │  → AppService        │  │
//! │  └──────────┘   └──────────┘   └──────────────────────┘  │
//! │       ▲                                   │              │
//! │       └─────────── messages::Reply ◀──────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod engine;
pub mod messages;
pub mod server;
