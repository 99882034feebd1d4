//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements     | Connects to                    |
//! |---------------|----------------|--------------------------------|
//! | `rpi`         | HardwareDriver | BCM GPIO via rppal (`rpi`)     |
//! | `sim`         | HardwareDriver | In-memory lines and generators |
//! | `config_file` | ConfigPort     | Optional JSON file on disk     |

pub mod config_file;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;
