//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                    |
//! |------------|------------|--------------------------------|
//! | `evok`     | IoBackend  | UniPi evok JSON-RPC over HTTP  |
//! | `sim`      | IoBackend  | In-memory simulated machine    |
//! | `log_sink` | EventSink  | `log` facade                   |
//! | `time`     | Clock      | OS sleep + local wall clock    |

pub mod evok;
pub mod log_sink;
pub mod sim;
pub mod time;
