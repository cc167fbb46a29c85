//! Unified error type for the wash machine core.
//!
//! Every fallible operation below the sequencer funnels into [`Error`], so
//! the per-phase retry loop has exactly one type to match on.  Nothing in
//! the phase library swallows these: the sequencer is the only place that
//! catches them.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend answered with a JSON-RPC error object (unknown alias,
    /// bad parameters, ...).
    #[error("protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// The backend could not be reached or the HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered, but the payload had an unexpected shape.
    #[error("malformed reply to {method}: {detail}")]
    Decode { method: &'static str, detail: String },

    /// The 1-Wire sensor reports itself as lost (stale reading).
    #[error("sensor {0} has been lost")]
    SensorLost(String),

    /// One or more IO points are not exposed by the backend.
    #[error("failed to find some IO: {}", .0.join(", "))]
    UndefinedIo(Vec<String>),

    /// Configuration is invalid or could not be loaded.
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Errors that may clear up by themselves (backend restart, network
    /// hiccup, sensor re-appearing).  Everything else needs an operator.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::SensorLost(_) | Self::Decode { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
