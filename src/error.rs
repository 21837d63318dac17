//! Error taxonomy.
//!
//! Provider failures stay inside the engine (they downgrade to the local
//! estimate at the call site); day failures travel out as data in the
//! plan result so one bad day never discards its siblings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of an external routing-provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("route request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider response contained no route")]
    NoRoute,
    #[error("provider returned {got} legs, expected {expected}")]
    LegCountMismatch { got: usize, expected: usize },
}

/// One day that could not be planned; the rest of the trip is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFailure {
    pub day: u32,
    pub reason: String,
}
