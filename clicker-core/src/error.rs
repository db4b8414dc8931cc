//! Error types for engine operations.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while applying a game operation.
///
/// Every variant except [`EngineError::Store`] is a rejected request: the
/// stored aggregate is left exactly as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No session exists for the given id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The session has no upgrade with the given id.
    #[error("Upgrade not found: {0}")]
    UpgradeNotFound(String),

    /// The request was malformed (non-positive click count, bad catalog entry).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upgrade costs more than the current balance.
    #[error("Insufficient funds: upgrade costs {cost} but only {available:.0} points available")]
    InsufficientFunds {
        /// Price of the next level.
        cost: u64,
        /// Points the session currently holds.
        available: f64,
    },

    /// Prestige was requested before the threshold was reached.
    #[error("Prestige requires {required:.0} points earned this run (have {earned:.0})")]
    PrestigeNotEligible {
        /// Points that must be earned before prestige is allowed.
        required: f64,
        /// Points earned so far in the current run.
        earned: f64,
    },

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl EngineError {
    /// Short machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) | Self::UpgradeNotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::PrestigeNotEligible { .. } => "prestige_not_eligible",
            Self::Store(_) => "internal",
        }
    }

    /// Whether this error is a rejected player action rather than a lookup
    /// or infrastructure failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::InsufficientFunds { .. }
                | Self::PrestigeNotEligible { .. }
                | Self::UpgradeNotFound(_)
        )
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SessionNotFound(id) => Self::SessionNotFound(id),
            other => Self::Store(other),
        }
    }
}
