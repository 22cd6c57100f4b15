//! Error types for kickoff-core

use thiserror::Error;

/// Result type alias for kickoff operations
pub type Result<T> = std::result::Result<T, PredictionError>;

/// Error types for event, prediction and settlement operations.
///
/// Every mutating operation fails with exactly one of these and leaves the
/// book untouched.
#[derive(Error, Debug)]
pub enum PredictionError {
    /// Referenced event, result or prediction is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks the creator or oracle role required for the action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Join attempted with the wrong access code
    #[error("Invalid access code")]
    InvalidAccessCode,

    /// Join attempted on an event that no longer accepts predictions
    #[error("Event is closed to new predictions")]
    EventClosed,

    /// Lifecycle transition not allowed from the event's current status
    #[error("Invalid event state: {0}")]
    InvalidEventState(String),

    /// Participant already holds a prediction for this event
    #[error("Prediction already submitted for this event")]
    AlreadyPredicted,

    /// Prediction was already evaluated by a previous award call
    #[error("Points already awarded for this prediction")]
    AlreadyAwarded,

    /// Input rejected before reaching the state machine
    #[error("Validation error: {0}")]
    Validation(String),

    /// Counter would exceed its range
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Serde JSON errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Restored state breaks a book invariant
    #[error("Inconsistent snapshot: {0}")]
    Snapshot(String),
}

impl PredictionError {
    /// Stable numeric code, matching the codes the on-chain contract returned.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotFound(_) => 101,
            Self::Unauthorized(_) => 102,
            Self::Validation(_) => 103,
            Self::InvalidAccessCode => 104,
            Self::EventClosed => 105,
            Self::InvalidEventState(_) => 106,
            Self::AlreadyPredicted => 107,
            Self::AlreadyAwarded => 108,
            Self::Overflow(_) => 109,
            Self::Json(_) | Self::Config(_) | Self::Snapshot(_) => 199,
        }
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if error is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
