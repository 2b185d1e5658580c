use thiserror::Error;

use crate::services::store::StoreError;

/// Errors surfaced by the relationship & compatibility engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// An active block exists in either direction. Carries no relationship
    /// detail: a blocked pair must not learn each other's like/match state.
    #[error("interaction not permitted between these users")]
    Blocked,

    #[error("requirement not met: {0}")]
    RequirementNotMet(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    /// Persistence failures propagate unchanged; retry policy is the
    /// caller's decision.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable label for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Blocked => "blocked",
            EngineError::RequirementNotMet(_) => "requirement_not_met",
            EngineError::NotFound(_) => "not_found",
            EngineError::Validation(_) => "validation",
            EngineError::Store(_) => "store",
        }
    }
}
