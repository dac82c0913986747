//! Shared domain error type.

use crate::types::Stars;

/// Domain-level error for the veobot core and pipeline crates.
///
/// HTTP mapping lives in the API crate; this enum stays transport-free.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed (user, bot, task).
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind, e.g. `"Bot"` or `"Task"`.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input failed validation before any external call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A state transition conflicted with the current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A debit would drive the requester's balance negative.
    #[error("Insufficient funds: need {required} stars, have {available}")]
    InsufficientFunds {
        /// Stars the operation would debit.
        required: Stars,
        /// Stars currently on the balance.
        available: Stars,
    },

    /// Anything unexpected. The message is logged, never shown raw to users.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
