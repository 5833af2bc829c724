//! Error taxonomy for the store layer.
//!
//! Three families of failures reach callers:
//! - validation errors, raised before any work is enqueued;
//! - business-rule errors, raised after a successful read revealed a state
//!   conflict (lockout, device already linked, bad credentials);
//! - driver errors, passed through untouched and rendered for operators via
//!   [`StoreError::user_message`].
//!
//! Nothing in this layer retries. Every store failure is terminal for that
//! operation; retrying is the caller's decision.

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type surfaced by every collection operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing caller arguments. Never reaches the queue.
    #[error("Invalid params")]
    InvalidParams,

    /// A single-document lookup matched nothing. List queries return an
    /// empty page instead of this.
    #[error("Query returned no results")]
    NotFound,

    /// Login rejected because the account lockout window is still open.
    #[error("Account temporarily locked. Please try again later")]
    AccountLocked,

    /// Login rejected. Deliberately covers both unknown email and wrong
    /// password so the message is not an account-existence oracle.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Activation rejected: the device is still linked to a subscription.
    #[error("Device already has a subscription. Please make sure the device is inactive")]
    DeviceActive,

    /// The pre-activation device lookup matched nothing.
    #[error("Failed to find device. Are you sure your search criteria is correct?")]
    DeviceLookupFailed,

    /// The collection's queue worker is gone (shutdown path).
    #[error("Collection queue is closed")]
    QueueClosed,

    /// Salt generation or key derivation failed.
    #[error("Crypto failure: {0}")]
    Crypto(&'static str),

    /// Driver-level failure, passed through.
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    /// A stored document did not match the expected shape.
    #[error(transparent)]
    Deserialize(#[from] mongodb::bson::de::Error),

    /// A value could not be encoded as BSON.
    #[error(transparent)]
    Serialize(#[from] mongodb::bson::ser::Error),
}

impl StoreError {
    /// Best-effort human-readable rendering for operator-facing surfaces.
    ///
    /// Driver errors are translated through a small code table; everything
    /// else already carries a displayable message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(err) => translate_driver_error(err),
            other => other.to_string(),
        }
    }
}

/// Server error codes we translate rather than echo verbatim.
const DUPLICATE_KEY: i32 = 11000;
const DOCUMENT_VALIDATION: i32 = 121;

fn translate_driver_error(err: &mongodb::error::Error) -> String {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => match we.code {
            DUPLICATE_KEY => "A record with these details already exists".to_string(),
            DOCUMENT_VALIDATION => "The submitted data failed validation".to_string(),
            _ => format!("The database rejected the request (code {})", we.code),
        },
        ErrorKind::Command(ce) if ce.code == DUPLICATE_KEY => {
            "A record with these details already exists".to_string()
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            "The service is temporarily unavailable. Please try again later".to_string()
        }
        _ => "An unexpected database error occurred".to_string(),
    }
}

/// True when the error is a unique-index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_render_their_message() {
        assert_eq!(StoreError::InvalidParams.user_message(), "Invalid params");
        assert_eq!(
            StoreError::NotFound.user_message(),
            "Query returned no results"
        );
        assert_eq!(
            StoreError::AccountLocked.user_message(),
            "Account temporarily locked. Please try again later"
        );
    }

    #[test]
    fn device_conflict_message_mentions_subscription() {
        assert!(StoreError::DeviceActive.user_message().contains("subscription"));
    }
}
