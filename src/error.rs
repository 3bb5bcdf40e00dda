use crate::keys::{Identity, PublicKey};
use crate::subject::Status;

/// Errors raised by splitting, distribution, reconstruction, verification and the
/// minipool lifecycle.
///
/// No variant ever carries a secret scalar, a share value or a polynomial coefficient.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("unknown recipient: no committee member with identity {0}")]
    UnknownRecipient(Identity),

    #[error("member {member} already holds a share for subject {subject}")]
    DuplicateShare { subject: String, member: Identity },

    #[error("insufficient shares: need {threshold}, got {got}")]
    InsufficientShares { threshold: usize, got: usize },

    #[error("singular interpolation: {0}")]
    SingularInterpolation(String),

    #[error("key mismatch: recovered {reconstructed}, expected {expected}")]
    KeyMismatch {
        expected: PublicKey,
        reconstructed: PublicKey,
    },

    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: Status, to: Status },

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("subject {0} is already registered")]
    DuplicateSubject(String),

    #[error("member {member} holds no share for subject {subject}")]
    ShareNotFound { subject: String, member: Identity },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::InvalidEncoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
