//! Error types for the WagerLedger.
//!
//! All errors use the `WL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Bet record / lifecycle errors
//! - 2xx: Codec errors
//! - 3xx: Store errors
//! - 4xx: Disclosure errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{BetKey, BetStatus};

/// Central error enum for all WagerLedger operations.
#[derive(Debug, Error)]
pub enum WagerError {
    // =================================================================
    // Bet Record Errors (1xx)
    // =================================================================
    /// No record is stored under this key (or the stored bytes are unreadable).
    #[error("WL_ERR_100: Bet not found: {0}")]
    NotFound(BetKey),

    /// The requested status transition is not allowed from the current status.
    #[error("WL_ERR_101: Invalid transition: {from} -> {to}")]
    InvalidTransition { from: BetStatus, to: BetStatus },

    /// The bet failed creation-time validation.
    #[error("WL_ERR_102: Invalid bet: {reason}")]
    InvalidBet { reason: String },

    /// The requester is not the bettor who placed this bet.
    #[error("WL_ERR_103: Requester does not own bet {0}")]
    NotOwner(BetKey),

    /// Another writer replaced the record since it was read.
    #[error("WL_ERR_104: Stale write rejected for bet {0}")]
    StaleWrite(BetKey),

    // =================================================================
    // Codec Errors (2xx)
    // =================================================================
    /// The token parses neither under its scheme nor as a bare number.
    #[error("WL_ERR_200: Malformed token: {reason}")]
    MalformedToken { reason: String },

    /// A transform overflowed the representable amount range.
    #[error("WL_ERR_201: Arithmetic overflow applying {operation}")]
    ArithmeticOverflow { operation: String },

    /// Strict parsing met an operation tag outside the closed set.
    #[error("WL_ERR_202: Unknown operation: {0}")]
    UnknownOperation(String),

    // =================================================================
    // Store Errors (3xx)
    // =================================================================
    /// The key/value store is not available or a read/write failed.
    #[error("WL_ERR_300: Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// The store cannot enumerate keys, so a full record scan is impossible.
    #[error("WL_ERR_301: Store does not support key enumeration")]
    ScanUnsupported,

    // =================================================================
    // Disclosure Errors (4xx)
    // =================================================================
    /// The wallet declined to sign, or the signature did not verify.
    #[error("WL_ERR_400: Authorization declined: {reason}")]
    AuthorizationDeclined { reason: String },

    /// The disclosure challenge window has elapsed.
    #[error("WL_ERR_401: Disclosure challenge expired at {expired_at}")]
    ChallengeExpired { expired_at: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("WL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("WL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("WL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WagerError>;

impl From<serde_json::Error> for WagerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
