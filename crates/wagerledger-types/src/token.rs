//! Opaque obscured-amount tokens.
//!
//! A token is a plain string. Tokens produced by the current codec carry a
//! scheme tag prefix; anything without a known tag is treated as a bare
//! numeric string written by an older client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Encoding scheme a token declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenScheme {
    /// `FHE-` followed by base64 of the decimal string.
    Fhe,
    /// No recognised tag; the token body is parsed as a bare number.
    RawNumeric,
}

impl fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fhe => write!(f, "FHE"),
            Self::RawNumeric => write!(f, "RAW"),
        }
    }
}

/// An obscured wager amount. Never decoded without authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObscuredToken(String);

impl ObscuredToken {
    /// Wrap an already-encoded token string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme this token declares by its prefix.
    #[must_use]
    pub fn scheme(&self) -> TokenScheme {
        if self.0.starts_with(constants::TOKEN_SCHEME_TAG) {
            TokenScheme::Fhe
        } else {
            TokenScheme::RawNumeric
        }
    }

    /// The token body after the scheme tag (the whole string for raw tokens).
    #[must_use]
    pub fn body(&self) -> &str {
        self.0
            .strip_prefix(constants::TOKEN_SCHEME_TAG)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ObscuredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
