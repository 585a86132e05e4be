//! # wagerledger-codec
//!
//! **Obscured Value Codec**: reversible encoding of wager amounts into
//! opaque [`ObscuredToken`]s, and a closed set of arithmetic transforms
//! applied to tokens without handing the plaintext back to the caller.
//!
//! This is an encoding, not encryption. Anyone holding a token can decode
//! it; the codec only fixes the *shape* of the protocol so that a real
//! confidential-computation backend can replace [`TaggedBase64Codec`]
//! behind the [`AmountCodec`] trait without touching call sites.
//!
//! ## Token format
//!
//! ```text
//! "FHE-" || base64(decimal_string)      current scheme
//! decimal_string                         legacy bare number
//! ```
//!
//! Input validation (sign, range) belongs to the caller: the codec encodes
//! whatever it is given. That is a narrow trust boundary, not a security
//! boundary.

pub mod operation;

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use wagerledger_types::{ObscuredToken, Result, TokenScheme, WagerError, constants};

pub use operation::OperationTag;

/// Encode, decode and transform obscured amounts.
pub trait AmountCodec: Send + Sync {
    fn encode(&self, value: Decimal) -> ObscuredToken;

    fn decode(&self, token: &ObscuredToken) -> Result<Decimal>;

    /// Decode, apply `op`, re-encode. The intermediate value never leaves
    /// the codec.
    fn transform(&self, token: &ObscuredToken, op: OperationTag) -> Result<ObscuredToken>;
}

/// The `FHE-` + base64 scheme. Untagged tokens decode as bare numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedBase64Codec;

impl AmountCodec for TaggedBase64Codec {
    fn encode(&self, value: Decimal) -> ObscuredToken {
        let body = STANDARD.encode(value.normalize().to_string());
        ObscuredToken::from_raw(format!("{}{body}", constants::TOKEN_SCHEME_TAG))
    }

    fn decode(&self, token: &ObscuredToken) -> Result<Decimal> {
        match token.scheme() {
            TokenScheme::Fhe => {
                decode_tagged(token.body()).map_err(|reason| WagerError::MalformedToken { reason })
            }
            TokenScheme::RawNumeric => parse_number(token.as_str()),
        }
    }

    fn transform(&self, token: &ObscuredToken, op: OperationTag) -> Result<ObscuredToken> {
        let value = self.decode(token)?;
        let result = op.apply(value)?;
        tracing::debug!(op = %op, scheme = %token.scheme(), "Applied obscured transform");
        Ok(self.encode(result))
    }
}

/// Encode with the default codec.
#[must_use]
pub fn encode(value: Decimal) -> ObscuredToken {
    TaggedBase64Codec.encode(value)
}

/// Decode with the default codec.
pub fn decode(token: &ObscuredToken) -> Result<Decimal> {
    TaggedBase64Codec.decode(token)
}

/// Transform with the default codec.
pub fn transform(token: &ObscuredToken, op: OperationTag) -> Result<ObscuredToken> {
    TaggedBase64Codec.transform(token, op)
}

fn decode_tagged(body: &str) -> std::result::Result<Decimal, String> {
    let bytes = STANDARD
        .decode(body)
        .map_err(|e| format!("invalid base64 body: {e}"))?;
    let text = String::from_utf8(bytes).map_err(|e| format!("body is not UTF-8: {e}"))?;
    parse_number(&text).map_err(|e| e.to_string())
}

/// Parse a plain or scientific-notation decimal string.
fn parse_number(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WagerError::MalformedToken {
            reason: "empty numeric body".into(),
        });
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| WagerError::MalformedToken {
            reason: format!("{trimmed:?} is not a number: {e}"),
        })
}
