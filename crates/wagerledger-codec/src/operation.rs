//! The closed set of arithmetic transforms applicable to obscured amounts.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use wagerledger_types::{Result, WagerError};

/// A numeric operation applied to an obscured amount.
///
/// Wire names match the tags older clients used: `increase10%`,
/// `decrease10%`, `double`. Every other tag means identity under lenient
/// parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationTag {
    IncreaseTenPercent,
    DecreaseTenPercent,
    Double,
    Identity,
}

impl OperationTag {
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::IncreaseTenPercent => "increase10%",
            Self::DecreaseTenPercent => "decrease10%",
            Self::Double => "double",
            Self::Identity => "identity",
        }
    }

    /// Parse a tag, mapping anything unknown to [`OperationTag::Identity`].
    #[must_use]
    pub fn from_tag_lenient(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            tracing::warn!(tag, "Unknown transform tag, falling back to identity");
            Self::Identity
        })
    }

    /// Apply the operation to a plaintext value.
    ///
    /// Crate-private: callers only ever see the re-encoded result.
    pub(crate) fn apply(self, value: Decimal) -> Result<Decimal> {
        let factor = match self {
            Self::IncreaseTenPercent => Decimal::new(11, 1),
            Self::DecreaseTenPercent => Decimal::new(9, 1),
            Self::Double => Decimal::TWO,
            Self::Identity => return Ok(value),
        };
        value
            .checked_mul(factor)
            .ok_or_else(|| WagerError::ArithmeticOverflow {
                operation: self.wire_name().to_string(),
            })
    }
}

impl FromStr for OperationTag {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "increase10%" => Ok(Self::IncreaseTenPercent),
            "decrease10%" => Ok(Self::DecreaseTenPercent),
            "double" => Ok(Self::Double),
            "identity" => Ok(Self::Identity),
            other => Err(WagerError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
