//! Signature-gated decoding of obscured amounts.
//!
//! Every call asks the signer for a **fresh** signature over the challenge's
//! canonical message; nothing about a previous authorization is cached.
//! Only after signing succeeds (and, when a verifying key is configured,
//! the signature verifies) is the token decoded.

use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use rust_decimal::Decimal;
use wagerledger_codec::{AmountCodec, TaggedBase64Codec};
use wagerledger_types::{DisclosureConfig, ObscuredToken, Result, WagerError, time};

use crate::challenge::DisclosureChallenge;
use crate::signer::{MessageSigner, verify_ed25519};

/// Gate in front of [`AmountCodec::decode`].
pub struct DisclosureGate<C = TaggedBase64Codec> {
    codec: C,
    settle_delay: Duration,
    verifier: Option<VerifyingKey>,
}

impl DisclosureGate {
    /// Gate using the default codec.
    #[must_use]
    pub fn new(config: &DisclosureConfig) -> Self {
        Self::with_codec(config, TaggedBase64Codec)
    }
}

impl<C: AmountCodec> DisclosureGate<C> {
    pub fn with_codec(config: &DisclosureConfig, codec: C) -> Self {
        Self {
            codec,
            settle_delay: config.settle_delay(),
            verifier: None,
        }
    }

    /// Also require the signature to verify under `key`.
    #[must_use]
    pub fn with_verifier(mut self, key: VerifyingKey) -> Self {
        self.verifier = Some(key);
        self
    }

    /// Obtain a fresh signature over `challenge`, then decode `token`.
    ///
    /// # Errors
    /// - `ChallengeExpired` if the challenge window has elapsed
    /// - `AuthorizationDeclined` if signing fails or the signature does not verify
    /// - `MalformedToken` from the codec
    pub async fn decrypt_with_authorization<M: MessageSigner>(
        &self,
        token: &ObscuredToken,
        challenge: &DisclosureChallenge,
        signer: &M,
    ) -> Result<Decimal> {
        if challenge.is_expired_at(time::now_secs()) {
            return Err(WagerError::ChallengeExpired {
                expired_at: challenge.expires_at(),
            });
        }

        let message = challenge.canonical_message();
        let signature = signer.sign_message(&message).await.map_err(|e| {
            tracing::info!(challenge = %challenge.fingerprint(), error = %e, "Disclosure signature declined");
            match e {
                WagerError::AuthorizationDeclined { .. } => e,
                other => WagerError::AuthorizationDeclined {
                    reason: other.to_string(),
                },
            }
        })?;
        if signature.is_empty() {
            return Err(WagerError::AuthorizationDeclined {
                reason: "wallet returned an empty signature".into(),
            });
        }
        if let Some(key) = &self.verifier {
            verify_ed25519(key, &message, &signature)?;
        }

        // Pacing only; no state depends on it.
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let value = self.codec.decode(token)?;
        tracing::debug!(challenge = %challenge.fingerprint(), "Disclosure authorized");
        Ok(value)
    }
}
