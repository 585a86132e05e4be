//! The wallet signature boundary.
//!
//! A [`MessageSigner`] stands in for the user's wallet prompt: it is asked to
//! sign one exact message and may decline. There is no timeout; a prompt
//! that never resolves leaves the caller's future pending until dropped.

use std::future::Future;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use wagerledger_types::{Result, WagerError};

/// Raw signature bytes as returned by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSignature(Vec<u8>);

impl WalletSignature {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Something that can sign a text message on the bettor's behalf.
pub trait MessageSigner: Send + Sync {
    fn sign_message(&self, message: &str) -> impl Future<Output = Result<WalletSignature>> + Send;
}

/// Local ed25519 wallet stand-in.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl MessageSigner for Ed25519Signer {
    async fn sign_message(&self, message: &str) -> Result<WalletSignature> {
        let signature = self.key.sign(message.as_bytes());
        Ok(WalletSignature(signature.to_bytes().to_vec()))
    }
}

/// Check an ed25519 signature over `message`.
pub fn verify_ed25519(key: &VerifyingKey, message: &str, signature: &WalletSignature) -> Result<()> {
    let sig = Signature::from_slice(signature.as_bytes()).map_err(|e| {
        WagerError::AuthorizationDeclined {
            reason: format!("malformed signature: {e}"),
        }
    })?;
    key.verify(message.as_bytes(), &sig)
        .map_err(|e| WagerError::AuthorizationDeclined {
            reason: format!("signature does not verify: {e}"),
        })
}
