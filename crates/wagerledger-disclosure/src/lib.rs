//! # wagerledger-disclosure
//!
//! **Signature-Gated Disclosure**: a bettor sees the plaintext of an
//! obscured amount only after their wallet signs a session challenge.
//!
//! ## Flow
//!
//! ```text
//! SessionContext ──build_challenge──▶ DisclosureChallenge
//!                                          │ canonical_message()
//!                                          ▼
//!                                   MessageSigner::sign_message
//!                                          │ ok (fresh, every request)
//!                                          ▼
//!                      DisclosureGate ── verify? ── delay ── decode
//! ```
//!
//! The gate is a usability contract, not a confidentiality boundary: the
//! underlying codec is reversible by anyone holding the token.

pub mod challenge;
pub mod gate;
pub mod signer;

pub use challenge::{DisclosureChallenge, SessionContext, build_challenge};
pub use gate::DisclosureGate;
pub use signer::{Ed25519Signer, MessageSigner, WalletSignature, verify_ed25519};
