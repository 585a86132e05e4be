//! Session-scoped disclosure challenges.
//!
//! A challenge binds a signature to one session: a throwaway public key, the
//! ledger contract address, the chain, and a validity window. It is built
//! once per session and never persisted.
//!
//! The canonical message is byte-stable; external verifiers reconstruct it
//! from the same five fields:
//!
//! ```text
//! publickey:<hex>
//! contractAddresses:<address>
//! contractsChainId:<int>
//! startTimestamp:<int>
//! durationDays:<int>
//! ```

use rand::RngCore;
use sha2::{Digest, Sha256};
use wagerledger_types::{DisclosureConfig, constants, time};

/// Where and when a client session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Resolved address of the ledger contract.
    pub contract_address: String,
    /// Active chain identifier.
    pub chain_id: u64,
    /// Session start, seconds since the UNIX epoch.
    pub started_at: u64,
}

impl SessionContext {
    /// A session starting now.
    pub fn start_now(contract_address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            contract_address: contract_address.into(),
            chain_id,
            started_at: time::now_secs(),
        }
    }
}

/// Everything a wallet signs to authorize disclosure in one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureChallenge {
    /// `0x`-prefixed hex public-key-shaped string.
    pub public_key: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl DisclosureChallenge {
    /// Assemble a fresh challenge for `session`.
    pub fn build(session: &SessionContext, config: &DisclosureConfig) -> Self {
        Self {
            public_key: generate_public_key(config.public_key_bytes),
            contract_address: session.contract_address.clone(),
            chain_id: session.chain_id,
            start_timestamp: session.started_at,
            duration_days: config.duration_days,
        }
    }

    /// The exact text handed to the wallet for signing.
    pub fn canonical_message(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.contract_address,
            self.chain_id,
            self.start_timestamp,
            self.duration_days
        )
    }

    /// End of the validity window, seconds since the UNIX epoch.
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(u64::from(self.duration_days) * constants::SECONDS_PER_DAY)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    /// Short SHA-256 digest of the canonical message, for log lines.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.canonical_message().as_bytes());
        hex::encode(&digest[..8])
    }
}

/// Build the challenge for a session.
pub fn build_challenge(session: &SessionContext, config: &DisclosureConfig) -> DisclosureChallenge {
    DisclosureChallenge::build(session, config)
}

/// `0x` followed by `2 * bytes` random hex characters.
fn generate_public_key(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    format!("0x{}", hex::encode(buf))
}
