//! End-to-end integration tests across the ledger stack.
//!
//! These tests exercise the full bet lifecycle:
//! `BetManager` (create) -> `LedgerStore` -> settlement -> `DisclosureGate`
//!
//! They verify that the components work together in realistic scenarios:
//! multiple clients sharing one store, legacy and corrupted records,
//! concurrent writers, and recovery from a partial create.

use std::sync::Arc;

use rust_decimal::Decimal;
use wagerledger_codec::{OperationTag, decode, encode, transform};
use wagerledger_disclosure::{
    DisclosureChallenge, DisclosureGate, Ed25519Signer, MessageSigner, SessionContext,
    WalletSignature, build_challenge,
};
use wagerledger_ledger::{BetManager, apply_outcome};
use wagerledger_store::{InMemoryStore, KeyValueStore};
use wagerledger_types::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_config() -> WagerConfig {
    WagerConfig::from_json_str(
        r#"{ "disclosure": { "settle_delay_ms": 0, "public_key_bytes": 32 } }"#,
    )
    .expect("test config should parse")
}

/// Helper: several clients over one shared store.
struct Deployment {
    store: Arc<InMemoryStore>,
    config: WagerConfig,
}

impl Deployment {
    fn new() -> Self {
        init_tracing();
        Self {
            store: Arc::new(InMemoryStore::new()),
            config: test_config(),
        }
    }

    fn client(&self) -> BetManager<Arc<InMemoryStore>> {
        BetManager::new(Arc::clone(&self.store), &self.config)
    }

    fn challenge(&self) -> DisclosureChallenge {
        build_challenge(
            &SessionContext::start_now("0x5fbdb2315678afecb367f032d93f642f64180aa3", 31_337),
            &self.config.disclosure,
        )
    }

    async fn put_raw(&self, key: &str, json: &str) {
        self.store
            .set_data(key, json.as_bytes().to_vec())
            .await
            .expect("raw write should succeed");
    }
}

struct DecliningWallet;

impl MessageSigner for DecliningWallet {
    async fn sign_message(&self, _message: &str) -> Result<WalletSignature> {
        Err(WagerError::AuthorizationDeclined {
            reason: "User rejected the request.".into(),
        })
    }
}

fn alice() -> BettorAddress {
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        .parse()
        .expect("valid address")
}

fn bob() -> BettorAddress {
    BettorAddress::dummy(0xb0)
}

// =============================================================================
// Test: create -> settle(won) -> authorized disclosure
// =============================================================================
#[tokio::test]
async fn e2e_create_settle_disclose() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let wallet = Ed25519Signer::generate();
    let client = client.with_gate(
        DisclosureGate::new(&deployment.config.disclosure).with_verifier(wallet.verifying_key()),
    );

    let key = client
        .create_bet(GameId::new("LOL"), "Team A wins", Decimal::ONE, alice())
        .await
        .expect("create should succeed");

    // Exactly one pending record under the returned key.
    let bets = client.list_bets().await.unwrap();
    assert_eq!(bets.len(), 1);
    assert_eq!(bets[0].key, key);
    let record = &bets[0].record;
    assert_eq!(record.status, BetStatus::Pending);
    assert!(record.odds >= Decimal::new(15, 1) && record.odds < Decimal::new(2, 0));
    let odds_at_creation = record.odds;

    // Settle as won: stake doubled, odds untouched.
    client.settle(&key, Outcome::Won).await.unwrap();
    let settled = client.bet(&key).await.unwrap().record;
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(settled.odds, odds_at_creation);
    assert_eq!(decode(&settled.amount).unwrap(), Decimal::new(2, 0));

    // Authorized disclosure returns the payout.
    let revealed = client
        .decrypt_bet(&key, &deployment.challenge(), &wallet)
        .await
        .unwrap();
    assert_eq!(revealed, Decimal::new(2, 0));
}

// =============================================================================
// Test: stored JSON keeps the established field names
// =============================================================================
#[tokio::test]
async fn e2e_stored_layout() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let key = client
        .create_bet(GameId::new("VALORANT"), "Sentinels", Decimal::new(25, 1), alice())
        .await
        .unwrap();

    let index: Vec<String> =
        serde_json::from_slice(&deployment.store.get_data("bet_keys").await.unwrap()).unwrap();
    assert_eq!(index, vec![key.to_string()]);

    let raw = deployment
        .store
        .get_data(&format!("bet_{key}"))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json["amount"], "FHE-Mi41");
    assert_eq!(json["better"], alice().to_string());
    assert_eq!(json["gameId"], "VALORANT");
    assert_eq!(json["prediction"], "Sentinels");
    assert_eq!(json["status"], "pending");
    assert!(json["odds"].is_f64());
    assert!(json["timestamp"].is_u64());
}

// =============================================================================
// Test: legacy and corrupted records
// =============================================================================
#[tokio::test]
async fn e2e_listing_survives_bad_records() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let good = client
        .create_bet(GameId::new("LOL"), "Team A wins", Decimal::ONE, alice())
        .await
        .unwrap();

    // A record written before odds/status existed, with a bare-number amount.
    deployment
        .put_raw(
            "bet_legacy",
            &format!(
                r#"{{"amount":"2.5","timestamp":1,"better":"{}","gameId":"DOTA2","prediction":"Radiant"}}"#,
                bob()
            ),
        )
        .await;
    deployment.put_raw("bet_broken", "{\"amount\": ").await;
    for key in ["legacy", "broken", "missing"] {
        client.store().append_key(&BetKey::from(key)).await.unwrap();
    }

    let bets = client.list_bets().await.unwrap();
    let keys: Vec<&str> = bets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec![good.as_str(), "legacy"]);

    let legacy = &bets[1].record;
    assert_eq!(legacy.status, BetStatus::Pending);
    assert_eq!(legacy.odds, Decimal::new(15, 1));
    assert_eq!(decode(&legacy.amount).unwrap(), Decimal::new(25, 1));

    // Legacy records settle like any other; the payout moves to the tagged scheme.
    let settled = client
        .settle(&BetKey::from("legacy"), Outcome::Won)
        .await
        .unwrap();
    assert_eq!(settled.amount, encode(Decimal::new(5, 0)));
    assert_eq!(settled.version, 1);

    // Keyed operations on the broken record report it as absent.
    let err = client
        .settle(&BetKey::from("broken"), Outcome::Lost)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::NotFound(_)));
}

// =============================================================================
// Test: lifecycle violations
// =============================================================================
#[tokio::test]
async fn e2e_terminal_states_are_final() {
    let deployment = Deployment::new();
    let client = deployment.client();

    let won = client
        .create_bet(GameId::new("CSGO"), "NaVi", Decimal::new(3, 0), alice())
        .await
        .unwrap();
    client.settle(&won, Outcome::Won).await.unwrap();
    assert!(matches!(
        client.settle(&won, Outcome::Lost).await,
        Err(WagerError::InvalidTransition { .. })
    ));
    assert!(matches!(
        client.cancel_bet(&won, &alice()).await,
        Err(WagerError::InvalidTransition { .. })
    ));
    // Settling twice never doubles twice.
    assert_eq!(
        decode(&client.bet(&won).await.unwrap().record.amount).unwrap(),
        Decimal::new(6, 0)
    );

    let canceled = client
        .create_bet(GameId::new("PUBG"), "Squad wipe", Decimal::ONE, bob())
        .await
        .unwrap();
    assert!(matches!(
        client.cancel_bet(&canceled, &alice()).await,
        Err(WagerError::NotOwner(_))
    ));
    client.cancel_bet(&canceled, &bob()).await.unwrap();
    assert!(matches!(
        client.settle(&canceled, Outcome::Won).await,
        Err(WagerError::InvalidTransition { .. })
    ));

    let stats = client.stats().await.unwrap();
    assert_eq!((stats.won, stats.canceled, stats.total()), (1, 1, 2));
}

// =============================================================================
// Test: two clients racing on one record
// =============================================================================
#[tokio::test]
async fn e2e_stale_writer_is_rejected() {
    let deployment = Deployment::new();
    let operator_a = deployment.client();
    let operator_b = deployment.client();

    let key = operator_a
        .create_bet(GameId::new("LOL"), "Team B wins", Decimal::new(4, 0), alice())
        .await
        .unwrap();

    // B reads, then A settles, then B tries to write its stale view.
    let stale = operator_b.store().read_stored(&key).await.unwrap().unwrap();
    operator_a.settle(&key, Outcome::Won).await.unwrap();

    let next = apply_outcome(&stale.record, Outcome::Lost, &wagerledger_codec::TaggedBase64Codec)
        .unwrap();
    let err = operator_b
        .store()
        .replace_record(&key, &stale, next)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::StaleWrite(_)));

    let record = operator_b.bet(&key).await.unwrap().record;
    assert_eq!(record.status, BetStatus::Won);
    assert_eq!(decode(&record.amount).unwrap(), Decimal::new(8, 0));
}

// =============================================================================
// Test: concurrent creates never lose a record
// =============================================================================
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_creates_reconcile() {
    let deployment = Deployment::new();
    let mut handles = Vec::new();
    for i in 0..16_i64 {
        let client = deployment.client();
        handles.push(tokio::spawn(async move {
            client
                .create_bet(GameId::new("DOTA2"), format!("map {i}"), Decimal::new(i + 1, 0), bob())
                .await
        }));
    }

    let mut created = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(key) => created.push(key),
            Err(WagerError::StaleWrite(_)) => {}
            Err(other) => panic!("unexpected create failure: {other}"),
        }
    }

    let client = deployment.client();
    let index = client.store().read_index().await.unwrap();
    for key in &created {
        assert!(index.contains(key), "acknowledged bet {key} missing from index");
    }

    // Records whose index append lost a race are recovered.
    client.reconcile_index().await.unwrap();
    assert_eq!(client.list_bets().await.unwrap().len(), 16);
    assert!(client.reconcile_index().await.unwrap().is_clean());
}

// =============================================================================
// Test: partial create recovered by reconciliation
// =============================================================================
#[tokio::test]
async fn e2e_index_failure_then_reconcile() {
    let deployment = Deployment::new();
    let client = deployment.client();

    deployment.store.fail_writes_to("bet_keys").await;
    let err = client
        .create_bet(GameId::new("LOL"), "Team A wins", Decimal::ONE, alice())
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::StoreUnavailable { .. }));
    assert!(client.list_bets().await.unwrap().is_empty());

    deployment.store.clear_write_failures().await;
    let report = client.reconcile_index().await.unwrap();
    assert_eq!(report.adopted.len(), 1);
    assert!(report.dangling.is_empty());

    let bets = client.list_bets().await.unwrap();
    assert_eq!(bets.len(), 1);
    assert_eq!(bets[0].record.status, BetStatus::Pending);
}

// =============================================================================
// Test: disclosure refusals
// =============================================================================
#[tokio::test]
async fn e2e_declined_disclosure_reveals_nothing() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let key = client
        .create_bet(GameId::new("LOL"), "Team A wins", Decimal::ONE, alice())
        .await
        .unwrap();

    let err = client
        .decrypt_bet(&key, &deployment.challenge(), &DecliningWallet)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::AuthorizationDeclined { .. }));

    // A signature from a wallet other than the configured one is refused too.
    let expected = Ed25519Signer::from_seed(&[1u8; 32]);
    let strict = deployment.client().with_gate(
        DisclosureGate::new(&deployment.config.disclosure).with_verifier(expected.verifying_key()),
    );
    let err = strict
        .decrypt_bet(&key, &deployment.challenge(), &Ed25519Signer::from_seed(&[2u8; 32]))
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::AuthorizationDeclined { .. }));
}

// =============================================================================
// Test: store outage
// =============================================================================
#[tokio::test]
async fn e2e_store_outage_surfaces() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let key = client
        .create_bet(GameId::new("LOL"), "Team A wins", Decimal::ONE, alice())
        .await
        .unwrap();

    deployment.store.set_available(false);
    assert!(matches!(
        client.list_bets().await,
        Err(WagerError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        client.settle(&key, Outcome::Won).await,
        Err(WagerError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        client.reconcile_index().await,
        Err(WagerError::StoreUnavailable { .. })
    ));

    deployment.store.set_available(true);
    assert_eq!(client.list_bets().await.unwrap().len(), 1);
}

// =============================================================================
// Test: codec laws hold on stored tokens
// =============================================================================
#[tokio::test]
async fn e2e_transforms_on_stored_amount() {
    let deployment = Deployment::new();
    let client = deployment.client();
    let key = client
        .create_bet(GameId::new("CSGO"), "Overtime", Decimal::new(10, 0), alice())
        .await
        .unwrap();
    let token = client.bet(&key).await.unwrap().record.amount;

    assert_eq!(
        decode(&transform(&token, OperationTag::Identity).unwrap()).unwrap(),
        Decimal::new(10, 0)
    );
    assert_eq!(
        decode(&transform(&token, OperationTag::IncreaseTenPercent).unwrap()).unwrap(),
        Decimal::new(11, 0)
    );
    assert_eq!(
        decode(&transform(&token, OperationTag::DecreaseTenPercent).unwrap()).unwrap(),
        Decimal::new(9, 0)
    );
    let lenient = OperationTag::from_tag_lenient("triple");
    assert_eq!(lenient, OperationTag::Identity);
}
