//! System-wide constants for the WagerLedger.

/// Storage key of the append-only bet key index.
pub const INDEX_KEY: &str = "bet_keys";

/// Prefix prepended to a bet key to form its storage key.
pub const RECORD_PREFIX: &str = "bet_";

/// Scheme tag carried by tokens produced by the current codec.
pub const TOKEN_SCHEME_TAG: &str = "FHE-";

/// Games accepted by default when no configuration is supplied.
pub const DEFAULT_ACTIVE_GAMES: [&str; 5] = ["LOL", "DOTA2", "CSGO", "VALORANT", "PUBG"];

/// Lower bound (inclusive) of the odds drawn at bet creation, in basis points.
pub const DEFAULT_ODDS_MIN_BPS: i64 = 15_000;

/// Upper bound (exclusive) of the odds drawn at bet creation, in basis points.
pub const DEFAULT_ODDS_MAX_BPS: i64 = 20_000;

/// Odds assumed for legacy records stored without an `odds` field, in basis points.
pub const LEGACY_ODDS_BPS: i64 = 15_000;

/// Scale used by the basis-point constants above (4 decimal places).
pub const ODDS_BPS_SCALE: u32 = 4;

/// Default disclosure challenge validity window, in days.
pub const DEFAULT_CHALLENGE_DURATION_DAYS: u32 = 30;

/// Default pause between a successful signature and decoding, in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1500;

/// Number of random bytes behind a generated challenge public key
/// (rendered as twice as many hex characters).
pub const DEFAULT_PUBLIC_KEY_BYTES: usize = 1000;

/// Maximum accepted length of a prediction, in bytes.
pub const MAX_PREDICTION_LEN: usize = 512;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
