//! Wall-clock helpers.

use chrono::Utc;

/// Seconds since the UNIX epoch (0 if the clock reads before 1970).
#[must_use]
pub fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2023() {
        assert!(now_secs() > 1_700_000_000);
    }
}
