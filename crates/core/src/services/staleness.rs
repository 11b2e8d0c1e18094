use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::models::holding::HoldingRecord;

/// Result of a staleness check on a price timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessCheck {
    pub is_stale: bool,
    /// How old the price is (negative if stamped in the future)
    pub age: Duration,
    pub threshold: Duration,
}

pub fn check_staleness(
    last_updated_at: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> StalenessCheck {
    let age = now - last_updated_at;
    StalenessCheck {
        is_stale: age > threshold,
        age,
        threshold,
    }
}

/// Live-priced holdings whose price is older than `threshold`, with their checks.
/// Manually priced classes (deposits, property) never count as stale.
pub fn stale_holdings<'a>(
    records: &'a [HoldingRecord],
    now: DateTime<Utc>,
    threshold: Duration,
) -> Vec<(&'a HoldingRecord, StalenessCheck)> {
    records
        .iter()
        .filter(|r| r.quote_identifier().is_some())
        .map(|r| (r, check_staleness(r.last_updated_at(), now, threshold)))
        .filter(|(r, check)| {
            if check.is_stale {
                debug!(
                    "Price for '{}' is stale: {} minutes old (threshold {})",
                    r.id,
                    check.age.num_minutes(),
                    threshold.num_minutes()
                );
            }
            check.is_stale
        })
        .collect()
}
