use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::holding::HoldingRecord;
use crate::models::quote::SpotQuote;

fn validate_quote(identifier: &str, price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        warn!("Rejecting quote for {identifier}: {price}");
        return Err(CoreError::InvalidQuote {
            identifier: identifier.to_string(),
            price,
        });
    }
    Ok(())
}

/// Fold one observed unit price into a holding.
///
/// Returns a new record with `current_unit_price`, `current_value` and
/// `last_updated_at` advanced together; `record` itself is untouched.
/// `last_updated_at` moves to `observed_at` even when the price is unchanged.
pub fn apply_live_quote(
    record: &HoldingRecord,
    new_unit_price: f64,
    observed_at: DateTime<Utc>,
) -> Result<HoldingRecord, CoreError> {
    validate_quote(&record.id, new_unit_price)?;
    let mut updated = record.clone();
    updated.reprice(new_unit_price, observed_at);
    Ok(updated)
}

/// Fold a batch of quotes into a collection of holdings.
///
/// Each record is matched by its [`quote_identifier`](HoldingRecord::quote_identifier);
/// records without a matching quote pass through unchanged, in place.
/// If any matched quote is invalid the whole batch is rejected, so the caller
/// never ends up with some records repriced and others not.
pub fn apply_live_quotes(
    records: &[HoldingRecord],
    quotes_by_identifier: &HashMap<String, SpotQuote>,
) -> Result<Vec<HoldingRecord>, CoreError> {
    let mut updated = Vec::with_capacity(records.len());
    let mut repriced = 0usize;

    for record in records {
        let quote = record
            .quote_identifier()
            .and_then(|id| quotes_by_identifier.get(&id));
        match quote {
            Some(q) => {
                validate_quote(&q.identifier, q.price_per_unit)?;
                let mut next = record.clone();
                next.reprice(q.price_per_unit, q.as_of);
                updated.push(next);
                repriced += 1;
            }
            None => updated.push(record.clone()),
        }
    }

    debug!(
        "Applied {} quotes: {repriced} of {} holdings repriced",
        quotes_by_identifier.len(),
        records.len()
    );
    Ok(updated)
}
