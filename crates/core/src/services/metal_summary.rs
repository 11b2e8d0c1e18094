use std::collections::HashMap;

use crate::models::aggregate::{CategoryBreakdown, Percentage};
use crate::models::holding::{HoldingRecord, MetalType};
use crate::models::summary::MetalSummary;

use super::derivation::bucket_by;

/// Headline numbers over every metal lot in `records` (other classes are ignored).
pub fn summarize_metals(records: &[HoldingRecord]) -> MetalSummary {
    let mut total_invested = 0.0;
    let mut current_value = 0.0;
    let mut total_weight_by_metal: HashMap<MetalType, f64> = HashMap::new();
    let mut total_items = 0;

    for record in records {
        let Some(metal) = record.as_metal() else {
            continue;
        };
        total_invested += record.invested();
        current_value += record.current_value();
        *total_weight_by_metal.entry(metal.metal).or_insert(0.0) += record.quantity();
        total_items += 1;
    }

    let total_profit_loss = current_value - total_invested;
    MetalSummary {
        total_invested,
        current_value,
        total_profit_loss,
        overall_return: Percentage::ratio(total_profit_loss, total_invested),
        total_weight_by_metal,
        total_items,
    }
}

/// Allocation of metal lots by metal type (non-metal holdings are skipped).
pub fn metal_allocation(records: &[HoldingRecord]) -> Vec<CategoryBreakdown> {
    let metals: Vec<HoldingRecord> = records
        .iter()
        .filter(|r| r.as_metal().is_some())
        .cloned()
        .collect();
    bucket_by(&metals, |r| {
        r.as_metal()
            .map(|m| m.metal.to_string())
            .unwrap_or_default()
    })
}
