use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::aggregate::{CategoryBreakdown, Percentage, PortfolioAggregate};
use crate::models::holding::{HoldingDetails, HoldingRecord};
use crate::models::query::{CategoryKey, HoldingFilter, SortDirection, SortField};
use crate::models::summary::UrgencyTier;
use crate::models::trend::{AccrualEvent, Granularity, TrendPoint};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Upper bound (inclusive) of the high-urgency tier, in days.
pub const IMMINENT_HIGH_DAYS: i64 = 30;
/// Upper bound (inclusive) of the medium-urgency tier, in days.
pub const IMMINENT_MEDIUM_DAYS: i64 = 90;

// ── Aggregation ─────────────────────────────────────────────────────

/// Roll a set of holdings up into totals plus a per-asset-class breakdown.
///
/// Empty input gives an all-zero aggregate with an undefined return.
/// `total_current_value` is summed from the category subtotals, so the
/// breakdown always adds up to the total for this snapshot. Nothing is rounded.
pub fn summarize(records: &[HoldingRecord]) -> PortfolioAggregate {
    let categories = bucket_by(records, |r| r.asset_class().to_string());

    let total_invested: f64 = categories.iter().map(|c| c.invested).sum();
    let total_current_value: f64 = categories.iter().map(|c| c.current_value).sum();
    let total_gain = total_current_value - total_invested;

    PortfolioAggregate {
        total_invested,
        total_current_value,
        total_gain,
        total_return_percent: Percentage::ratio(total_gain, total_invested),
        categories,
    }
}

/// Group holdings by an arbitrary key and subtotal each group.
///
/// Groups appear in order of first occurrence in `records`.
pub fn bucket_by<F, K>(records: &[HoldingRecord], mut key_fn: F) -> Vec<CategoryBreakdown>
where
    F: FnMut(&HoldingRecord) -> K,
    K: Into<String>,
{
    let keys: Vec<String> = records.iter().map(|r| key_fn(r).into()).collect();
    group(records, keys)
}

/// Group holdings by one of the known category keys.
///
/// Fails with `UnknownCategoryKey` if the key does not apply to every record
/// (filter the records by class first).
pub fn bucket_by_category(
    records: &[HoldingRecord],
    key: CategoryKey,
) -> Result<Vec<CategoryBreakdown>, CoreError> {
    let keys = records
        .iter()
        .map(|r| key.key_for(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(group(records, keys))
}

fn group(records: &[HoldingRecord], keys: Vec<String>) -> Vec<CategoryBreakdown> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CategoryBreakdown> = Vec::new();

    for (record, key) in records.iter().zip(keys) {
        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(CategoryBreakdown {
                key,
                count: 0,
                invested: 0.0,
                current_value: 0.0,
                gain: 0.0,
                return_percent: Percentage::Undefined,
                weight: None,
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];
        group.count += 1;
        group.invested += record.invested();
        group.current_value += record.current_value();
    }

    let total: f64 = groups.iter().map(|g| g.current_value).sum();
    for group in &mut groups {
        group.gain = group.current_value - group.invested;
        group.return_percent = Percentage::ratio(group.gain, group.invested);
        group.weight = if total != 0.0 {
            Some(group.current_value / total)
        } else {
            None
        };
    }
    groups
}

// ── Filtering ───────────────────────────────────────────────────────

/// Records matching `filter`, in their original order. `HoldingFilter::All` returns everything.
pub fn filter_by_status_or_type<'a>(
    records: &'a [HoldingRecord],
    filter: &HoldingFilter,
) -> Vec<&'a HoldingRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

// ── Sorting ─────────────────────────────────────────────────────────

/// Comparable projection of one field of one record.
enum SortValue {
    Number(f64),
    Instant(DateTime<Utc>),
    /// (case-folded, original)
    Text(String, String),
    /// Undefined percentages: always ordered last
    Missing,
}

fn text(s: &str) -> SortValue {
    SortValue::Text(s.to_lowercase(), s.to_string())
}

fn instant(date: NaiveDate) -> SortValue {
    SortValue::Instant(date.and_time(NaiveTime::MIN).and_utc())
}

fn sort_value(record: &HoldingRecord, field: SortField) -> Result<SortValue, CoreError> {
    let value = match field {
        SortField::Name => text(&record.name),
        SortField::AssetClass => text(&record.asset_class().to_string()),
        SortField::Quantity => SortValue::Number(record.quantity()),
        SortField::UnitCostBasis => SortValue::Number(record.unit_cost_basis),
        SortField::Invested => SortValue::Number(record.invested()),
        SortField::CurrentUnitPrice => SortValue::Number(record.current_unit_price()),
        SortField::CurrentValue => SortValue::Number(record.current_value()),
        SortField::Gain => SortValue::Number(record.gain()),
        SortField::ReturnPercent => match Percentage::ratio(record.gain(), record.invested()) {
            Percentage::Defined(v) => SortValue::Number(v),
            Percentage::Undefined => SortValue::Missing,
        },
        SortField::AcquisitionDate => instant(record.acquisition_date),
        SortField::LastUpdatedAt => SortValue::Instant(record.last_updated_at()),
        _ => class_specific_value(record, field).ok_or_else(|| {
            CoreError::UnsortableField(format!(
                "{field} on {} holding '{}'",
                record.asset_class(),
                record.id
            ))
        })?,
    };
    Ok(value)
}

fn class_specific_value(record: &HoldingRecord, field: SortField) -> Option<SortValue> {
    match (&record.details, field) {
        (HoldingDetails::FixedDeposit(d), SortField::BankName) => Some(text(&d.bank_name)),
        (HoldingDetails::FixedDeposit(d), SortField::InterestRate) => {
            Some(SortValue::Number(d.interest_rate_percent))
        }
        (HoldingDetails::FixedDeposit(d), SortField::MaturityDate) => Some(instant(d.maturity_date)),
        (HoldingDetails::FixedDeposit(d), SortField::MaturityAmount) => {
            Some(SortValue::Number(d.maturity_amount))
        }
        (HoldingDetails::PreciousMetal(m), SortField::MetalType) => Some(text(&m.metal.to_string())),
        (HoldingDetails::PreciousMetal(m), SortField::Purity) => Some(text(&m.purity)),
        (HoldingDetails::Crypto(c), SortField::Symbol) => Some(text(&c.symbol)),
        _ => None,
    }
}

fn compare(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
        (SortValue::Missing, _) => return Ordering::Greater,
        (_, SortValue::Missing) => return Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Instant(x), SortValue::Instant(y)) => x.cmp(y),
        (SortValue::Text(fx, x), SortValue::Text(fy, y)) => fx.cmp(fy).then_with(|| x.cmp(y)),
        // A single field always projects to one variant.
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable sort of holdings by one field.
///
/// Numbers compare numerically, dates by instant, text case-insensitively
/// (ordinal tie-break). Ties keep their input order in both directions.
/// Fails with `UnsortableField` if the field does not exist on some record.
pub fn sort_records(
    records: &[HoldingRecord],
    field: SortField,
    direction: SortDirection,
) -> Result<Vec<&HoldingRecord>, CoreError> {
    sort_refs(records.iter().collect(), field, direction)
}

/// [`sort_records`] over an already borrowed (e.g. filtered) selection.
pub fn sort_refs(
    records: Vec<&HoldingRecord>,
    field: SortField,
    direction: SortDirection,
) -> Result<Vec<&HoldingRecord>, CoreError> {
    let mut keyed = records
        .into_iter()
        .map(|r| sort_value(r, field).map(|v| (v, r)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|(a, _), (b, _)| compare(a, b, direction));
    Ok(keyed.into_iter().map(|(_, r)| r).collect())
}

// ── Trends ──────────────────────────────────────────────────────────

/// Bucket dated amounts into periods with running totals.
///
/// Input must be in non-decreasing date order; an out-of-order event fails
/// with `ChronologyViolation` instead of being silently reordered.
/// Periods between the first and last event that have no events get a
/// zero-total bucket, so the series is contiguous.
pub fn bucket_by_time_period(
    events: &[AccrualEvent],
    granularity: Granularity,
) -> Result<Vec<TrendPoint>, CoreError> {
    if let Some(pair) = events.windows(2).find(|w| w[1].date < w[0].date) {
        return Err(CoreError::ChronologyViolation {
            previous: pair[0].date,
            next: pair[1].date,
        });
    }

    let mut points: Vec<TrendPoint> = Vec::new();
    for event in events {
        let start = granularity.period_start(event.date);
        if let Some(last) = points.last_mut() {
            if last.period_start == start {
                last.period_total += event.amount;
                continue;
            }
            let mut gap = granularity.next_period_start(last.period_start);
            while gap < start {
                points.push(empty_period(granularity, gap));
                gap = granularity.next_period_start(gap);
            }
        }
        points.push(TrendPoint {
            period_total: event.amount,
            ..empty_period(granularity, start)
        });
    }

    let mut running = 0.0;
    for point in &mut points {
        running += point.period_total;
        point.cumulative_total = running;
    }
    Ok(points)
}

fn empty_period(granularity: Granularity, start: NaiveDate) -> TrendPoint {
    TrendPoint {
        period_start: start,
        label: granularity.label(start),
        period_total: 0.0,
        cumulative_total: 0.0,
    }
}

// ── Dates ───────────────────────────────────────────────────────────

/// Whole days from `reference` until midnight UTC of `target`, rounded up.
/// Zero or negative means the date has arrived or passed.
pub fn days_until(target: NaiveDate, reference: DateTime<Utc>) -> i64 {
    let target_instant = target.and_time(NaiveTime::MIN).and_utc();
    let millis = (target_instant - reference).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) != 0 {
        days + 1
    } else {
        days
    }
}

/// Three-tier urgency: `<= 30` days high, `<= 90` medium, otherwise normal.
pub fn classify_urgency(days_remaining: i64) -> UrgencyTier {
    if days_remaining <= IMMINENT_HIGH_DAYS {
        UrgencyTier::ImminentHigh
    } else if days_remaining <= IMMINENT_MEDIUM_DAYS {
        UrgencyTier::ImminentMedium
    } else {
        UrgencyTier::Normal
    }
}
