use chrono::{DateTime, Datelike, Utc};

use crate::models::holding::{DepositDetails, DepositStatus, HoldingRecord};
use crate::models::summary::{DepositSummary, UpcomingMaturity};

use super::derivation::{classify_urgency, days_until, IMMINENT_MEDIUM_DAYS};

fn deposits(records: &[HoldingRecord]) -> impl Iterator<Item = (&HoldingRecord, &DepositDetails)> {
    records.iter().filter_map(|r| r.as_deposit().map(|d| (r, d)))
}

/// Active deposits ordered by maturity date (soonest first), at most `limit` of them.
pub fn upcoming_maturities(
    records: &[HoldingRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<UpcomingMaturity> {
    let mut active: Vec<(&HoldingRecord, &DepositDetails)> = deposits(records)
        .filter(|(_, d)| d.status == DepositStatus::Active)
        .collect();
    active.sort_by_key(|(_, d)| d.maturity_date);

    active
        .into_iter()
        .take(limit)
        .map(|(record, d)| {
            let days_remaining = days_until(d.maturity_date, now);
            UpcomingMaturity {
                holding_id: record.id.clone(),
                bank_name: d.bank_name.clone(),
                maturity_date: d.maturity_date,
                maturity_amount: d.maturity_amount,
                days_remaining,
                urgency: classify_urgency(days_remaining),
                matured: days_remaining <= 0,
            }
        })
        .collect()
}

/// Headline numbers over every deposit in `records` (other classes are ignored).
pub fn summarize_deposits(records: &[HoldingRecord], now: DateTime<Utc>) -> DepositSummary {
    let today = now.date_naive();
    let mut summary = DepositSummary {
        total_invested: 0.0,
        total_maturity_value: 0.0,
        total_interest_earned: 0.0,
        total_interest_accrued: 0.0,
        active_deposits: 0,
        matured_deposits: 0,
        average_interest_rate: None,
        upcoming_maturities: 0,
        this_month_maturities: 0,
    };
    let mut rate_sum = 0.0;
    let mut count = 0usize;

    for (record, d) in deposits(records) {
        summary.total_invested += record.invested();
        summary.total_maturity_value += d.maturity_amount;
        summary.total_interest_earned += d.interest_earned;
        summary.total_interest_accrued += d.interest_accrued;
        rate_sum += d.interest_rate_percent;
        count += 1;

        match d.status {
            DepositStatus::Active => {
                summary.active_deposits += 1;
                if days_until(d.maturity_date, now) <= IMMINENT_MEDIUM_DAYS {
                    summary.upcoming_maturities += 1;
                }
                if d.maturity_date.year() == today.year() && d.maturity_date.month() == today.month() {
                    summary.this_month_maturities += 1;
                }
            }
            DepositStatus::Matured => summary.matured_deposits += 1,
            DepositStatus::PrematureClosed => {}
        }
    }

    if count > 0 {
        summary.average_interest_rate = Some(rate_sum / count as f64);
    }
    summary
}
