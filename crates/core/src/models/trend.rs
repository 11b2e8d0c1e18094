use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A dated amount feeding a trend chart (e.g. one interest credit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

impl AccrualEvent {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Width of one trend bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        let (year, month, day) = match self {
            Granularity::Daily => (date.year(), date.month(), date.day()),
            Granularity::Monthly => (date.year(), date.month(), 1),
            Granularity::Quarterly => (date.year(), (date.month0() / 3) * 3 + 1, 1),
            Granularity::Yearly => (date.year(), 1, 1),
        };
        // Day 1 of a valid month always exists.
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
    }

    /// Start of the period after the one starting at `start`.
    pub fn next_period_start(&self, start: NaiveDate) -> NaiveDate {
        let next = match self {
            Granularity::Daily => start.succ_opt(),
            Granularity::Monthly => start.checked_add_months(Months::new(1)),
            Granularity::Quarterly => start.checked_add_months(Months::new(3)),
            Granularity::Yearly => start.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }

    /// Chart label for the period starting at `start`.
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Daily => start.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => start.format("%b %Y").to_string(),
            Granularity::Quarterly => format!("Q{} {}", start.month0() / 3 + 1, start.year()),
            Granularity::Yearly => start.year().to_string(),
        }
    }
}

/// One bucket of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period_start: NaiveDate,
    pub label: String,
    pub period_total: f64,
    /// Running sum of `period_total` up to and including this bucket
    pub cumulative_total: f64,
}

/// Time filter on a trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendWindow {
    SixMonths,
    OneYear,
    All,
}

impl TrendWindow {
    /// Trailing slice of a monthly series covered by this window.
    /// Series from `bucket_by_time_period` have no gaps, so N points are N months.
    pub fn apply<'a>(&self, points: &'a [TrendPoint]) -> &'a [TrendPoint] {
        let keep = match self {
            TrendWindow::SixMonths => 6,
            TrendWindow::OneYear => 12,
            TrendWindow::All => return points,
        };
        &points[points.len().saturating_sub(keep)..]
    }
}
