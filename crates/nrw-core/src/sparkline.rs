//! Fixed-length trailing sparkline per zone

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::types::{Snapshot, SparklinePoint};

/// Number of points in every sparkline
pub const SPARKLINE_LEN: usize = 6;

pub type Sparkline = [SparklinePoint; SPARKLINE_LEN];

/// Build a zone's sparkline from its history (newest first)
///
/// Uses the most recent [`SPARKLINE_LEN`] snapshots in chronological order.
/// Short histories are left-padded with zero points flagged
/// `has_data = false`; padding months count back from `now`, so pad `i`
/// sits at `now - (SPARKLINE_LEN - 1 - i)` months regardless of when the
/// real history starts.
pub fn build_sparkline(history: &[&Snapshot], now: NaiveDate) -> Sparkline {
    let real: Vec<&Snapshot> = history.iter().take(SPARKLINE_LEN).rev().copied().collect();
    let pad = SPARKLINE_LEN - real.len();

    std::array::from_fn(|i| {
        if i < pad {
            padding_point(now, (SPARKLINE_LEN - 1 - i) as u32)
        } else {
            reading_point(real[i - pad])
        }
    })
}

fn reading_point(snapshot: &Snapshot) -> SparklinePoint {
    let month_start = month_start(snapshot.as_of);
    SparklinePoint {
        month_label: month_label(month_start),
        month_start,
        nrw_pct: snapshot.nrw_pct,
        has_data: true,
    }
}

fn padding_point(now: NaiveDate, months_back: u32) -> SparklinePoint {
    let month_start = month_start(now)
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(NaiveDate::MIN);
    SparklinePoint {
        month_label: month_label(month_start),
        month_start,
        nrw_pct: 0.0,
        has_data: false,
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.day0())))
        .unwrap_or(date)
}

/// Short month name, e.g. "Mar"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}
