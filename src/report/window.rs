use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::aggregate::TIMESTAMP_FORMAT;

/// An inclusive `created_at` range, formatted for the store's query
/// parameters on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateWindow {
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
}

impl DateWindow {
    pub(crate) fn start_param(&self) -> String {
        self.start.format(TIMESTAMP_FORMAT).to_string()
    }

    pub(crate) fn end_param(&self) -> String {
        self.end.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Day-aligned windows for "this month so far" versus the prior month.
/// Returns `(current, prior, compare_days)` where `compare_days` is the
/// shorter of this month's elapsed days and the prior month's length.
pub(crate) fn month_compare(today: NaiveDate) -> (DateWindow, DateWindow, u32) {
    let (prior_year, prior_month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };

    let compare_days = today.day().min(days_in_month(prior_year, prior_month));

    let current = month_range(today.year(), today.month(), today.day());
    let prior = month_range(prior_year, prior_month, compare_days);
    (current, prior, compare_days)
}

fn month_range(year: i32, month: u32, days: u32) -> DateWindow {
    let start = date_or_epoch(year, month, 1).and_hms_opt(0, 0, 0);
    let end = date_or_epoch(year, month, days).and_hms_opt(23, 59, 59);
    DateWindow {
        start: start.unwrap_or_default(),
        end: end.unwrap_or_default(),
    }
}

fn date_or_epoch(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    date_or_epoch(next_year, next_month, 1)
        .pred_opt()
        .map(|d| d.day())
        .unwrap_or(30)
}

/// The half-open `now - 7 days ≤ created_at < now` window for the
/// category breakdown.
pub(crate) fn trailing_week(now: NaiveDateTime) -> DateWindow {
    DateWindow {
        start: now - Duration::days(7),
        end: now,
    }
}

/// `YYYY-MM-DD` labels for the 7 calendar days ending on `today`.
pub(crate) fn last_seven_days(today: NaiveDate) -> Vec<String> {
    (0..7)
        .rev()
        .map(|back| (today - Duration::days(back)).format("%Y-%m-%d").to_string())
        .collect()
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
