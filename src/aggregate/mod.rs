use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::Transaction;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive the `YYYYMM` bucket key from a stored `created_at` value.
/// A value that does not match the store's timestamp format aborts the
/// whole aggregation; records are never silently dropped.
pub(crate) fn month_key(created_at: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(created_at, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed created_at timestamp: {created_at:?}"))?;
    Ok(parsed.format("%Y%m").to_string())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct MonthTotals {
    pub(crate) income: Decimal,
    pub(crate) expense_clean: Decimal,
    pub(crate) expense_outlier: Decimal,
}

/// One pass over the store, bucketed by calendar month. Rebuilt from scratch
/// on every run; nothing here outlives the process.
///
/// `BTreeMap` keys iterate in ascending lexicographic order, which for
/// `YYYYMM` keys is chronological order — exactly the presentation order the
/// reports need.
#[derive(Debug, Default)]
pub(crate) struct MonthlyAggregate {
    /// Member records per month, preserving query order.
    pub(crate) members: BTreeMap<String, Vec<Transaction>>,
    pub(crate) totals: BTreeMap<String, MonthTotals>,
    /// Non-outlier expense sums per category, in first-seen order per month.
    pub(crate) category_subtotals: BTreeMap<String, Vec<(String, Decimal)>>,
}

impl MonthlyAggregate {
    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn months(&self) -> impl Iterator<Item = &String> {
        self.members.keys()
    }
}

/// Single linear pass over the records, in input order.
pub(crate) fn aggregate(records: &[Transaction]) -> Result<MonthlyAggregate> {
    let mut agg = MonthlyAggregate::default();

    for txn in records {
        let key = month_key(&txn.created_at)
            .with_context(|| format!("transaction id {}", txn.id))?;

        agg.members.entry(key.clone()).or_default().push(txn.clone());
        let totals = agg.totals.entry(key.clone()).or_default();

        if txn.is_outlier_expense() {
            totals.expense_outlier += txn.amount;
        } else if txn.is_clean_expense() {
            totals.expense_clean += txn.amount;
            let subtotals = agg.category_subtotals.entry(key).or_default();
            match subtotals.iter_mut().find(|(c, _)| *c == txn.category) {
                Some((_, sum)) => *sum += txn.amount,
                None => subtotals.push((txn.category.clone(), txn.amount)),
            }
        } else {
            totals.income += txn.amount;
        }
    }

    Ok(agg)
}

// ── Day-aligned series ────────────────────────────────────────

/// Per-category per-day expense series for the month comparison chart.
/// `current` and `prior` are indexed `[category][day - 1]` over a shared
/// `1..=days` axis, zero-filled for days with no expense rows.
#[derive(Debug)]
pub(crate) struct DaySeries {
    /// Categories ordered descending by combined total across both periods;
    /// ties keep first-seen input order.
    pub(crate) categories: Vec<String>,
    pub(crate) current: Vec<Vec<Decimal>>,
    pub(crate) prior: Vec<Vec<Decimal>>,
    pub(crate) days: u32,
}

impl DaySeries {
    pub(crate) fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

pub(crate) fn build_day_series(
    current_rows: &[(u32, String, Decimal)],
    prior_rows: &[(u32, String, Decimal)],
    days: u32,
) -> DaySeries {
    // Combined totals in first-seen order; a stable descending sort then
    // keeps that order for ties.
    let mut combined: Vec<(String, Decimal)> = Vec::new();
    for (_, category, total) in current_rows.iter().chain(prior_rows) {
        match combined.iter_mut().find(|(c, _)| c == category) {
            Some((_, sum)) => *sum += *total,
            None => combined.push((category.clone(), *total)),
        }
    }
    combined.sort_by(|a, b| b.1.cmp(&a.1));

    let categories: Vec<String> = combined.into_iter().map(|(c, _)| c).collect();
    let current = dense_series(current_rows, &categories, days);
    let prior = dense_series(prior_rows, &categories, days);

    DaySeries {
        categories,
        current,
        prior,
        days,
    }
}

fn dense_series(
    rows: &[(u32, String, Decimal)],
    categories: &[String],
    days: u32,
) -> Vec<Vec<Decimal>> {
    let mut series = vec![vec![Decimal::ZERO; days as usize]; categories.len()];
    for (day, category, total) in rows {
        if *day == 0 || *day > days {
            continue;
        }
        if let Some(idx) = categories.iter().position(|c| c == category) {
            series[idx][(*day - 1) as usize] = *total;
        }
    }
    series
}

// ── Trailing-window helpers ───────────────────────────────────

/// Dense daily totals over the given date labels, zero-filled for days
/// with no expense rows.
pub(crate) fn fill_daily_totals(rows: &[(String, Decimal)], dates: &[String]) -> Vec<Decimal> {
    dates
        .iter()
        .map(|date| {
            rows.iter()
                .find(|(d, _)| d == date)
                .map(|(_, total)| *total)
                .unwrap_or(Decimal::ZERO)
        })
        .collect()
}

/// Grand total plus each entry's percentage of it. A zero grand total
/// yields all-zero percentages rather than a division error.
pub(crate) fn percentage_of_total(totals: &[Decimal]) -> (Decimal, Vec<Decimal>) {
    let grand: Decimal = totals.iter().copied().sum();
    let percentages = totals
        .iter()
        .map(|t| {
            if grand.is_zero() {
                Decimal::ZERO
            } else {
                t / grand * Decimal::ONE_HUNDRED
            }
        })
        .collect();
    (grand, percentages)
}

#[cfg(test)]
mod tests;
