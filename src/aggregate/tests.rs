#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::{Transaction, TxnKind};
use rust_decimal_macros::dec;

fn txn(id: i64, kind: TxnKind, category: &str, amount: Decimal, created_at: &str, outlier: bool) -> Transaction {
    Transaction {
        id,
        kind,
        category: category.into(),
        quantity: None,
        amount,
        description: String::new(),
        created_at: created_at.into(),
        is_outlier: outlier,
    }
}

// ── month_key ─────────────────────────────────────────────────

#[test]
fn test_month_key() {
    assert_eq!(month_key("2024-01-05 10:00:00").unwrap(), "202401");
    assert_eq!(month_key("2023-12-31 23:59:59").unwrap(), "202312");
}

#[test]
fn test_month_key_malformed() {
    assert!(month_key("2024/01/05 10:00:00").is_err());
    assert!(month_key("2024-01-05").is_err());
    assert!(month_key("").is_err());
}

// ── aggregate ─────────────────────────────────────────────────

#[test]
fn test_worked_scenario() {
    let records = vec![
        txn(1, TxnKind::Income, "salary", dec!(5000), "2024-01-05 10:00:00", false),
        txn(2, TxnKind::Expense, "food", dec!(1200), "2024-01-10 12:00:00", false),
        txn(3, TxnKind::Expense, "food", dec!(50000), "2024-01-15 09:00:00", true),
    ];

    let agg = aggregate(&records).unwrap();
    let totals = &agg.totals["202401"];
    assert_eq!(totals.income, dec!(5000));
    assert_eq!(totals.expense_clean, dec!(1200));
    assert_eq!(totals.expense_outlier, dec!(50000));
    assert_eq!(agg.category_subtotals["202401"], vec![("food".into(), dec!(1200))]);
}

#[test]
fn test_income_sums_match_per_month_totals() {
    let records = vec![
        txn(1, TxnKind::Income, "salary", dec!(5000), "2024-01-05 10:00:00", false),
        txn(2, TxnKind::Income, "bonus", dec!(250), "2024-02-01 10:00:00", false),
        txn(3, TxnKind::Expense, "food", dec!(100), "2024-01-10 12:00:00", false),
        txn(4, TxnKind::Income, "salary", dec!(5000), "2024-02-05 10:00:00", false),
    ];

    let agg = aggregate(&records).unwrap();
    let bucketed: Decimal = agg.totals.values().map(|t| t.income).sum();
    let direct: Decimal = records.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    assert_eq!(bucketed, direct);
}

#[test]
fn test_clean_plus_outlier_equals_expense_sum() {
    let records = vec![
        txn(1, TxnKind::Expense, "food", dec!(100), "2024-01-10 12:00:00", false),
        txn(2, TxnKind::Expense, "food", dec!(900), "2024-01-11 12:00:00", true),
        txn(3, TxnKind::Expense, "rent", dec!(1500), "2024-01-12 12:00:00", false),
    ];

    let agg = aggregate(&records).unwrap();
    let totals = &agg.totals["202401"];
    let all_expenses: Decimal = records.iter().map(|t| t.amount).sum();
    assert_eq!(totals.expense_clean + totals.expense_outlier, all_expenses);
}

#[test]
fn test_category_subtotals_sum_to_clean_total() {
    let records = vec![
        txn(1, TxnKind::Expense, "food", dec!(100), "2024-01-10 12:00:00", false),
        txn(2, TxnKind::Expense, "rent", dec!(1500), "2024-01-12 12:00:00", false),
        txn(3, TxnKind::Expense, "food", dec!(55.50), "2024-01-20 12:00:00", false),
        txn(4, TxnKind::Expense, "travel", dec!(9999), "2024-01-25 12:00:00", true),
    ];

    let agg = aggregate(&records).unwrap();
    let totals = &agg.totals["202401"];
    let subtotal_sum: Decimal = agg.category_subtotals["202401"].iter().map(|(_, s)| *s).sum();
    assert_eq!(subtotal_sum, totals.expense_clean);
    // Outlier category never appears in the breakdown.
    assert!(!agg.category_subtotals["202401"].iter().any(|(c, _)| c == "travel"));
}

#[test]
fn test_member_lists_preserve_input_order() {
    let records = vec![
        txn(7, TxnKind::Expense, "food", dec!(1), "2024-01-10 12:00:00", false),
        txn(3, TxnKind::Income, "salary", dec!(2), "2024-01-05 10:00:00", false),
        txn(9, TxnKind::Expense, "rent", dec!(3), "2024-01-01 08:00:00", false),
    ];

    let agg = aggregate(&records).unwrap();
    let ids: Vec<i64> = agg.members["202401"].iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![7, 3, 9]);
}

#[test]
fn test_months_iterate_ascending_regardless_of_input_order() {
    let records = vec![
        txn(1, TxnKind::Expense, "food", dec!(1), "2024-02-10 12:00:00", false),
        txn(2, TxnKind::Expense, "food", dec!(1), "2024-01-10 12:00:00", false),
        txn(3, TxnKind::Expense, "food", dec!(1), "2023-12-10 12:00:00", false),
    ];

    let agg = aggregate(&records).unwrap();
    let months: Vec<&String> = agg.months().collect();
    assert_eq!(months, vec!["202312", "202401", "202402"]);
}

#[test]
fn test_aggregate_is_idempotent() {
    let records = vec![
        txn(1, TxnKind::Income, "salary", dec!(5000), "2024-01-05 10:00:00", false),
        txn(2, TxnKind::Expense, "food", dec!(1200), "2024-01-10 12:00:00", false),
        txn(3, TxnKind::Expense, "rent", dec!(900), "2024-02-01 12:00:00", false),
    ];

    let first = aggregate(&records).unwrap();
    let second = aggregate(&records).unwrap();
    assert_eq!(first.totals, second.totals);
    assert_eq!(first.category_subtotals, second.category_subtotals);
    let first_ids: Vec<Vec<i64>> = first.members.values().map(|v| v.iter().map(|t| t.id).collect()).collect();
    let second_ids: Vec<Vec<i64>> = second.members.values().map(|v| v.iter().map(|t| t.id).collect()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn test_empty_input_empty_output() {
    let agg = aggregate(&[]).unwrap();
    assert!(agg.is_empty());
    assert!(agg.totals.is_empty());
    assert!(agg.category_subtotals.is_empty());
}

#[test]
fn test_malformed_timestamp_aborts() {
    let records = vec![
        txn(1, TxnKind::Income, "salary", dec!(5000), "2024-01-05 10:00:00", false),
        txn(2, TxnKind::Expense, "food", dec!(10), "not-a-timestamp", false),
    ];

    let err = aggregate(&records).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("transaction id 2"));
    assert!(msg.contains("malformed created_at"));
}

#[test]
fn test_outlier_flag_on_income_is_ignored() {
    let records = vec![txn(1, TxnKind::Income, "salary", dec!(100), "2024-01-05 10:00:00", true)];

    let agg = aggregate(&records).unwrap();
    let totals = &agg.totals["202401"];
    assert_eq!(totals.income, dec!(100));
    assert_eq!(totals.expense_outlier, Decimal::ZERO);
}

// ── build_day_series ──────────────────────────────────────────

#[test]
fn test_day_series_ordering_by_combined_total() {
    let current = vec![
        (1, "food".to_string(), dec!(10)),
        (2, "transport".to_string(), dec!(50)),
    ];
    let prior = vec![(1, "food".to_string(), dec!(100))];

    let series = build_day_series(&current, &prior, 3);
    // food: 110 combined, transport: 50.
    assert_eq!(series.categories, vec!["food", "transport"]);
    assert_eq!(series.current[0], vec![dec!(10), Decimal::ZERO, Decimal::ZERO]);
    assert_eq!(series.current[1], vec![Decimal::ZERO, dec!(50), Decimal::ZERO]);
    assert_eq!(series.prior[0], vec![dec!(100), Decimal::ZERO, Decimal::ZERO]);
}

#[test]
fn test_day_series_tie_keeps_first_seen_order() {
    let current = vec![
        (1, "b".to_string(), dec!(10)),
        (1, "a".to_string(), dec!(10)),
    ];
    let series = build_day_series(&current, &[], 2);
    assert_eq!(series.categories, vec!["b", "a"]);
}

#[test]
fn test_day_series_ignores_days_outside_axis() {
    let current = vec![
        (5, "food".to_string(), dec!(10)),
        (2, "food".to_string(), dec!(7)),
    ];
    let series = build_day_series(&current, &[], 3);
    assert_eq!(series.current[0], vec![Decimal::ZERO, dec!(7), Decimal::ZERO]);
}

#[test]
fn test_day_series_empty() {
    let series = build_day_series(&[], &[], 5);
    assert!(series.is_empty());
}

// ── fill_daily_totals / percentage_of_total ───────────────────

#[test]
fn test_fill_daily_totals_zero_fills_gaps() {
    let rows = vec![
        ("2024-03-02".to_string(), dec!(15)),
        ("2024-03-04".to_string(), dec!(7)),
    ];
    let dates: Vec<String> = vec![
        "2024-03-01".into(),
        "2024-03-02".into(),
        "2024-03-03".into(),
        "2024-03-04".into(),
    ];

    let filled = fill_daily_totals(&rows, &dates);
    assert_eq!(filled, vec![Decimal::ZERO, dec!(15), Decimal::ZERO, dec!(7)]);
}

#[test]
fn test_percentage_of_total() {
    let (grand, pcts) = percentage_of_total(&[dec!(75), dec!(25)]);
    assert_eq!(grand, dec!(100));
    assert_eq!(pcts, vec![dec!(75), dec!(25)]);
}

#[test]
fn test_percentage_of_total_zero_grand() {
    let (grand, pcts) = percentage_of_total(&[Decimal::ZERO, Decimal::ZERO]);
    assert_eq!(grand, Decimal::ZERO);
    assert_eq!(pcts, vec![Decimal::ZERO, Decimal::ZERO]);
}
