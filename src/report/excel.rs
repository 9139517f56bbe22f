use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{
    Chart, ChartType, Color, ConditionalFormat3ColorScale, Format, FormatBorder, Workbook,
    Worksheet,
};
use std::path::Path;

use super::RenderOutcome;
use crate::aggregate::MonthlyAggregate;
use crate::db::SchemaVariant;
use crate::models::Transaction;

pub(crate) const MONTHLY_REPORT_FILE: &str = "transactions_report.xlsx";

const SCALE_LOW: Color = Color::RGB(0x63BE7B);
const SCALE_MID: Color = Color::RGB(0xFFEB84);
const SCALE_HIGH: Color = Color::RGB(0xF8696B);
const HEADER_FILL: Color = Color::RGB(0xADD8E6);

/// One summary sheet plus one detail sheet per month, with the pie and
/// line charts embedded. Overwrites any existing file at `path`.
pub(crate) fn render_monthly_workbook(
    agg: &MonthlyAggregate,
    variant: SchemaVariant,
    today: NaiveDate,
    path: &Path,
) -> Result<RenderOutcome> {
    if agg.is_empty() {
        return Ok(RenderOutcome::NoData);
    }

    let mut workbook = Workbook::new();
    let bordered = Format::new().set_border(FormatBorder::Thin);
    let header = Format::new()
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);

    write_summary_sheet(&mut workbook, agg, variant, today, &bordered)?;
    for (month, records) in &agg.members {
        let subtotals = agg
            .category_subtotals
            .get(month)
            .map(|s| s.as_slice())
            .unwrap_or(&[]);
        write_month_sheet(&mut workbook, month, records, subtotals, variant, &header, &bordered)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))?;
    Ok(RenderOutcome::Rendered(path.to_path_buf()))
}

fn summary_headers(variant: SchemaVariant) -> Vec<&'static str> {
    if variant.has_outlier {
        vec!["Month", "Income", "Expense (Clean)", "Expense (Outlier)"]
    } else {
        vec!["Month", "Income", "Expense"]
    }
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    agg: &MonthlyAggregate,
    variant: SchemaVariant,
    today: NaiveDate,
    bordered: &Format,
) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Summary")?;

    let headers = summary_headers(variant);
    let last_col = (headers.len() - 1) as u16;
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for (col, title) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, bordered)?;
    }

    for (row, (month, totals)) in agg.totals.iter().enumerate() {
        let row = (row + 1) as u32;
        let mut cells: Vec<Decimal> = vec![totals.income, totals.expense_clean];
        if variant.has_outlier {
            cells.push(totals.expense_outlier);
        }

        worksheet.write_string_with_format(row, 0, month, bordered)?;
        note_width(&mut widths, 0, month);
        for (i, value) in cells.iter().enumerate() {
            let col = (i + 1) as u16;
            worksheet.write_number_with_format(row, col, decimal_cell(*value), bordered)?;
            note_width(&mut widths, col as usize, &value.to_string());
        }
    }

    let last_row = agg.totals.len() as u32;
    worksheet.autofilter(0, 0, last_row, last_col)?;
    apply_widths(worksheet, &widths)?;

    // The color-scale domain stops at the current month; later rows are
    // rendered but excluded. Each value column gets its own scale.
    let current_key = today.format("%Y%m").to_string();
    let eligible = agg.months().filter(|m| m.as_str() <= current_key.as_str()).count() as u32;
    if eligible > 0 {
        for col in 1..=last_col {
            let scale = ConditionalFormat3ColorScale::new()
                .set_minimum_color(SCALE_LOW)
                .set_midpoint_color(SCALE_MID)
                .set_maximum_color(SCALE_HIGH);
            worksheet.add_conditional_format(1, col, eligible, col, &scale)?;
        }
    }

    let mut chart = Chart::new(ChartType::Line);
    chart.title().set_name("Income vs Expense");
    chart.x_axis().set_name("Month");
    chart.y_axis().set_name("Amount");
    chart
        .add_series()
        .set_name("Income")
        .set_categories(("Summary", 1, 0, last_row, 0))
        .set_values(("Summary", 1, 1, last_row, 1));
    chart
        .add_series()
        .set_name(if variant.has_outlier { "Expense (Clean)" } else { "Expense" })
        .set_categories(("Summary", 1, 0, last_row, 0))
        .set_values(("Summary", 1, 2, last_row, 2));
    worksheet.insert_chart(1, last_col + 2, &chart)?;

    Ok(())
}

fn write_month_sheet(
    workbook: &mut Workbook,
    month: &str,
    records: &[Transaction],
    subtotals: &[(String, Decimal)],
    variant: SchemaVariant,
    header: &Format,
    bordered: &Format,
) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(month)?;

    let headers = variant.headers();
    let last_col = (headers.len() - 1) as u16;
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for (col, title) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, header)?;
    }

    for (i, txn) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        let mut col: u16 = 0;

        worksheet.write_number_with_format(row, col, txn.id as f64, bordered)?;
        note_width(&mut widths, col as usize, &txn.id.to_string());
        col += 1;

        worksheet.write_string_with_format(row, col, txn.kind.as_str(), bordered)?;
        note_width(&mut widths, col as usize, txn.kind.as_str());
        col += 1;

        worksheet.write_string_with_format(row, col, &txn.category, bordered)?;
        note_width(&mut widths, col as usize, &txn.category);
        col += 1;

        if variant.has_quantity {
            match txn.quantity {
                Some(q) => {
                    worksheet.write_number_with_format(row, col, decimal_cell(q), bordered)?;
                    note_width(&mut widths, col as usize, &q.to_string());
                }
                None => {
                    worksheet.write_string_with_format(row, col, "", bordered)?;
                }
            }
            col += 1;
        }

        worksheet.write_number_with_format(row, col, decimal_cell(txn.amount), bordered)?;
        note_width(&mut widths, col as usize, &txn.amount.to_string());
        col += 1;

        worksheet.write_string_with_format(row, col, &txn.description, bordered)?;
        note_width(&mut widths, col as usize, &txn.description);
        col += 1;

        worksheet.write_string_with_format(row, col, &txn.created_at, bordered)?;
        note_width(&mut widths, col as usize, &txn.created_at);

        if variant.has_outlier {
            col += 1;
            let flag = if txn.is_outlier { 1.0 } else { 0.0 };
            worksheet.write_number_with_format(row, col, flag, bordered)?;
        }
    }

    worksheet.autofilter(0, 0, records.len() as u32, last_col)?;
    apply_widths(worksheet, &widths)?;

    // Category side table plus pie chart, skipped when the month has no
    // non-outlier expense records.
    if !subtotals.is_empty() {
        let start_col = (headers.len() + 2) as u16;
        let bold = Format::new().set_bold();

        worksheet.write_string_with_format(1, start_col, "Category", &bold)?;
        worksheet.write_string_with_format(1, start_col + 1, "Amount", &bold)?;
        for (i, (category, sum)) in subtotals.iter().enumerate() {
            let row = (i + 2) as u32;
            worksheet.write_string(row, start_col, category)?;
            worksheet.write_number(row, start_col + 1, decimal_cell(*sum))?;
        }

        let last_data_row = (subtotals.len() + 1) as u32;
        let mut pie = Chart::new(ChartType::Pie);
        pie.title().set_name("Expense Breakdown");
        pie.add_series()
            .set_name("Amount")
            .set_categories((month, 2, start_col, last_data_row, start_col))
            .set_values((month, 2, start_col + 1, last_data_row, start_col + 1));
        worksheet.insert_chart(1, start_col + 3, &pie)?;
    }

    Ok(())
}

fn decimal_cell(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn note_width(widths: &mut [usize], col: usize, value: &str) {
    if let Some(width) = widths.get_mut(col) {
        *width = (*width).max(value.chars().count());
    }
}

/// Column width = longest literal value in the column plus padding, so
/// nothing renders truncated.
fn apply_widths(worksheet: &mut Worksheet, widths: &[usize]) -> Result<()> {
    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (*width + 2) as f64)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "excel_tests.rs"]
mod tests;
