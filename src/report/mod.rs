mod breakdown;
mod compare;
mod csv_export;
mod excel;
mod weekly;
mod window;

pub(crate) use breakdown::{render_breakdown, BREAKDOWN_REPORT_FILE};
pub(crate) use compare::{render_compare, COMPARE_REPORT_FILE};
pub(crate) use csv_export::{render_csv_export, EXPORT_FILE};
pub(crate) use excel::{render_monthly_workbook, MONTHLY_REPORT_FILE};
pub(crate) use weekly::{render_weekly_line, WEEKLY_REPORT_FILE};
pub(crate) use window::{last_seven_days, month_compare, trailing_week};

use plotters::style::RGBColor;
use std::path::PathBuf;

/// What a report assembler produced. Assemblers never exit the process on
/// an empty window; the caller decides what "nothing to report" means.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RenderOutcome {
    Rendered(PathBuf),
    NoData,
}

/// Shared pastel palette for the chart variants; wedges and stacks cycle
/// through it when a window has more categories than colors.
pub(crate) const PASTEL_PALETTE: [RGBColor; 8] = [
    RGBColor(0xFF, 0xB3, 0xBA),
    RGBColor(0xFF, 0xDF, 0xBA),
    RGBColor(0xFF, 0xFF, 0xBA),
    RGBColor(0xBA, 0xFF, 0xC9),
    RGBColor(0xBA, 0xE1, 0xFF),
    RGBColor(0xD7, 0xBA, 0xFF),
    RGBColor(0xFF, 0xC6, 0xE5),
    RGBColor(0xC6, 0xFF, 0xF3),
];

pub(crate) fn palette_color(index: usize) -> RGBColor {
    PASTEL_PALETTE[index % PASTEL_PALETTE.len()]
}

/// Plotters error types are backend-generic; fold them into one
/// run-level error instead of threading the generics through.
pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> anyhow::Error {
    anyhow::anyhow!("chart rendering failed: {err}")
}

/// Round to a whole amount and group with thousand separators.
/// e.g. `51234.56` → `"51,235"`
pub(crate) fn format_grouped(value: rust_decimal::Decimal) -> String {
    let rounded = value.round();
    let digits = rounded.abs().to_string();
    let with_commas: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{with_commas}")
    } else {
        with_commas
    }
}
