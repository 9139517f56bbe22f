use anyhow::Result;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

use super::{format_grouped, palette_color, render_err, RenderOutcome};
use crate::aggregate::percentage_of_total;

pub(crate) const BREAKDOWN_REPORT_FILE: &str = "expense_last_7_days.png";

// 10x5 inches at 200 DPI.
const WIDTH: u32 = 2000;
const HEIGHT: u32 = 1000;

const PIE_CENTER: (i32, i32) = (500, 540);
const PIE_RADIUS: f64 = 330.0;
const HOLE_RADIUS: i32 = 190;

/// Donut of per-category totals on the left, the literal category table on
/// the right, every table row keyed to its wedge color.
pub(crate) fn render_breakdown(
    categories: &[(String, Decimal)],
    path: &Path,
) -> Result<RenderOutcome> {
    if categories.is_empty() {
        return Ok(RenderOutcome::NoData);
    }

    let totals: Vec<Decimal> = categories.iter().map(|(_, t)| *t).collect();
    let (grand_total, percentages) = percentage_of_total(&totals);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (pie_area, table_area) = root.split_horizontally(WIDTH / 2);

    draw_donut(&pie_area, &totals, grand_total)?;
    draw_table(&table_area, categories, &percentages)?;

    root.present().map_err(render_err)?;
    Ok(RenderOutcome::Rendered(path.to_path_buf()))
}

fn draw_donut<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    totals: &[Decimal],
    grand_total: Decimal,
) -> Result<()> {
    let centered = |size: u32, color: &RGBColor| {
        ("sans-serif", size)
            .into_font()
            .color(color)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };

    area.draw(&Text::new(
        "Expenses in the Last 7 Days",
        (500, 80),
        centered(36, &BLACK),
    ))
    .map_err(render_err)?;

    let sizes: Vec<f64> = totals.iter().map(|t| t.to_f64().unwrap_or(0.0)).collect();
    let colors: Vec<RGBColor> = (0..totals.len()).map(palette_color).collect();
    let labels: Vec<String> = vec![String::new(); totals.len()];

    let mut pie = Pie::new(&PIE_CENTER, &PIE_RADIUS, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    area.draw(&pie).map_err(render_err)?;

    // Hollow out the middle and put the grand total there.
    area.draw(&Circle::new(PIE_CENTER, HOLE_RADIUS, WHITE.filled()))
        .map_err(render_err)?;
    area.draw(&Text::new(
        format_grouped(grand_total),
        (PIE_CENTER.0, PIE_CENTER.1 - 20),
        centered(54, &BLACK),
    ))
    .map_err(render_err)?;
    area.draw(&Text::new(
        "Total",
        (PIE_CENTER.0, PIE_CENTER.1 + 40),
        centered(28, &RGBColor(0x80, 0x80, 0x80)),
    ))
    .map_err(render_err)?;

    Ok(())
}

fn draw_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    categories: &[(String, Decimal)],
    percentages: &[Decimal],
) -> Result<()> {
    const ROW_HEIGHT: i32 = 64;
    const TOP: i32 = 180;
    const SWATCH_X: i32 = 60;
    const CATEGORY_X: i32 = 130;
    const TOTAL_X: i32 = 640;
    const PERCENT_X: i32 = 840;

    let left = |size: u32| ("sans-serif", size).into_font().color(&BLACK);
    let right = |size: u32| {
        ("sans-serif", size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Top))
    };

    area.draw(&Text::new("Category", (CATEGORY_X, TOP - ROW_HEIGHT), left(30)))
        .map_err(render_err)?;
    area.draw(&Text::new("Total", (TOTAL_X, TOP - ROW_HEIGHT), right(30)))
        .map_err(render_err)?;
    area.draw(&Text::new("%", (PERCENT_X, TOP - ROW_HEIGHT), right(30)))
        .map_err(render_err)?;

    for (i, (category, total)) in categories.iter().enumerate() {
        let y = TOP + i as i32 * ROW_HEIGHT;
        let color = palette_color(i);

        area.draw(&Rectangle::new(
            [(SWATCH_X, y), (SWATCH_X + 36, y + 36)],
            color.filled(),
        ))
        .map_err(render_err)?;
        area.draw(&Text::new(category.clone(), (CATEGORY_X, y), left(28)))
            .map_err(render_err)?;
        area.draw(&Text::new(format_grouped(*total), (TOTAL_X, y), right(28)))
            .map_err(render_err)?;
        area.draw(&Text::new(
            format!("{:.1}%", percentages[i]),
            (PERCENT_X, y),
            right(28),
        ))
        .map_err(render_err)?;
    }

    Ok(())
}
