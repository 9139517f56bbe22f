use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

use super::{palette_color, render_err, RenderOutcome};
use crate::aggregate::DaySeries;

pub(crate) const COMPARE_REPORT_FILE: &str = "expense_compare_month.png";

// 14x5 inches at 200 DPI.
const WIDTH: u32 = 2800;
const HEIGHT: u32 = 1000;

/// Two side-by-side stacked-area plots, prior month on the left, sharing
/// a y-range and one legend.
pub(crate) fn render_compare(series: &DaySeries, path: &Path) -> Result<RenderOutcome> {
    if series.is_empty() {
        return Ok(RenderOutcome::NoData);
    }

    let prior_stack = cumulative(&series.prior, series.days);
    let current_stack = cumulative(&series.current, series.days);
    let y_max = stack_peak(&prior_stack).max(stack_peak(&current_stack)) * 1.05;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (left, right) = root.split_horizontally(WIDTH / 2);

    draw_stack(&left, "Last Month", &prior_stack, series, y_max, true, false)?;
    draw_stack(&right, "This Month", &current_stack, series, y_max, false, true)?;

    root.present().map_err(render_err)?;
    Ok(RenderOutcome::Rendered(path.to_path_buf()))
}

/// Running per-day sums through each category, in category order. Painting
/// the tallest stack first and each smaller one over it produces the
/// stacked-area effect.
fn cumulative(series: &[Vec<Decimal>], days: u32) -> Vec<Vec<f64>> {
    let mut running = vec![0f64; days as usize];
    series
        .iter()
        .map(|per_day| {
            for (i, value) in per_day.iter().enumerate() {
                running[i] += value.to_f64().unwrap_or(0.0);
            }
            running.clone()
        })
        .collect()
}

fn stack_peak(stacks: &[Vec<f64>]) -> f64 {
    stacks
        .last()
        .map(|top| top.iter().copied().fold(0.0, f64::max))
        .unwrap_or(0.0)
}

fn draw_stack<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    stacks: &[Vec<f64>],
    series: &DaySeries,
    y_max: f64,
    with_y_desc: bool,
    with_legend: bool,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 48))
        .margin(24)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(1f64..series.days as f64 + 1.0, 0f64..y_max)
        .map_err(render_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Day").label_style(("sans-serif", 24));
    if with_y_desc {
        mesh.y_desc("Amount");
    }
    mesh.draw().map_err(render_err)?;

    // Tallest first so each smaller stack paints on top of it.
    for k in (0..stacks.len()).rev() {
        let color = palette_color(k);
        let points = stacks[k]
            .iter()
            .enumerate()
            .map(|(i, y)| (i as f64 + 1.0, *y));
        let anno = chart
            .draw_series(AreaSeries::new(points, 0.0, color.mix(0.9)))
            .map_err(render_err)?;
        if with_legend {
            anno.label(series.categories[k].clone()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 7), (x + 16, y + 7)], color.filled())
            });
        }
    }

    if with_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font(("sans-serif", 26))
            .draw()
            .map_err(render_err)?;
    }

    Ok(())
}
