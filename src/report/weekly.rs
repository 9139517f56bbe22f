use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

use super::{render_err, RenderOutcome};

pub(crate) const WEEKLY_REPORT_FILE: &str = "weekly_expense_report.png";

/// Fixed alert level for daily spending; drawn as a dashed reference line.
pub(crate) const SPENDING_THRESHOLD: f64 = 30000.0;

// 10x5 inches at 200 DPI.
const WIDTH: u32 = 2000;
const HEIGHT: u32 = 1000;

/// Dark-themed daily expense line over the last seven days, one annotated
/// point per day. Input is already zero-filled, so this variant always
/// renders.
pub(crate) fn render_weekly_line(
    labels: &[String],
    values: &[Decimal],
    path: &Path,
) -> Result<RenderOutcome> {
    let points: Vec<(i32, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as i32, v.to_f64().unwrap_or(0.0)))
        .collect();
    let peak = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = peak.max(SPENDING_THRESHOLD) * 1.15;

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BLACK).map_err(render_err)?;

    let white_text = |size: u32| ("sans-serif", size).into_font().color(&WHITE);

    let mut chart = ChartBuilder::on(&root)
        .caption("Weekly Expense Report (Last 7 Days)", white_text(44))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(130)
        .build_cartesian_2d(-1..labels.len() as i32, 0f64..y_max)
        .map_err(render_err)?;

    let owned_labels = labels.to_vec();
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Expense Amount (in currency)")
        .axis_desc_style(white_text(28))
        .label_style(white_text(22))
        .bold_line_style(WHITE.mix(0.15))
        .light_line_style(WHITE.mix(0.05))
        .axis_style(&WHITE)
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            owned_labels
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(DashedLineSeries::new(
            (-1..=labels.len() as i32).map(|x| (x, SPENDING_THRESHOLD)),
            14,
            10,
            RED.stroke_width(3),
        ))
        .map_err(render_err)?
        .label(format!("Threshold ({})", SPENDING_THRESHOLD as i64))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], RED.stroke_width(3)));

    chart
        .draw_series(LineSeries::new(
            points.clone(),
            CYAN.stroke_width(4),
        ))
        .map_err(render_err)?;

    chart
        .draw_series(PointSeries::of_element(
            points,
            8,
            CYAN.filled(),
            &|coord, size, style| {
                EmptyElement::at(coord)
                    + Circle::new((0, 0), size, style)
                    + Text::new(
                        format!("{:.2}", coord.1),
                        (0, -34),
                        ("sans-serif", 20).into_font().color(&WHITE),
                    )
            },
        ))
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BLACK.mix(0.6))
        .border_style(&WHITE)
        .label_font(white_text(24))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(RenderOutcome::Rendered(path.to_path_buf()))
}
