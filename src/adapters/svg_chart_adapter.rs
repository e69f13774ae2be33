//! SVG equity and price chart, drawn with plotters.

use crate::domain::backtest::{Fill, FillSide};
use crate::domain::error::ScanEqError;
use crate::domain::indicator::{IndicatorSeries, IndicatorValue};
use crate::domain::portfolio::EquityPoint;
use crate::ports::report_port::{ReportContext, ReportPort};
use chrono::{Duration, NaiveDate};
use log::debug;
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 800;

const LINE_COLORS: [RGBColor; 4] = [
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

pub struct SvgChartAdapter {
    width: u32,
    height: u32,
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl SvgChartAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

fn chart_err<E: Display>(e: E) -> ScanEqError {
    ScanEqError::Chart {
        reason: e.to_string(),
    }
}

/// Padded `(min, max)` of `values`; never an empty span.
fn value_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return None;
    }
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        min.abs().max(1.0) * 0.05
    };
    Some((min - pad, max + pad))
}

/// Line segments of an indicator series: one per simple series, three per band set.
fn indicator_lines(series: &IndicatorSeries) -> Vec<(String, Vec<(NaiveDate, f64)>)> {
    let label = series.indicator_type.to_string();
    let valid = series.values.iter().filter(|p| p.valid);
    match series.values.first().map(|p| &p.value) {
        Some(IndicatorValue::Bollinger { .. }) => {
            let mut upper = Vec::new();
            let mut middle = Vec::new();
            let mut lower = Vec::new();
            for point in valid {
                if let IndicatorValue::Bollinger {
                    upper: u,
                    middle: m,
                    lower: l,
                } = point.value
                {
                    upper.push((point.date, u));
                    middle.push((point.date, m));
                    lower.push((point.date, l));
                }
            }
            vec![
                (format!("{label} upper"), upper),
                (format!("{label} middle"), middle),
                (format!("{label} lower"), lower),
            ]
        }
        _ => {
            let points = valid
                .filter_map(|p| match p.value {
                    IndicatorValue::Simple(v) => Some((p.date, v)),
                    IndicatorValue::Bollinger { .. } => None,
                })
                .collect();
            vec![(label, points)]
        }
    }
}

fn marker_style(fill: &Fill) -> ShapeStyle {
    let color = match fill.side {
        FillSide::Buy => GREEN,
        FillSide::Sell => RED,
    };
    if fill.opening {
        color.filled()
    } else {
        color.stroke_width(2)
    }
}

impl ReportPort for SvgChartAdapter {
    fn write(&self, ctx: &ReportContext<'_>, output_path: &Path) -> Result<(), ScanEqError> {
        let (Some(first), Some(last)) = (ctx.bars.first(), ctx.bars.last()) else {
            return Err(ScanEqError::Chart {
                reason: "no bars to plot".into(),
            });
        };
        let x_range = first.date..(last.date + Duration::days(1));

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lines: Vec<(String, Vec<(NaiveDate, f64)>)> = ctx
            .indicators
            .iter()
            .flat_map(|series| indicator_lines(series))
            .collect();

        let equity: &[EquityPoint] = &ctx.result.portfolio.equity_curve;
        let initial = ctx.result.portfolio.initial_capital;
        let (eq_lo, eq_hi) = value_bounds(equity.iter().map(|p| p.equity))
            .unwrap_or((initial - 1.0, initial + 1.0));
        let (px_lo, px_hi) = value_bounds(
            ctx.bars
                .iter()
                .map(|b| b.close)
                .chain(lines.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1)))
                .chain(ctx.result.fills.iter().map(|f| f.price)),
        )
        .ok_or_else(|| ScanEqError::Chart {
            reason: "price series has no finite values".into(),
        })?;

        let root = SVGBackend::new(output_path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let (upper, lower) = root.split_vertically(self.height * 2 / 5);

        let mut eq_chart = ChartBuilder::on(&upper)
            .caption(
                format!("{} {}: equity", ctx.ticker, ctx.strategy),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), eq_lo..eq_hi)
            .map_err(chart_err)?;
        eq_chart
            .configure_mesh()
            .light_line_style(WHITE)
            .x_labels(8)
            .y_desc("Equity")
            .draw()
            .map_err(chart_err)?;
        eq_chart
            .draw_series(LineSeries::new(
                equity.iter().map(|p| (p.date, p.equity)),
                BLUE.stroke_width(2),
            ))
            .map_err(chart_err)?;

        let mut px_chart = ChartBuilder::on(&lower)
            .caption(format!("{} close", ctx.ticker), ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, px_lo..px_hi)
            .map_err(chart_err)?;
        px_chart
            .configure_mesh()
            .light_line_style(WHITE)
            .x_labels(8)
            .y_desc("Price")
            .draw()
            .map_err(chart_err)?;

        px_chart
            .draw_series(LineSeries::new(
                ctx.bars.iter().map(|b| (b.date, b.close)),
                BLACK.stroke_width(1),
            ))
            .map_err(chart_err)?
            .label("Close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

        for (i, (label, points)) in lines.into_iter().enumerate() {
            let color = LINE_COLORS[i % LINE_COLORS.len()];
            px_chart
                .draw_series(LineSeries::new(points, color.stroke_width(1)))
                .map_err(chart_err)?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        px_chart
            .draw_series(
                ctx.result
                    .fills
                    .iter()
                    .map(|f| Circle::new((f.date, f.price), 4, marker_style(f))),
            )
            .map_err(chart_err)?;

        px_chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        debug!("chart written to {}", output_path.display());
        Ok(())
    }
}
