//! PNG line charts for the photo messages.
//!
//! Charts carry no text; titles and timestamps live in the message caption.

use std::ops::Range;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;

use crate::errors::BotError;

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 300;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const DARK_RED: RGBColor = RGBColor(139, 0, 0);
const LINE: RGBColor = RGBColor(31, 119, 180);

/// Intensity guide lines (mm/h band edges), shown once the axis reaches them.
const PRECIPITATION_GUIDES: [(f64, RGBColor); 4] = [
    (0.03, SKY_BLUE),
    (0.25, BLUE),
    (0.35, ORANGE),
    (0.48, DARK_RED),
];

fn render_error<E: std::fmt::Debug>(e: E) -> BotError {
    BotError::RenderError(format!("{e:?}"))
}

/// Two-hour minute-by-minute precipitation intensity.
///
/// # Errors
///
/// Returns `RenderError` for an empty series or a drawing/encoding failure.
pub fn precipitation_chart(series: &[f64]) -> Result<Vec<u8>, BotError> {
    if series.is_empty() {
        return Err(BotError::RenderError("empty precipitation series".to_string()));
    }
    let peak = series.iter().copied().filter(|v| v.is_finite()).fold(0.0, f64::max);
    let top = if peak > 0.0 { peak * 1.05 } else { 0.05 };

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(minute, value)| (minute as f64, value.max(0.0)))
        .collect();
    let guides: Vec<(f64, RGBColor)> = PRECIPITATION_GUIDES
        .iter()
        .copied()
        .filter(|(level, _)| top > *level)
        .collect();

    line_chart(&points, 0.0..series.len() as f64, 0.0..top, &guides)
}

/// Hourly temperature curve.
///
/// # Errors
///
/// Returns `RenderError` for an empty series or a drawing/encoding failure.
pub fn temperature_chart(series: &[f64]) -> Result<Vec<u8>, BotError> {
    let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(BotError::RenderError("empty temperature series".to_string()));
    }
    let low = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let high = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((high - low) * 0.1).max(1.0);

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(hour, value)| (hour as f64, *value))
        .collect();

    let x_end = (series.len().saturating_sub(1)).max(1) as f64;
    line_chart(&points, 0.0..x_end, (low - pad)..(high + pad), &[])
}

fn line_chart(
    points: &[(f64, f64)],
    x_range: Range<f64>,
    y_range: Range<f64>,
    guides: &[(f64, RGBColor)],
) -> Result<Vec<u8>, BotError> {
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let (x_start, x_end) = (x_range.start, x_range.end);
        let mut chart = ChartBuilder::on(&root)
            .margin(16)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_error)?;

        chart
            .draw_series(LineSeries::new(
                [(x_start, 0.0), (x_end, 0.0)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_error)?;
        for (level, color) in guides {
            chart
                .draw_series(LineSeries::new(
                    [(x_start, *level), (x_end, *level)],
                    color.stroke_width(1),
                ))
                .map_err(render_error)?;
        }
        chart
            .draw_series(LineSeries::new(points.iter().copied(), LINE.stroke_width(2)))
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
    }
    encode_png(&pixels)
}

fn encode_png(pixels: &[u8]) -> Result<Vec<u8>, BotError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixels, WIDTH, HEIGHT, ColorType::Rgb8)
        .map_err(render_error)?;
    Ok(png)
}
