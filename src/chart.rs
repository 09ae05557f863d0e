use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;

use crate::error::WatchError;
use crate::views::VolPoint;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

fn render_err(e: impl std::fmt::Display) -> WatchError {
    WatchError::Render(e.to_string())
}

/// Render a volatility series as a PNG line chart.
///
/// Warmup points (undefined volatility) are skipped, so the line starts at
/// the first defined observation; a series that is all warmup renders as
/// an empty frame. No font backend is compiled in, so the frame carries no
/// text; the axes are drawn bare.
pub fn render_volatility_png(series: &[VolPoint]) -> Result<Vec<u8>, WatchError> {
    let points: Vec<(NaiveDateTime, f64)> = series
        .iter()
        .filter_map(|p| p.vol.map(|v| (p.time, v)))
        .collect();

    let (x_from, x_to) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if first.time < last.time => (first.time, last.time),
        (Some(only), _) => (only.time, only.time + Duration::seconds(1)),
        _ => return Err(WatchError::Render("empty series".to_string())),
    };
    let y_max = points.iter().map(|&(_, v)| v).fold(0.0_f64, f64::max);
    let y_to = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(24)
            .y_label_area_size(40)
            .build_cartesian_2d(RangedDateTime::from(x_from..x_to), 0.0..y_to)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_labels(0)
            .axis_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(&buf)
}

fn encode_png(rgb: &[u8]) -> Result<Vec<u8>, WatchError> {
    let pixels = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, rgb.to_vec())
        .ok_or_else(|| WatchError::Render("chart buffer size mismatch".to_string()))?;
    let mut out = std::io::Cursor::new(Vec::new());
    pixels
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(render_err)?;
    Ok(out.into_inner())
}
