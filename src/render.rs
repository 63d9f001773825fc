use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use plotters::prelude::*;

use crate::{
  chart::{self, ChartOptions},
  document::Series,
};

const TIME_FORMAT: &str = "%H:%M:%S";
const X_LABELS: usize = 12;
const MARKER_SIZE: u32 = 2;

/// A metric ready to be drawn: its name, the chart title and its series.
pub struct Chart<'a> {
  pub metric: &'a str,
  pub title: String,
  pub series: &'a [Series],
}

/// Formats epoch seconds as local wall-clock time.
fn clock(timestamp: f64) -> String {
  let secs = timestamp.floor();
  let nanos = ((timestamp - secs) * 1e9) as u32;

  Local
    .timestamp_opt(secs as i64, nanos)
    .single()
    .map(|time| time.format(TIME_FORMAT).to_string())
    .unwrap_or_default()
}

/// Draws every series of `chart` as one line and writes the PNG to `path`.
///
/// # Errors
///
/// This will return an error if:
/// - the chart has no samples, or its axis ranges overflow.
/// - the bitmap backend fails to draw or encode the image.
pub fn render(chart: &Chart<'_>, options: &ChartOptions, path: &Path) -> Result<()> {
  let bounds = chart::bounds(chart.series).context("no plottable axis range")?;

  let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
  root.fill(&WHITE)?;

  let mut ctx = ChartBuilder::on(&root)
    .caption(&chart.title, ("sans-serif", 28).into_font().style(FontStyle::Bold))
    .margin(20)
    .x_label_area_size(70)
    .y_label_area_size(90)
    .build_cartesian_2d(bounds.x, bounds.y)?;

  ctx
    .configure_mesh()
    .x_desc("Time")
    .y_desc("Value")
    .x_labels(X_LABELS)
    .x_label_formatter(&|x| clock(*x))
    .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
    .bold_line_style(BLACK.mix(0.15))
    .light_line_style(BLACK.mix(0.05))
    .draw()
    .context("mesh")?;

  let legend = options.show_legend(chart.series.len());

  for (i, series) in chart.series.iter().enumerate() {
    let color = Palette99::pick(i).to_rgba();
    let points = series.samples.iter().map(|s| (s.timestamp, s.value));

    let drawn = ctx
      .draw_series(LineSeries::new(points, color.stroke_width(1)).point_size(MARKER_SIZE))
      .with_context(|| format!("series {i}"))?;

    if legend {
      drawn
        .label(options.series_label(chart.metric, &series.labels))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
  }

  if legend {
    ctx
      .configure_series_labels()
      .position(SeriesLabelPosition::UpperRight)
      .background_style(WHITE.mix(0.8))
      .border_style(BLACK)
      .draw()
      .context("legend")?;
  }

  root.present().context("present")?;

  Ok(())
}
