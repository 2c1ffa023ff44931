//! Per-video motif usage bar chart.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use motif_models::{MotifId, VideoId};

use crate::dendrogram::render_err;
use crate::error::{ReportError, ReportResult};

/// One bar: a motif and its share of the video's frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageBar {
    pub motif: MotifId,
    /// Percentage of frames, 0..=100
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct UsageChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for UsageChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

/// Draw bars left to right in the given order, labelled by motif id.
pub fn render_motif_usage(
    path: &Path,
    video: &VideoId,
    bars: &[UsageBar],
    opts: &UsageChartOptions,
) -> ReportResult<()> {
    if bars.is_empty() {
        return Err(ReportError::empty_plot(format!("video {} has no frames", video)));
    }

    let x_max = bars.len() as f64;
    let top = bars.iter().map(|b| b.percent).fold(0.0, f64::max);
    let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let title = format!("Motif usage in video {}", video);
    let mut chart = ChartBuilder::on(&root)
        .caption(title.as_str(), ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Motif ID")
        .y_desc("Percentage of frames (%)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new([(x + 0.1, 0.0), (x + 0.9, bar.percent)], BLUE.filled())
        }))
        .map_err(render_err)?;

    for (i, bar) in bars.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64 + 0.5, 0.0));
        root.draw(&Text::new(
            bar.motif.to_string(),
            (px - 4, py + 8),
            ("sans-serif", 12).into_font(),
        ))
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;

    debug!(path = %path.display(), video = %video, bars = bars.len(), "Motif usage chart saved");
    Ok(())
}
