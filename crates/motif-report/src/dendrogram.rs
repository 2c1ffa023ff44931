//! Dendrogram layout and SVG rendering.

use std::path::Path;

use plotters::element::DashedPathElement;
use plotters::prelude::*;
use tracing::info;

use motif_models::{Linkage, MotifSet};

use crate::error::{ReportError, ReportResult};

/// Horizontal distance between neighbouring leaves in layout units.
const LEAF_SPACING: f64 = 10.0;

/// Dash length and gap of the cut line, in pixels.
const CUT_LINE_DASH: u32 = 8;
const CUT_LINE_GAP: u32 = 6;

/// One inverted-U link joining two children at their merge height.
///
/// Points run from the left child up to the merge height, across, and down
/// to the right child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DendrogramLink {
    pub xs: [f64; 4],
    pub ys: [f64; 4],
}

impl DendrogramLink {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.xs.iter().copied().zip(self.ys.iter().copied()).collect()
    }
}

/// Plot coordinates of a linkage tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DendrogramLayout {
    /// Leaf indices from left to right
    pub leaf_order: Vec<usize>,
    /// One link per merge step, in step order
    pub links: Vec<DendrogramLink>,
    pub max_height: f64,
}

impl DendrogramLayout {
    /// Place leaves `LEAF_SPACING` apart in tree order and every merge
    /// midway between its children.
    pub fn from_linkage(linkage: &Linkage) -> Self {
        let n = linkage.n_leaves;
        let leaf_order = linkage.leaf_order();

        let mut x = vec![0.0; n + linkage.steps.len()];
        for (pos, &leaf) in leaf_order.iter().enumerate() {
            x[leaf] = leaf_x(pos);
        }

        let mut links = Vec::with_capacity(linkage.steps.len());
        let mut max_height: f64 = 0.0;
        for (k, step) in linkage.steps.iter().enumerate() {
            let (xl, xr) = (x[step.left], x[step.right]);
            let (hl, hr) = (linkage.height_of(step.left), linkage.height_of(step.right));
            x[n + k] = (xl + xr) / 2.0;
            max_height = max_height.max(step.height);
            links.push(DendrogramLink {
                xs: [xl, xl, xr, xr],
                ys: [hl, step.height, step.height, hr],
            });
        }

        Self {
            leaf_order,
            links,
            max_height,
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_order.len()
    }

    /// Right edge of the plotted x range.
    pub fn x_extent(&self) -> f64 {
        LEAF_SPACING * self.leaf_count() as f64
    }
}

fn leaf_x(position: usize) -> f64 {
    LEAF_SPACING * position as f64 + LEAF_SPACING / 2.0
}

/// Rendering options for [`render_dendrogram`].
#[derive(Debug, Clone)]
pub struct DendrogramOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for DendrogramOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 700,
            title: "Hierarchical clustering of motifs based on Wasserstein distance".to_string(),
            x_label: "Motif ID".to_string(),
            y_label: "Wasserstein distance".to_string(),
        }
    }
}

/// Render a dendrogram to an SVG file.
///
/// `labels` maps leaf index (matrix position) to motif id; leaves are
/// labelled with the motif id, never the index. A red dashed line marks
/// `cut_height`.
pub fn render_dendrogram(
    path: &Path,
    layout: &DendrogramLayout,
    labels: &MotifSet,
    cut_height: f64,
    opts: &DendrogramOptions,
) -> ReportResult<()> {
    if layout.leaf_count() == 0 {
        return Err(ReportError::empty_plot("dendrogram has no leaves"));
    }
    if labels.len() != layout.leaf_count() {
        return Err(ReportError::LabelMismatch {
            leaves: layout.leaf_count(),
            labels: labels.len(),
        });
    }

    let x_max = layout.x_extent();
    let y_top = layout.max_height.max(cut_height);
    let y_max = if y_top > 0.0 { y_top * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(opts.title.as_str(), ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(opts.x_label.as_str())
        .y_desc(opts.y_label.as_str())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            layout
                .links
                .iter()
                .map(|link| PathElement::new(link.points(), BLUE.stroke_width(1))),
        )
        .map_err(render_err)?;

    chart
        .draw_series(std::iter::once(DashedPathElement::new(
            vec![(0.0, cut_height), (x_max, cut_height)],
            CUT_LINE_DASH,
            CUT_LINE_GAP,
            RED.stroke_width(2),
        )))
        .map_err(render_err)?;

    for (pos, &leaf) in layout.leaf_order.iter().enumerate() {
        let Some(motif) = labels.motif_at(leaf) else {
            continue;
        };
        let (px, py) = chart.backend_coord(&(leaf_x(pos), 0.0));
        root.draw(&Text::new(
            motif.to_string(),
            (px - 4, py + 8),
            ("sans-serif", 13).into_font(),
        ))
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;

    info!(
        path = %path.display(),
        leaves = layout.leaf_count(),
        cut_height,
        "Dendrogram saved"
    );
    Ok(())
}

pub(crate) fn render_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_models::LinkageStep;
    use std::fs;
    use tempfile::TempDir;

    /// Text node content, whether written inline or on its own line.
    pub(crate) fn has_text(svg: &str, text: &str) -> bool {
        svg.contains(&format!(">{}<", text)) || svg.lines().any(|l| l.trim() == text)
    }

    fn two_groups() -> Linkage {
        Linkage::new(
            4,
            vec![
                LinkageStep { left: 0, right: 1, height: 1.0, size: 2 },
                LinkageStep { left: 2, right: 3, height: 2.0, size: 2 },
                LinkageStep { left: 4, right: 5, height: 10.0, size: 4 },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_layout_positions() {
        let layout = DendrogramLayout::from_linkage(&two_groups());

        assert_eq!(layout.leaf_order, vec![0, 1, 2, 3]);
        assert_eq!(layout.max_height, 10.0);
        assert_eq!(layout.x_extent(), 40.0);
        assert_eq!(
            layout.links[0],
            DendrogramLink { xs: [5.0, 5.0, 15.0, 15.0], ys: [0.0, 1.0, 1.0, 0.0] }
        );
        assert_eq!(
            layout.links[2],
            DendrogramLink { xs: [10.0, 10.0, 30.0, 30.0], ys: [1.0, 10.0, 10.0, 2.0] }
        );
    }

    #[test]
    fn test_layout_follows_leaf_order() {
        let linkage = Linkage::new(
            3,
            vec![
                LinkageStep { left: 0, right: 2, height: 0.5, size: 2 },
                LinkageStep { left: 1, right: 3, height: 0.9, size: 3 },
            ],
        )
        .unwrap();
        let layout = DendrogramLayout::from_linkage(&linkage);

        assert_eq!(layout.leaf_order, vec![1, 0, 2]);
        // Leaf 0 sits in the second slot, leaf 2 in the third
        assert_eq!(layout.links[0].xs, [15.0, 15.0, 25.0, 25.0]);
        assert_eq!(layout.links[1].xs, [5.0, 5.0, 20.0, 20.0]);
    }

    #[test]
    fn test_render_writes_svg_with_motif_labels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dendrogram.svg");
        let layout = DendrogramLayout::from_linkage(&two_groups());
        let labels = MotifSet::from_ids([40, 41, 52, 53]).unwrap();

        render_dendrogram(&path, &layout, &labels, 5.0, &DendrogramOptions::default()).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Hierarchical clustering of motifs based on Wasserstein distance"));
        assert!(svg.contains("Motif ID"));
        for id in ["40", "41", "52", "53"] {
            assert!(has_text(&svg, id), "missing label {}", id);
        }
    }

    #[test]
    fn test_cut_line_is_dashed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cut.svg");
        let layout = DendrogramLayout::from_linkage(&two_groups());
        let labels = MotifSet::from_ids([40, 41, 52, 53]).unwrap();

        render_dendrogram(&path, &layout, &labels, 5.0, &DendrogramOptions::default()).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        let red_segments = svg.matches(r##"stroke="#FF0000""##).count();
        assert!(red_segments > 1, "expected dash segments, found {}", red_segments);
    }

    #[test]
    fn test_render_single_leaf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("single.svg");
        let layout = DendrogramLayout::from_linkage(&Linkage::new(1, vec![]).unwrap());
        let labels = MotifSet::from_ids([7]).unwrap();

        render_dendrogram(&path, &layout, &labels, 0.2, &DendrogramOptions::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_rejects_bad_labels() {
        let dir = TempDir::new().unwrap();
        let layout = DendrogramLayout::from_linkage(&two_groups());
        let labels = MotifSet::from_ids([1, 2]).unwrap();

        assert!(matches!(
            render_dendrogram(
                &dir.path().join("x.svg"),
                &layout,
                &labels,
                1.0,
                &DendrogramOptions::default()
            ),
            Err(ReportError::LabelMismatch { leaves: 4, labels: 2 })
        ));
    }
}
