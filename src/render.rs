//! plotters-backed rendering of a composed [`ChartSpec`].
//!
//! Everything here consumes geometry computed by the chart module; nothing
//! feeds back into layout. The backend is picked from the output extension,
//! and the no-extension path opens a temporary SVG in the system viewer.

use std::path::Path;
use std::process::Command;

use eyre::{Context, Result, bail, eyre};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::ErrorBar;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use crate::chart::{ChartMode, ChartSpec, REFERENCE_DASH, Swatch, THRESHOLD_DASH};
use crate::layout::{BAR_WIDTH, HAlign};

const FIG_SIZE: (u32, u32) = (1000, 600);
const TITLE_BAND: u32 = 28;
const LEGEND_BAND: u32 = 64;

/// Renders `spec` to `path`, picking the backend from the file extension.
pub fn save(spec: &ChartSpec, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "svg" => {
            let root = SVGBackend::new(path, FIG_SIZE).into_drawing_area();
            draw_figure(&root, spec).map_err(|e| eyre!("render {}: {e}", path.display()))?;
        }
        "png" | "bmp" | "jpg" | "jpeg" => {
            let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
            draw_figure(&root, spec).map_err(|e| eyre!("render {}: {e}", path.display()))?;
        }
        other => bail!("unsupported output format '{other}' (expected svg, png, bmp or jpg)"),
    }
    info!("saved {}", path.display());
    Ok(())
}

/// Renders to a temporary SVG and opens it in the system viewer; the
/// stand-in for an interactive figure window.
pub fn show(spec: &ChartSpec) -> Result<()> {
    let path = std::env::temp_dir().join(format!("iosched-plot-{}.svg", std::process::id()));
    save(spec, &path)?;
    debug!("opening {} in the system viewer", path.display());
    let status = Command::new("xdg-open")
        .arg(&path)
        .status()
        .context("launch system viewer (xdg-open)")?;
    if !status.success() {
        bail!("system viewer exited with {status}");
    }
    Ok(())
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (width, _) = root.dim_in_pixel();
    root.draw(&Text::new(
        spec.title.clone(),
        (width as i32 / 2, 8),
        ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top)),
    ))?;

    let grid = root.margin(TITLE_BAND, LEGEND_BAND, 4, 4);
    let areas = grid.split_evenly((1, spec.subplots.len()));

    for (idx, (area, subplot)) in areas.iter().zip(&spec.subplots).enumerate() {
        let x_range = spec.x_range();
        let mut chart = ChartBuilder::on(area)
            .margin_top(26)
            .x_label_area_size(34)
            .y_label_area_size(if idx == 0 { 50 } else { 0 })
            .build_cartesian_2d(x_range.clone(), spec.y_range.min..spec.y_range.max)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh().disable_y_mesh().disable_x_axis();
        if idx == 0 {
            mesh.y_desc(spec.y_label).y_label_style(("sans-serif", 10));
        } else {
            mesh.disable_y_axis();
        }
        mesh.draw()?;

        chart.draw_series(subplot.segments.iter().map(|seg| {
            Rectangle::new(
                [
                    (seg.x, seg.base),
                    (seg.x + seg.width, seg.base + seg.height),
                ],
                layer_color(spec.mode, seg.layer)
                    .mix(fill_alpha(spec.mode))
                    .filled(),
            )
        }))?;

        chart.draw_series(subplot.segments.iter().filter_map(|seg| {
            seg.error.map(|err| {
                let center = seg.x + seg.width / 2.0;
                let top = seg.base + seg.height;
                ErrorBar::new_vertical(center, top - err, top, top + err, BLACK.filled(), 8)
            })
        }))?;

        for label in &subplot.labels {
            let style = ("sans-serif", 9)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(hpos(label.align), VPos::Bottom));
            chart
                .plotting_area()
                .draw(&Text::new(label.text.clone(), label.anchor, style))?;
        }

        // Two-line subplot title in the margin reserved above the plot.
        let mid_x = (x_range.start + x_range.end) / 2.0;
        let (tx, ty) = chart.backend_coord(&(mid_x, spec.y_range.max));
        for (li, line) in subplot.title.split('\n').enumerate() {
            root.draw(&Text::new(
                line.to_owned(),
                (tx, ty - 26 + li as i32 * 12),
                ("sans-serif", 10)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Top)),
            ))?;
        }

        // Scheduler tick labels, two lines, centered under each bar.
        for (ci, tick) in spec.tick_labels.iter().enumerate() {
            let (px, py) =
                chart.backend_coord(&(ci as f64 + BAR_WIDTH / 2.0, spec.y_range.min));
            for (li, line) in tick.split('\n').enumerate() {
                root.draw(&Text::new(
                    line.to_owned(),
                    (px, py + 4 + li as i32 * 11),
                    ("sans-serif", 9)
                        .into_font()
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Top)),
                ))?;
            }
        }

        // Corner annotation pairs naming the tick-label and title rows;
        // leftmost subplot only.
        if idx == 0 {
            let annotation = |vpos| {
                ("sans-serif", 9)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Right, vpos))
            };
            let (bx, by) = chart.backend_coord(&(x_range.start, spec.y_range.min));
            for (li, line) in ["I/O policy:", "Scheduler:"].iter().enumerate() {
                root.draw(&Text::new(
                    (*line).to_owned(),
                    (bx - 4, by + 4 + li as i32 * 11),
                    annotation(VPos::Top),
                ))?;
            }
            let (ux, uy) = chart.backend_coord(&(x_range.start, spec.y_range.max));
            for (li, line) in ["Interferers:", "Target:"].iter().enumerate() {
                root.draw(&Text::new(
                    (*line).to_owned(),
                    (ux - 4, uy - 26 + li as i32 * 11),
                    annotation(VPos::Top),
                ))?;
            }
        }

        // A line outside the shared range would land on neighbouring
        // subplot areas, so clamp to what matplotlib's clipping hides.
        if let Some(reference) = spec.reference {
            if reference >= spec.y_range.min && reference <= spec.y_range.max {
                let (x0, yp) = chart.backend_coord(&(x_range.start, reference));
                let (x1, _) = chart.backend_coord(&(x_range.end, reference));
                draw_dashes(root, x0, x1, yp, REFERENCE_DASH)?;
            }
        }
        if let Some(threshold) = subplot.threshold {
            if threshold >= spec.y_range.min && threshold <= spec.y_range.max {
                let (x0, yp) = chart.backend_coord(&(x_range.start, threshold));
                let (x1, _) = chart.backend_coord(&(x_range.end, threshold));
                draw_dashes(root, x0, x1, yp, THRESHOLD_DASH)?;
            }
        }
    }

    draw_legend(root, spec)?;
    root.present()?;
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (width, height) = root.dim_in_pixel();
    let band_top = height as i32 - LEGEND_BAND as i32;
    let cell_w = width as i32 / 2;

    for (i, entry) in spec.legend.iter().enumerate() {
        let col = (i % 2) as i32;
        let row = (i / 2) as i32;
        let x = col * cell_w + 60;
        let y = band_top + 12 + row * 16;

        match entry.swatch {
            Swatch::Solid(layer) => {
                root.draw(&Rectangle::new(
                    [(x, y - 5), (x + 18, y + 5)],
                    layer_color(spec.mode, layer).filled(),
                ))?;
            }
            Swatch::SplitStack => {
                root.draw(&Rectangle::new(
                    [(x, y - 5), (x + 18, y + 5)],
                    layer_color(spec.mode, 1).filled(),
                ))?;
                root.draw(&Rectangle::new(
                    [(x, y), (x + 18, y + 5)],
                    layer_color(spec.mode, 0).filled(),
                ))?;
            }
            Swatch::Dashed(on, off) => {
                draw_dashes(root, x, x + 18, y, (on, off))?;
            }
        }

        root.draw(&Text::new(
            entry.label.to_owned(),
            (x + 24, y),
            ("sans-serif", 9)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }
    Ok(())
}

/// Synthesizes a dashed horizontal line from pixel segments; plotters has no
/// dash style of its own.
fn draw_dashes<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x0: i32,
    x1: i32,
    y: i32,
    dash: (u32, u32),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (on, off) = (dash.0 as i32, dash.1 as i32);
    let mut x = x0.min(x1);
    let end = x0.max(x1);
    while x < end {
        let seg_end = (x + on).min(end);
        root.draw(&PathElement::new(vec![(x, y), (seg_end, y)], BLACK))?;
        x = seg_end + off;
    }
    Ok(())
}

fn layer_color(mode: ChartMode, layer: usize) -> RGBColor {
    match (mode, layer) {
        // matplotlib grayscale '0.5'
        (ChartMode::Grouped, _) => RGBColor(128, 128, 128),
        // lightcoral / turquoise
        (ChartMode::Stacked, 0) => RGBColor(240, 128, 128),
        (ChartMode::Stacked, _) => RGBColor(64, 224, 208),
    }
}

fn fill_alpha(mode: ChartMode) -> f64 {
    match mode {
        ChartMode::Grouped => 0.6,
        ChartMode::Stacked => 1.0,
    }
}

fn hpos(align: HAlign) -> HPos {
    match align {
        HAlign::Center => HPos::Center,
        HAlign::Left => HPos::Left,
        HAlign::Right => HPos::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartMode, ChartSpec};
    use crate::report::Report;

    const REPORT: &str = "\
# Latency comparison
#
#
#
# Min throughput to guarantee to the target: 5.0
#
#
# x y sched1-a sched2-b
wl1_vs_wl2 10 1 20 2
";

    #[test]
    fn unsupported_extension_is_rejected() {
        let report = Report::parse(REPORT).unwrap();
        let spec = ChartSpec::compose(&report, ChartMode::Grouped).unwrap();
        let err = save(&spec, Path::new("out.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported output format"));
    }

    #[test]
    fn stacked_layers_keep_their_palette() {
        assert_eq!(layer_color(ChartMode::Stacked, 0), RGBColor(240, 128, 128));
        assert_eq!(layer_color(ChartMode::Stacked, 1), RGBColor(64, 224, 208));
        assert_eq!(layer_color(ChartMode::Grouped, 0), RGBColor(128, 128, 128));
    }

    #[test]
    fn alignment_maps_onto_text_anchors() {
        assert!(matches!(hpos(HAlign::Center), HPos::Center));
        assert!(matches!(hpos(HAlign::Left), HPos::Left));
        assert!(matches!(hpos(HAlign::Right), HPos::Right));
    }
}
