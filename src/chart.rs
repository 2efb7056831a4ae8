//! Chart composition: one subplot per workload row, the shared axis range,
//! reference/threshold lines and the legend configuration, all as plain data
//! for the renderer.

use std::ops::Range;

use tracing::debug;

use crate::error::FormatError;
use crate::layout::{
    AxisRange, BAR_WIDTH, LabelPos, LabelSpec, grouped_label, stacked_label,
};
use crate::matrix::{BarMatrix, global_max};
use crate::report::{Report, WorkloadRow, display_label};

/// Horizontal slack either side of the outermost bars.
const X_MARGIN: f64 = 0.25;

/// Dash pattern (on, off) in pixels for the minimum-guaranteed reference
/// line.
pub const REFERENCE_DASH: (u32, u32) = (4, 6);
/// Dash pattern for the per-subplot reachable-threshold line.
pub const THRESHOLD_DASH: (u32, u32) = (7, 7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// Bars show value ± error per scheduler column.
    Grouped,
    /// Bars show two cumulative layers per scheduler column.
    Stacked,
}

/// One rectangle of bar geometry, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x: f64,
    pub width: f64,
    pub base: f64,
    pub height: f64,
    /// Index into the mode's color series.
    pub layer: usize,
    /// Error amplitude around the segment top; grouped mode only.
    pub error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subplot {
    /// `"<interferers>\n<target>"`.
    pub title: String,
    pub segments: Vec<Segment>,
    pub labels: Vec<LabelSpec>,
    /// Throughput reached by this row without any I/O control; drawn as a
    /// dashed line when positive.
    pub threshold: Option<f64>,
    /// Extent before unification; kept so the unified range can be checked
    /// against it.
    pub natural_range: AxisRange,
}

/// Legend glyph, kept as data so the renderer decides how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    /// Solid block in the given layer color.
    Solid(usize),
    /// Half-and-half block standing for the sum of both stacked layers.
    SplitStack,
    /// Dashed line sample with the given on/off pattern.
    Dashed(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub swatch: Swatch,
}

/// Everything the renderer needs, computed once. The y-range is written by
/// the unification pass during composition and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub mode: ChartMode,
    pub y_label: &'static str,
    /// Display-wrapped scheduler labels, shared by all subplots. The
    /// baseline column is already excluded.
    pub tick_labels: Vec<String>,
    pub subplots: Vec<Subplot>,
    pub y_range: AxisRange,
    /// Minimum guaranteed to the target; drawn dashed on every subplot.
    pub reference: Option<f64>,
    pub legend: Vec<LegendEntry>,
}

impl ChartSpec {
    pub fn compose(report: &Report, mode: ChartMode) -> Result<Self, FormatError> {
        let baseline = report.baseline_index();
        let chart_max = global_max(&report.rows);

        let mut subplots = Vec::with_capacity(report.rows.len());
        for row in &report.rows {
            let matrix = BarMatrix::build(row, report.column_labels.len(), baseline)?;
            subplots.push(compose_subplot(row, &matrix, mode, chart_max));
        }
        let y_range = AxisRange::unify(subplots.iter().map(|s| s.natural_range));

        let mut canonical = report.column_labels.clone();
        if let Some(idx) = baseline {
            canonical.remove(idx);
        }
        let tick_labels = canonical.iter().map(|l| display_label(l)).collect();

        let legend = match mode {
            ChartMode::Grouped => grouped_legend(),
            ChartMode::Stacked => {
                stacked_legend(baseline.is_some(), report.reference_value.is_some())
            }
        };

        debug!(
            subplots = subplots.len(),
            ?y_range,
            legend = legend.len(),
            "composed chart"
        );
        Ok(ChartSpec {
            title: report.title.clone(),
            mode,
            y_label: match mode {
                ChartMode::Grouped => "Latency [ms]",
                ChartMode::Stacked => "Target, interferers and total throughput",
            },
            tick_labels,
            subplots,
            y_range,
            reference: report.reference_value,
            legend,
        })
    }

    /// Shared x-range: bars for column `i` span `[i, i + BAR_WIDTH]`.
    pub fn x_range(&self) -> Range<f64> {
        -X_MARGIN..(self.tick_labels.len() as f64 - 1.0 + BAR_WIDTH + X_MARGIN)
    }
}

fn compose_subplot(
    row: &WorkloadRow,
    matrix: &BarMatrix,
    mode: ChartMode,
    chart_max: f64,
) -> Subplot {
    let (target, interferers) = row.split_names();
    let mut segments = Vec::new();
    let mut labels = Vec::new();

    for (i, (&value, &second)) in matrix.values.iter().zip(&matrix.seconds).enumerate() {
        let x = i as f64;
        match mode {
            ChartMode::Grouped => {
                segments.push(Segment {
                    x,
                    width: BAR_WIDTH,
                    base: 0.0,
                    height: value,
                    layer: 0,
                    error: Some(second),
                });
                labels.push(grouped_label(x, BAR_WIDTH, value, chart_max, LabelPos::Center));
            }
            ChartMode::Stacked => {
                segments.push(Segment {
                    x,
                    width: BAR_WIDTH,
                    base: 0.0,
                    height: value,
                    layer: 0,
                    error: None,
                });
                labels.push(stacked_label(
                    x,
                    BAR_WIDTH,
                    0.0,
                    value,
                    chart_max,
                    LabelPos::Center,
                ));
                segments.push(Segment {
                    x,
                    width: BAR_WIDTH,
                    base: value,
                    height: second,
                    layer: 1,
                    error: None,
                });
                labels.push(stacked_label(
                    x,
                    BAR_WIDTH,
                    value,
                    second,
                    chart_max,
                    LabelPos::Center,
                ));
            }
        }
    }

    Subplot {
        title: format!("{interferers}\n{target}"),
        segments,
        labels,
        threshold: matrix.reachable_threshold.filter(|thr| *thr > 0.0),
        natural_range: AxisRange::natural(matrix.column_max()),
    }
}

fn grouped_legend() -> Vec<LegendEntry> {
    vec![LegendEntry {
        label: "Average latency experienced by individual I/O operations of the target group",
        swatch: Swatch::Solid(0),
    }]
}

const INTERFERERS_ENTRY: LegendEntry = LegendEntry {
    label: "Cumulative avg throughput of interferers",
    swatch: Swatch::Solid(1),
};
const TARGET_ENTRY: LegendEntry = LegendEntry {
    label: "Avg throughput of target",
    swatch: Swatch::Solid(0),
};
const TOTAL_ENTRY: LegendEntry = LegendEntry {
    label: "Avg total throughput (sum of bars)",
    swatch: Swatch::SplitStack,
};
const NO_CONTROL_ENTRY: LegendEntry = LegendEntry {
    label: "Avg throughput reached without any I/O control",
    swatch: Swatch::Dashed(THRESHOLD_DASH.0, THRESHOLD_DASH.1),
};
const GUARANTEED_ENTRY: LegendEntry = LegendEntry {
    label: "Min avg throughput to be guaranteed to target",
    swatch: Swatch::Dashed(REFERENCE_DASH.0, REFERENCE_DASH.1),
};

/// Legend rows for a stacked chart, keyed by which optional lines exist.
/// Every combination is spelled out so none of them is patched together at
/// the call site.
fn stacked_legend(has_baseline: bool, has_reference: bool) -> Vec<LegendEntry> {
    match (has_baseline, has_reference) {
        (true, true) => vec![
            INTERFERERS_ENTRY,
            TARGET_ENTRY,
            TOTAL_ENTRY,
            NO_CONTROL_ENTRY,
            GUARANTEED_ENTRY,
        ],
        (true, false) => vec![
            INTERFERERS_ENTRY,
            TARGET_ENTRY,
            TOTAL_ENTRY,
            NO_CONTROL_ENTRY,
        ],
        (false, true) => vec![INTERFERERS_ENTRY, TARGET_ENTRY, TOTAL_ENTRY, GUARANTEED_ENTRY],
        (false, false) => vec![INTERFERERS_ENTRY, TARGET_ENTRY, TOTAL_ENTRY],
    }
}
