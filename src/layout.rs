//! Bar geometry helpers: the shared y-axis range and value-label placement.

/// Bars are drawn edge-aligned: column `i` spans `[i, i + BAR_WIDTH]` in
/// data coordinates.
pub const BAR_WIDTH: f64 = 0.5;

/// Vertical slack above the tallest column of a subplot; stands in for the
/// renderer's lack of autoscaling.
pub const HEADROOM: f64 = 1.05;

/// Shared y-axis range. Computed once from all subplots' natural extents,
/// read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Natural extent of a subplot whose tallest column reaches
    /// `column_max`.
    pub fn natural(column_max: f64) -> Self {
        AxisRange {
            min: 0.0,
            max: column_max * HEADROOM,
        }
    }

    /// Union of per-subplot extents: every input range is contained in the
    /// result, so no data point is clipped.
    pub fn unify(ranges: impl IntoIterator<Item = AxisRange>) -> AxisRange {
        ranges.into_iter().fold(
            AxisRange {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |acc, r| AxisRange {
                min: acc.min.min(r.min),
                max: acc.max.max(r.max),
            },
        )
    }

    pub fn contains(&self, other: &AxisRange) -> bool {
        self.min <= other.min && self.max >= other.max
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Center,
    Left,
    Right,
}

/// Requested label position relative to the bar center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPos {
    #[default]
    Center,
    Right,
    Left,
}

/// A value label for one bar: anchor point in data coordinates, formatted
/// text and horizontal alignment. Built per bar at layout time, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub anchor: (f64, f64),
    pub text: String,
    pub align: HAlign,
}

/// x_txt = x + w * offset; a label right of center is left-aligned and
/// vice versa.
fn anchor_x(bar_x: f64, width: f64, pos: LabelPos) -> (f64, HAlign) {
    match pos {
        LabelPos::Center => (bar_x + 0.5 * width, HAlign::Center),
        LabelPos::Right => (bar_x + 0.57 * width, HAlign::Left),
        LabelPos::Left => (bar_x + 0.43 * width, HAlign::Right),
    }
}

/// Label above a grouped bar. The offset is proportional to the chart-wide
/// maximum so labels sit at the same visual distance on every subplot.
pub fn grouped_label(
    bar_x: f64,
    width: f64,
    value: f64,
    global_max: f64,
    pos: LabelPos,
) -> LabelSpec {
    let (x, align) = anchor_x(bar_x, width, pos);
    LabelSpec {
        anchor: (x, value + global_max / 80.0),
        text: format_sig(value),
        align,
    }
}

/// Label inside a stacked segment, anchored at the segment midpoint. Thin
/// segments sitting on a thin base get their placement height amplified so
/// the text clears the segment boundary; the text itself is always the true
/// height.
pub fn stacked_label(
    bar_x: f64,
    width: f64,
    base: f64,
    height: f64,
    global_max: f64,
    pos: LabelPos,
) -> LabelSpec {
    let (x, align) = anchor_x(bar_x, width, pos);
    LabelSpec {
        anchor: (x, base + amplified_height(base, height, global_max) / 2.0),
        text: format_sig(height),
        align,
    }
}

fn amplified_height(base: f64, height: f64, global_max: f64) -> f64 {
    if base > 0.0 && base < global_max / 150.0 && height < global_max / 150.0 {
        height * 12.0
    } else if base > 0.0 && base < global_max / 100.0 && height < global_max / 100.0 {
        height * 10.0
    } else {
        height
    }
}

/// `%.4g`-style formatting: four significant digits, trailing zeros
/// trimmed, scientific notation outside `[1e-4, 1e4)`.
pub fn format_sig(v: f64) -> String {
    const DIGITS: i32 = 4;
    if v == 0.0 {
        return "0".to_owned();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let mut exp = v.abs().log10().floor() as i32;
    if exp < -4 || exp >= DIGITS {
        let scale = 10f64.powi(DIGITS - 1);
        let mut mantissa = (v / 10f64.powi(exp) * scale).round() / scale;
        if mantissa.abs() >= 10.0 {
            // rounding crossed a decade boundary; renormalize, and retry on
            // the fixed path if the bumped exponent re-enters its window
            mantissa /= 10.0;
            exp += 1;
            if (-4..DIGITS).contains(&exp) {
                return format_sig(mantissa * 10f64.powi(exp));
            }
        }
        let mantissa = format!("{:.*}", (DIGITS - 1) as usize, mantissa);
        format!("{}e{:+03}", trim_zeros(&mantissa), exp)
    } else {
        let decimals = (DIGITS - 1 - exp).max(0) as usize;
        let scale = 10f64.powi(decimals as i32);
        let rounded = (v * scale).round() / scale;
        if rounded.abs() >= 10f64.powi(DIGITS) {
            // rounding crossed the significant-digit boundary; retry on the
            // scientific path
            return format_sig(rounded);
        }
        trim_zeros(&format!("{rounded:.decimals$}"))
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s.to_owned()
    }
}
