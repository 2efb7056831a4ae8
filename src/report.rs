//! Parser for the fixed-layout benchmark report format.
//!
//! Reports are UTF-8 text with a fixed header block: the title on the first
//! line, the minimum-guaranteed reference value on the fifth, the scheduler
//! header on the eighth, and one workload row per remaining line.

use tracing::debug;

use crate::error::FormatError;

/// Line indices of the fixed report layout, named so the magic row numbers
/// live in one place.
const TITLE_LINE: usize = 0;
const REFERENCE_LINE: usize = 4;
const HEADER_LINE: usize = 7;
const FIRST_ROW_LINE: usize = 8;

/// Canonical label of the "no I/O control applied" column.
pub const BASELINE_LABEL: &str = "none-none";

/// A parsed benchmark report: title, optional reference value, scheduler
/// column labels and one row of measurements per workload combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    /// Minimum throughput to be guaranteed to the target, when the
    /// reference line's last token is numeric.
    pub reference_value: Option<f64>,
    /// Canonical `<policy>-<scheduler>` labels, in header order.
    pub column_labels: Vec<String>,
    pub rows: Vec<WorkloadRow>,
}

/// One line of per-scheduler measurement pairs for one target/interferer
/// combination.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadRow {
    /// Raw `<target>_vs_<interferers>` name.
    pub name: String,
    /// Interleaved (value, error-or-second-layer) pairs, one pair per
    /// scheduler column.
    pub raw_numbers: Vec<f64>,
    /// 1-based line in the source file, for diagnostics.
    pub line: usize,
}

impl Report {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        if lines.len() <= FIRST_ROW_LINE {
            return Err(FormatError::TooShort { got: lines.len() });
        }

        let title = lines[TITLE_LINE]
            .strip_prefix("# ")
            .unwrap_or(lines[TITLE_LINE])
            .to_owned();
        let reference_value = parse_reference(lines[REFERENCE_LINE]);

        // The header shares the `# ` comment marker with the title line; the
        // first two fields after it name the workload and iteration columns.
        let header = lines[HEADER_LINE]
            .strip_prefix("# ")
            .unwrap_or(lines[HEADER_LINE]);
        let column_labels: Vec<String> = header
            .split_whitespace()
            .skip(2)
            .map(str::to_owned)
            .collect();
        if column_labels.is_empty() {
            return Err(FormatError::NoColumns);
        }

        let mut rows = Vec::with_capacity(lines.len() - FIRST_ROW_LINE);
        for (offset, raw) in lines[FIRST_ROW_LINE..].iter().enumerate() {
            rows.push(WorkloadRow::parse(raw, FIRST_ROW_LINE + offset + 1)?);
        }

        debug!(
            title = %title,
            columns = column_labels.len(),
            rows = rows.len(),
            "parsed report"
        );
        Ok(Report {
            title,
            reference_value,
            column_labels,
            rows,
        })
    }

    /// One subplot per workload row.
    pub fn num_subplots(&self) -> usize {
        self.rows.len()
    }

    /// Index of the baseline ("no control") column, if the header has one.
    pub fn baseline_index(&self) -> Option<usize> {
        self.column_labels.iter().position(|l| l == BASELINE_LABEL)
    }
}

impl WorkloadRow {
    fn parse(raw: &str, line: usize) -> Result<Self, FormatError> {
        let mut tokens = raw.split_whitespace();
        let name = tokens
            .next()
            .ok_or(FormatError::EmptyRow { line })?
            .to_owned();
        let raw_numbers = tokens
            .map(|token| {
                token.parse::<f64>().map_err(|_| FormatError::BadNumber {
                    row: name.clone(),
                    line,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(WorkloadRow {
            name,
            raw_numbers,
            line,
        })
    }

    /// Workload name with underscores rendered as spaces.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }

    /// (target, interferers): target is the substring before the first
    /// `" vs"`, interferers the substring after the last `"vs "`. A name
    /// without a `vs` token yields the full display name for both halves.
    pub fn split_names(&self) -> (String, String) {
        let display = self.display_name();
        let target = match display.find(" vs") {
            Some(at) => display[..at].to_owned(),
            None => display.clone(),
        };
        let interferers = match display.rfind("vs ") {
            Some(at) => display[at + 3..].to_owned(),
            None => display.clone(),
        };
        (target, interferers)
    }
}

/// Column label with the first `-` turned into a line break for two-line
/// tick rendering. Presentation only; baseline matching uses the canonical
/// label.
pub fn display_label(label: &str) -> String {
    label.replacen('-', "\n", 1)
}

fn parse_reference(line: &str) -> Option<f64> {
    let token = line.split_whitespace().last()?;
    if numeric_looking(token) {
        token.parse().ok()
    } else {
        None
    }
}

/// A plain non-negative decimal: digits with at most one dot.
fn numeric_looking(token: &str) -> bool {
    let digits = token.replacen('.', "", 1);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rows: &[&str]) -> String {
        let mut text = String::from(
            "# Throughput comparison\n\
             #\n\
             #\n\
             #\n\
             # Min throughput to guarantee to the target: 5.0\n\
             #\n\
             #\n\
             # workload iteration bfq-bfq none-none\n",
        );
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn parses_fixed_layout() {
        let text = sample(&["db_vs_grep 10 1 20 2", "db_vs_seqread 5 0.5 6 0.6"]);
        let report = Report::parse(&text).unwrap();
        assert_eq!(report.title, "Throughput comparison");
        assert_eq!(report.reference_value, Some(5.0));
        assert_eq!(report.column_labels, ["bfq-bfq", "none-none"]);
        assert_eq!(report.num_subplots(), 2);
        assert_eq!(report.num_subplots(), text.lines().count() - 8);
        assert_eq!(report.rows[0].raw_numbers, [10.0, 1.0, 20.0, 2.0]);
        assert_eq!(report.rows[1].line, 10);
    }

    #[test]
    fn non_numeric_reference_token_is_dropped() {
        let text = sample(&["db_vs_grep 10 1 20 2"])
            .replacen("5.0", "unset", 1);
        let report = Report::parse(&text).unwrap();
        assert_eq!(report.reference_value, None);
    }

    #[test]
    fn reference_accepts_at_most_one_dot() {
        assert!(numeric_looking("5.0"));
        assert!(numeric_looking("42"));
        assert!(!numeric_looking("1.2.3"));
        assert!(!numeric_looking("."));
        assert!(!numeric_looking("-3"));
    }

    #[test]
    fn short_report_is_rejected() {
        let err = Report::parse("# title\n\n\n\n\n\n\n\n").unwrap_err();
        assert!(matches!(err, FormatError::TooShort { got: 8 }));
    }

    #[test]
    fn header_without_columns_is_rejected() {
        let text = sample(&["db_vs_grep 10 1"])
            .replacen("# workload iteration bfq-bfq none-none", "# workload", 1);
        assert!(matches!(
            Report::parse(&text).unwrap_err(),
            FormatError::NoColumns
        ));
    }

    #[test]
    fn malformed_number_names_row_and_line() {
        let text = sample(&["db_vs_grep 10 oops 20 2"]);
        match Report::parse(&text).unwrap_err() {
            FormatError::BadNumber { row, line, token } => {
                assert_eq!(row, "db_vs_grep");
                assert_eq!(line, 9);
                assert_eq!(token, "oops");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn baseline_column_is_found_by_canonical_label() {
        let text = sample(&["db_vs_grep 10 1 20 2"]);
        let report = Report::parse(&text).unwrap();
        assert_eq!(report.baseline_index(), Some(1));
    }

    #[test]
    fn display_label_wraps_first_dash_only() {
        assert_eq!(display_label("bfq-mq"), "bfq\nmq");
        assert_eq!(display_label("prop-mq-deadline"), "prop\nmq-deadline");
        assert_eq!(display_label("noop"), "noop");
    }

    #[test]
    fn workload_name_splits_on_vs() {
        let row = WorkloadRow {
            name: "db_vs_grep".to_owned(),
            raw_numbers: vec![],
            line: 9,
        };
        assert_eq!(row.split_names(), ("db".to_owned(), "grep".to_owned()));
    }

    #[test]
    fn workload_name_without_vs_duplicates_full_name() {
        // Known quirk of the format, preserved: both halves fall back to the
        // space-substituted name.
        let row = WorkloadRow {
            name: "plain_workload".to_owned(),
            raw_numbers: vec![],
            line: 9,
        };
        assert_eq!(
            row.split_names(),
            ("plain workload".to_owned(), "plain workload".to_owned())
        );
    }

    #[test]
    fn interferers_split_uses_last_vs_occurrence() {
        let row = WorkloadRow {
            name: "db_vs_grep_vs_seqread".to_owned(),
            raw_numbers: vec![],
            line: 9,
        };
        let (target, interferers) = row.split_names();
        assert_eq!(target, "db");
        assert_eq!(interferers, "seqread");
    }
}
