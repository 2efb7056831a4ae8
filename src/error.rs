use thiserror::Error;

/// Failures while interpreting a benchmark report file.
///
/// There is no recovery path: a malformed report aborts the whole render
/// before anything is drawn.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("report has {got} lines, need at least 9 (fixed header block plus one workload row)")]
    TooShort { got: usize },
    #[error("header line has no scheduler columns")]
    NoColumns,
    #[error("line {line}: empty workload row")]
    EmptyRow { line: usize },
    #[error("workload '{row}' (line {line}): malformed number '{token}'")]
    BadNumber {
        row: String,
        line: usize,
        token: String,
    },
    #[error(
        "workload '{row}' (line {line}): expected {expected} numbers for {columns} columns, got {got}"
    )]
    RowShape {
        row: String,
        line: usize,
        expected: usize,
        got: usize,
        columns: usize,
    },
}
