//! Turns a workload row's interleaved number pairs into the per-subplot
//! matrix the layout stage consumes.

use itertools::Itertools;

use crate::error::FormatError;
use crate::report::WorkloadRow;

/// Per-subplot numeric matrix: one (value, second) column per rendered bar.
///
/// `seconds` holds error amplitudes in grouped mode and the second stacking
/// layer in stacked mode; the builder does not care which.
#[derive(Debug, Clone, PartialEq)]
pub struct BarMatrix {
    pub values: Vec<f64>,
    pub seconds: Vec<f64>,
    /// Sum of the baseline column's pair, captured before that column was
    /// removed. `None` when the header has no baseline column.
    pub reachable_threshold: Option<f64>,
}

impl BarMatrix {
    /// Deinterleaves `row.raw_numbers` and, when a baseline column index is
    /// given, drops that column from both sequences after recording its pair
    /// sum. Baseline values differ per row even though the index is global.
    pub fn build(
        row: &WorkloadRow,
        columns: usize,
        baseline: Option<usize>,
    ) -> Result<Self, FormatError> {
        if row.raw_numbers.len() != 2 * columns {
            return Err(FormatError::RowShape {
                row: row.name.clone(),
                line: row.line,
                expected: 2 * columns,
                got: row.raw_numbers.len(),
                columns,
            });
        }

        let (mut values, mut seconds): (Vec<f64>, Vec<f64>) = row
            .raw_numbers
            .iter()
            .copied()
            .tuples::<(f64, f64)>()
            .unzip();

        let reachable_threshold = baseline.map(|idx| {
            let threshold = values[idx] + seconds[idx];
            values.remove(idx);
            seconds.remove(idx);
            threshold
        });

        Ok(BarMatrix {
            values,
            seconds,
            reachable_threshold,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tallest column: value plus error amplitude in grouped mode, layer sum
    /// in stacked mode. Either way the pair sum.
    pub fn column_max(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.seconds)
            .map(|(value, second)| value + second)
            .fold(0.0, f64::max)
    }
}

/// Chart-wide maximum, reduced over every row's raw pairs before any baseline
/// column is dropped. Label offsets scale from this so they sit at the same
/// visual distance on every subplot.
pub fn global_max(rows: &[WorkloadRow]) -> f64 {
    rows.iter()
        .flat_map(|row| row.raw_numbers.iter().copied().tuples::<(f64, f64)>())
        .map(|(value, second)| value + second)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(numbers: &[f64]) -> WorkloadRow {
        WorkloadRow {
            name: "db_vs_grep".to_owned(),
            raw_numbers: numbers.to_vec(),
            line: 9,
        }
    }

    #[test]
    fn deinterleave_inverts_interleaving() {
        let seq = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let matrix = BarMatrix::build(&row(&seq), 4, None).unwrap();
        assert_eq!(matrix.values, [1.0, 3.0, 5.0, 7.0]);
        assert_eq!(matrix.seconds, [2.0, 4.0, 6.0, 8.0]);

        let rebuilt: Vec<f64> = matrix
            .values
            .iter()
            .zip(&matrix.seconds)
            .flat_map(|(&v, &s)| [v, s])
            .collect();
        assert_eq!(rebuilt, seq);
    }

    #[test]
    fn baseline_column_becomes_threshold() {
        let matrix = BarMatrix::build(&row(&[10.0, 1.0, 3.0, 4.0, 20.0, 2.0]), 3, Some(1)).unwrap();
        assert_eq!(matrix.values, [10.0, 20.0]);
        assert_eq!(matrix.seconds, [1.0, 2.0]);
        assert_eq!(matrix.reachable_threshold, Some(7.0));
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn threshold_is_per_row() {
        let a = BarMatrix::build(&row(&[1.0, 1.0, 2.0, 3.0]), 2, Some(1)).unwrap();
        let b = BarMatrix::build(&row(&[1.0, 1.0, 7.0, 8.0]), 2, Some(1)).unwrap();
        assert_eq!(a.reachable_threshold, Some(5.0));
        assert_eq!(b.reachable_threshold, Some(15.0));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = BarMatrix::build(&row(&[1.0, 2.0, 3.0]), 2, None).unwrap_err();
        match err {
            FormatError::RowShape {
                expected,
                got,
                columns,
                line,
                ..
            } => {
                assert_eq!(expected, 4);
                assert_eq!(got, 3);
                assert_eq!(columns, 2);
                assert_eq!(line, 9);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn column_max_takes_pair_sums() {
        let matrix = BarMatrix::build(&row(&[10.0, 1.0, 8.0, 4.0]), 2, None).unwrap();
        assert_eq!(matrix.column_max(), 12.0);
    }

    #[test]
    fn global_max_runs_before_baseline_removal() {
        // The baseline column holds the tallest pair; the pre-pass still
        // counts it, matching the measure-then-place structure.
        let rows = [row(&[1.0, 1.0, 30.0, 5.0]), row(&[2.0, 2.0, 3.0, 3.0])];
        assert_eq!(global_max(&rows), 35.0);
    }
}
