use rayon::prelude::*;

use crate::error::{CorrError, Result};
use crate::mask::NameMask;
use crate::matrix::CorrelationMatrix;
use crate::partition::WorkRange;
use crate::retention::{RetentionRecord, SharedRetention};
use crate::threshold::Threshold;

/// A qualifying pair of variable indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub x: usize,
    pub y: usize,
}

pub(crate) fn check_mask(mask: Option<&NameMask>, variable_count: usize) -> Result<()> {
    match mask {
        Some(m) if m.len() != variable_count => Err(CorrError::dimension_mismatch(
            "name mask length",
            variable_count,
            m.len(),
        )),
        _ => Ok(()),
    }
}

/// Partners of `x` inside the interval.
///
/// Without a mask only `y > x` is visited, so each unordered pair is seen
/// once. With a mask, `x` must match and every `y != x` is visited.
pub fn qualifying_pairs(
    matrix: &CorrelationMatrix,
    threshold: &Threshold,
    mask: Option<&NameMask>,
    x: usize,
) -> Vec<Discovery> {
    let n = matrix.dim();
    let row = matrix.row(x);
    match mask {
        None => (x + 1..n)
            .filter(|&y| threshold.contains(row[y]))
            .map(|y| Discovery { x, y })
            .collect(),
        Some(mask) if mask.is_match(x) => (0..n)
            .filter(|&y| y != x && threshold.contains(row[y]))
            .map(|y| Discovery { x, y })
            .collect(),
        Some(_) => Vec::new(),
    }
}

/// Scans the rows in `range` in parallel, marking `record` for every
/// qualifying pair, and returns the pairs in row-major order.
pub fn scan_range(
    matrix: &CorrelationMatrix,
    threshold: &Threshold,
    mask: Option<&NameMask>,
    range: WorkRange,
    record: &SharedRetention,
) -> Vec<Discovery> {
    let per_row: Vec<Vec<Discovery>> = range
        .indices()
        .into_par_iter()
        .map(|x| {
            let found = qualifying_pairs(matrix, threshold, mask, x);
            for d in &found {
                record.mark_pair(d.x, d.y);
            }
            found
        })
        .collect();
    per_row.into_iter().flatten().collect()
}

/// Decides retention for the whole matrix in one process.
pub fn reduce(
    matrix: &CorrelationMatrix,
    threshold: &Threshold,
    mask: Option<&NameMask>,
) -> Result<RetentionRecord> {
    let n = matrix.dim();
    check_mask(mask, n)?;

    let record = SharedRetention::new(n);
    let all = WorkRange { start: 0, finish: n };
    let found = scan_range(matrix, threshold, mask, all, &record);
    tracing::debug!(pairs = found.len(), "reduction scan finished");
    Ok(record.into_inner())
}
