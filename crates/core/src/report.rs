use std::fmt::Write;

use crate::matrix::CorrelationMatrix;

const CORNER: &str = "[------]";

/// Text grid of the matrix with variable names as row and column headers.
pub fn render_matrix<S: AsRef<str>>(matrix: &CorrelationMatrix, names: &[S]) -> String {
    let mut out = String::new();

    out.push_str(CORNER);
    for name in names {
        let _ = write!(out, ", {}", name.as_ref());
    }
    out.push('\n');

    for (x, name) in names.iter().enumerate().take(matrix.dim()) {
        out.push_str(name.as_ref());
        for &value in matrix.row(x).iter() {
            let _ = write!(out, ", {:.6}", value);
        }
        out.push('\n');
    }
    out
}
