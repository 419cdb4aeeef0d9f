use ndarray::{ArrayBase, Data, Ix1};

use crate::dataset::Dataset;

fn mean<S>(values: &ArrayBase<S, Ix1>) -> f64
where
    S: Data<Elem = f64>,
{
    let mut sum = 0.0;
    for &v in values.iter() {
        sum += v;
    }
    sum / values.len() as f64
}

fn standard_deviation<S>(values: &ArrayBase<S, Ix1>, mean: f64, denom: f64) -> f64
where
    S: Data<Elem = f64>,
{
    let mut ss = 0.0;
    for &v in values.iter() {
        let d = v - mean;
        ss += d * d;
    }
    (ss / denom).sqrt()
}

/// Sample Pearson coefficient of two equal-length sequences.
///
/// Two-pass mean/variance. A constant sequence has zero deviation and the
/// result is non-finite; callers treat that as "never correlated". Fewer than
/// two samples give NaN. Finite results are clamped to `[-1, 1]`.
pub fn pearson_pair<S1, S2>(x: &ArrayBase<S1, Ix1>, y: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    assert_eq!(
        x.len(),
        y.len(),
        "Pearson correlation requires equal sample count in both sequences"
    );
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let denom = n as f64 - 1.0;

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cov = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        cov += (a - mean_x) * (b - mean_y);
    }
    let cov = cov / denom;

    let std_x = standard_deviation(x, mean_x, denom);
    let std_y = standard_deviation(y, mean_y, denom);

    let r = cov / (std_x * std_y);
    // Rounding can push a perfect correlation a hair past +-1.
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { r }
}

/// Coefficients of variable `x` against every variable, in index order.
pub fn correlation_row(dataset: &Dataset, x: usize) -> Vec<f64> {
    let lhs = dataset.variable(x);
    (0..dataset.variable_count())
        .map(|y| pearson_pair(&lhs, &dataset.variable(y)))
        .collect()
}
