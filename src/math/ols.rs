//! Least-squares trend estimation.
//!
//! The trend signal is the slope of
//!
//! ```text
//! minimize Σ (price_i - (β0 + β1 · i))^2,   i = 0..n-1
//! ```
//!
//! over a short trailing window. The system is tiny (n × 2), so we solve it via
//! SVD for robustness against degenerate windows.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// OLS slope of `values` against a 0-based index (units per step).
///
/// Fewer than two values, or an unsolvable system, yield a flat trend.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mut design = Vec::with_capacity(n * 2);
    for i in 0..n {
        design.push(1.0);
        design.push(i as f64);
    }
    let x = DMatrix::from_row_slice(n, 2, &design);
    let y = DVector::from_row_slice(values);

    solve_least_squares(&x, &y).map(|beta| beta[1]).unwrap_or(0.0)
}
