// src/data_analysis/derivative.rs

use crate::error::{ensure_same_len, ReductionError, ReductionResult};

/// Numerical derivative dy/dx of a tabulated function on a non-uniform grid.
/// Second-order central differences inside, first-order one-sided differences
/// at both ends. `x` must be strictly monotonic.
pub fn gradient(x: &[f64], y: &[f64]) -> ReductionResult<Vec<f64>> {
    ensure_same_len("gradient", x.len(), y.len())?;
    if x.len() < 2 {
        return Err(ReductionError::shape(format!(
            "gradient needs at least 2 points, got {}",
            x.len()
        )));
    }
    if x.windows(2).any(|w| w[1] == w[0]) {
        return Err(ReductionError::not_monotonic(
            "gradient grid has repeated abscissae",
        ));
    }

    let n = x.len();
    let mut derivative = Vec::with_capacity(n);

    // Forward difference for first point
    derivative.push((y[1] - y[0]) / (x[1] - x[0]));

    for i in 1..n - 1 {
        let h_prev = x[i] - x[i - 1];
        let h_next = x[i + 1] - x[i];
        let a = -h_next / (h_prev * (h_prev + h_next));
        let b = (h_next - h_prev) / (h_prev * h_next);
        let c = h_prev / (h_next * (h_prev + h_next));
        derivative.push(a * y[i - 1] + b * y[i] + c * y[i + 1]);
    }

    // Backward difference for last point
    derivative.push((y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]));

    Ok(derivative)
}
