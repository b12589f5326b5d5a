// src/data_analysis/interpolation.rs
//
// Calibration lookup: piecewise linear, not-a-knot cubic spline and
// monotone cubic Hermite interpolation over a strictly monotonic table.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data_input::measurement::CalibrationTable;
use crate::error::{ReductionError, ReductionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    Linear,
    /// C2 cubic spline with not-a-knot end conditions.
    CubicSpline,
    /// Fritsch-Carlson cubic Hermite (PCHIP); preserves monotonicity.
    MonotoneCubic,
}

impl InterpolationKind {
    pub fn min_points(self) -> usize {
        match self {
            InterpolationKind::Linear | InterpolationKind::MonotoneCubic => 2,
            InterpolationKind::CubicSpline => 4,
        }
    }
}

/// What to do with a query outside the table's key range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    #[default]
    Error,
    /// Extend the first/last polynomial piece.
    Extrapolate,
}

#[derive(Debug, Clone)]
enum Coefficients {
    Linear,
    /// Second derivatives at the knots.
    Spline(Vec<f64>),
    /// First derivatives at the knots.
    Hermite(Vec<f64>),
}

/// Interpolant built once from a calibration table.
#[derive(Debug, Clone)]
pub struct Interpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    kind: InterpolationKind,
    extrapolation: Extrapolation,
    coefficients: Coefficients,
}

impl Interpolator {
    pub fn new(
        table: &CalibrationTable,
        kind: InterpolationKind,
        extrapolation: Extrapolation,
    ) -> ReductionResult<Self> {
        if table.len() < kind.min_points() {
            return Err(ReductionError::shape(format!(
                "{:?} interpolation needs at least {} points, got {}",
                kind,
                kind.min_points(),
                table.len()
            )));
        }
        let (xs, ys) = table.ascending();
        let coefficients = match kind {
            InterpolationKind::Linear => Coefficients::Linear,
            InterpolationKind::CubicSpline => Coefficients::Spline(not_a_knot_moments(&xs, &ys)?),
            InterpolationKind::MonotoneCubic => Coefficients::Hermite(pchip_slopes(&xs, &ys)),
        };
        Ok(Self {
            xs,
            ys,
            kind,
            extrapolation,
            coefficients,
        })
    }

    /// Convenience constructor from (key, value) rows.
    pub fn from_pairs(
        rows: &[(f64, f64)],
        kind: InterpolationKind,
        extrapolation: Extrapolation,
    ) -> ReductionResult<Self> {
        Self::new(&CalibrationTable::from_pairs(rows)?, kind, extrapolation)
    }

    pub fn kind(&self) -> InterpolationKind {
        self.kind
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn evaluate(&self, x: f64) -> ReductionResult<f64> {
        let i = self.segment(x)?;
        Ok(self.value_on_segment(i, x))
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> ReductionResult<Vec<f64>> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Analytic derivative of the piecewise polynomial at `x`.
    pub fn derivative(&self, x: f64) -> ReductionResult<f64> {
        let i = self.segment(x)?;
        Ok(self.slope_on_segment(i, x))
    }

    /// `n` evenly spaced points over the table domain, for plotting.
    pub fn sample_curve(&self, n: usize) -> ReductionResult<Vec<(f64, f64)>> {
        let (lo, hi) = self.domain();
        if n < 2 {
            return Ok(vec![(lo, self.evaluate(lo)?)]);
        }
        Array1::linspace(lo, hi, n)
            .iter()
            .map(|&x| self.evaluate(x.clamp(lo, hi)).map(|y| (x, y)))
            .collect()
    }

    fn segment(&self, x: f64) -> ReductionResult<usize> {
        if !x.is_finite() {
            return Err(ReductionError::domain(format!(
                "interpolation query must be finite, got {x}"
            )));
        }
        let (lo, hi) = self.domain();
        if (x < lo || x > hi) && self.extrapolation == Extrapolation::Error {
            return Err(ReductionError::range(format!(
                "query {x} outside calibration domain [{lo}, {hi}]"
            )));
        }
        let last_segment = self.xs.len() - 2;
        let upper = self.xs.partition_point(|&k| k <= x);
        Ok(upper.saturating_sub(1).min(last_segment))
    }

    fn value_on_segment(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let h = x1 - x0;
        match &self.coefficients {
            Coefficients::Linear => y0 + (y1 - y0) * (x - x0) / h,
            Coefficients::Spline(m) => {
                let a = x1 - x;
                let b = x - x0;
                m[i] * a.powi(3) / (6.0 * h)
                    + m[i + 1] * b.powi(3) / (6.0 * h)
                    + (y0 / h - m[i] * h / 6.0) * a
                    + (y1 / h - m[i + 1] * h / 6.0) * b
            }
            Coefficients::Hermite(d) => {
                let t = (x - x0) / h;
                let t2 = t * t;
                let t3 = t2 * t;
                let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
                let h10 = t3 - 2.0 * t2 + t;
                let h01 = -2.0 * t3 + 3.0 * t2;
                let h11 = t3 - t2;
                h00 * y0 + h10 * h * d[i] + h01 * y1 + h11 * h * d[i + 1]
            }
        }
    }

    fn slope_on_segment(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let h = x1 - x0;
        match &self.coefficients {
            Coefficients::Linear => (y1 - y0) / h,
            Coefficients::Spline(m) => {
                let a = x1 - x;
                let b = x - x0;
                -m[i] * a * a / (2.0 * h) + m[i + 1] * b * b / (2.0 * h) + (y1 - y0) / h
                    - (m[i + 1] - m[i]) * h / 6.0
            }
            Coefficients::Hermite(d) => {
                let t = (x - x0) / h;
                let t2 = t * t;
                let dh00 = (6.0 * t2 - 6.0 * t) / h;
                let dh10 = 3.0 * t2 - 4.0 * t + 1.0;
                let dh01 = (-6.0 * t2 + 6.0 * t) / h;
                let dh11 = 3.0 * t2 - 2.0 * t;
                dh00 * y0 + dh10 * d[i] + dh01 * y1 + dh11 * d[i + 1]
            }
        }
    }
}

/// Second derivatives of the not-a-knot spline through (xs, ys).
/// The first and last rows enforce a continuous third derivative at the
/// second and penultimate knots.
fn not_a_knot_moments(xs: &[f64], ys: &[f64]) -> ReductionResult<Vec<f64>> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let mut a = Array2::<f64>::zeros((n, n));
    let mut rhs = Array1::<f64>::zeros(n);

    a[[0, 0]] = h[1];
    a[[0, 1]] = -(h[0] + h[1]);
    a[[0, 2]] = h[0];

    for i in 1..n - 1 {
        a[[i, i - 1]] = h[i - 1];
        a[[i, i]] = 2.0 * (h[i - 1] + h[i]);
        a[[i, i + 1]] = h[i];
        rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    a[[n - 1, n - 3]] = h[n - 2];
    a[[n - 1, n - 2]] = -(h[n - 3] + h[n - 2]);
    a[[n - 1, n - 1]] = h[n - 3];

    solve_dense(a, rhs).map(|m| m.to_vec())
}

/// Gaussian elimination with partial pivoting. Tables hold a few dozen rows.
fn solve_dense(mut a: Array2<f64>, mut b: Array1<f64>) -> ReductionResult<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| a[[r1, col]].abs().total_cmp(&a[[r2, col]].abs()))
            .unwrap_or(col);
        let scale = a.column(col).iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if a[[pivot_row, col]].abs() <= f64::EPSILON * scale.max(1.0) {
            return Err(ReductionError::shape("spline system is singular"));
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap([col, k], [pivot_row, k]);
            }
            b.swap(col, pivot_row);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

/// Knot slopes of the Fritsch-Carlson monotone cubic.
fn pchip_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    if n == 2 {
        return vec![delta[0], delta[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] <= 0.0 {
            d[k] = 0.0;
        } else {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }
    d[0] = pchip_end_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = pchip_end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

fn pchip_end_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}
