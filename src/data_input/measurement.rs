// src/data_input/measurement.rs

use serde::{Deserialize, Serialize};

use crate::error::{ensure_same_len, ReductionError, ReductionResult};

/// Ordered (independent, dependent) pairs recorded during a session.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    pub x_label: String,
    pub y_label: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl MeasurementSeries {
    pub fn new(
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> ReductionResult<Self> {
        let x_label = x_label.into();
        let y_label = y_label.into();
        ensure_same_len(&format!("series {y_label} vs {x_label}"), x.len(), y.len())?;
        Ok(Self {
            x_label,
            y_label,
            x,
            y,
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Direction of a strictly monotonic key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    Increasing,
    Decreasing,
}

/// Reference table mapping an instrument reading to a physical quantity,
/// e.g. thermistor resistance to temperature. Keys are strictly monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    keys: Vec<f64>,
    values: Vec<f64>,
    order: KeyOrder,
}

impl CalibrationTable {
    pub fn new(keys: Vec<f64>, values: Vec<f64>) -> ReductionResult<Self> {
        ensure_same_len("calibration table", keys.len(), values.len())?;
        if keys.len() < 2 {
            return Err(ReductionError::shape(format!(
                "calibration table needs at least 2 rows, got {}",
                keys.len()
            )));
        }
        if let Some(bad) = keys.iter().chain(values.iter()).find(|v| !v.is_finite()) {
            return Err(ReductionError::shape(format!(
                "calibration table contains a non-finite entry ({bad})"
            )));
        }
        let order = key_order(&keys)?;
        Ok(Self {
            keys,
            values,
            order,
        })
    }

    /// Builds a table from (key, value) rows.
    pub fn from_pairs(rows: &[(f64, f64)]) -> ReductionResult<Self> {
        let (keys, values) = rows.iter().copied().unzip();
        Self::new(keys, values)
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Smallest and largest key.
    pub fn domain(&self) -> (f64, f64) {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        match self.order {
            KeyOrder::Increasing => (first, last),
            KeyOrder::Decreasing => (last, first),
        }
    }

    /// Rows sorted by increasing key.
    pub fn ascending(&self) -> (Vec<f64>, Vec<f64>) {
        match self.order {
            KeyOrder::Increasing => (self.keys.clone(), self.values.clone()),
            KeyOrder::Decreasing => (
                self.keys.iter().rev().copied().collect(),
                self.values.iter().rev().copied().collect(),
            ),
        }
    }
}

fn key_order(keys: &[f64]) -> ReductionResult<KeyOrder> {
    let order = if keys[1] > keys[0] {
        KeyOrder::Increasing
    } else if keys[1] < keys[0] {
        KeyOrder::Decreasing
    } else {
        return Err(ReductionError::not_monotonic(format!(
            "repeated key {} at rows 0 and 1",
            keys[0]
        )));
    };

    for (i, pair) in keys.windows(2).enumerate() {
        let ok = match order {
            KeyOrder::Increasing => pair[1] > pair[0],
            KeyOrder::Decreasing => pair[1] < pair[0],
        };
        if !ok {
            return Err(ReductionError::not_monotonic(format!(
                "key column is not strictly monotonic at rows {} and {} ({} -> {})",
                i,
                i + 1,
                pair[0],
                pair[1]
            )));
        }
    }
    Ok(order)
}

/// Datasheet resolution of an instrument display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub resolution: f64,
    pub unit: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, resolution: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolution,
            unit: unit.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn series_rejects_mismatched_lengths() {
        let err = MeasurementSeries::new("t", "d", vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn table_detects_decreasing_keys() {
        let table = CalibrationTable::new(vec![3.0, 2.0, 1.0], vec![10.0, 20.0, 30.0]).unwrap();
        assert_eq!(table.order(), KeyOrder::Decreasing);
        assert_eq!(table.domain(), (1.0, 3.0));
        let (keys, values) = table.ascending();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
        assert_eq!(values, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn table_rejects_non_monotonic_keys() {
        let err = CalibrationTable::new(vec![1.0, 2.0, 1.5], vec![0.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotMonotonic);

        let err = CalibrationTable::new(vec![1.0, 1.0], vec![0.0, 1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotMonotonic);
    }

    #[test]
    fn table_rejects_short_or_non_finite() {
        assert_eq!(
            CalibrationTable::new(vec![1.0], vec![1.0]).unwrap_err().kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            CalibrationTable::new(vec![1.0, f64::NAN], vec![1.0, 2.0])
                .unwrap_err()
                .kind(),
            ErrorKind::Shape
        );
    }
}
