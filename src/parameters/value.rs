//! Per-year parameter values

use serde::{Deserialize, Serialize};

/// Values at or above this are treated as "unlimited" and never indexed
pub const UNLIMITED: f64 = 9e99;

/// Shape shared by every year of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueShape {
    /// One number per year
    Scalar,
    /// Fixed number of columns per year (e.g. one per filing status)
    Row(usize),
}

/// A parameter's value in a single year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Scalar(f64),
    Row(Vec<f64>),
}

impl YearValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            YearValue::Scalar(_) => ValueShape::Scalar,
            YearValue::Row(cols) => ValueShape::Row(cols.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            YearValue::Scalar(v) => Some(*v),
            YearValue::Row(_) => None,
        }
    }

    /// Columns of the value; a scalar is a one-column row
    pub fn columns(&self) -> &[f64] {
        match self {
            YearValue::Scalar(v) => std::slice::from_ref(v),
            YearValue::Row(cols) => cols,
        }
    }

    /// Next year's value under the given indexing rate
    pub fn indexed(&self, rate: Option<f64>) -> YearValue {
        match self {
            YearValue::Scalar(v) => YearValue::Scalar(index_amount(*v, rate)),
            YearValue::Row(cols) => {
                YearValue::Row(cols.iter().map(|v| index_amount(*v, rate)).collect())
            }
        }
    }
}

/// Grow one amount by `rate`, rounded to cents; `None` carries it forward
fn index_amount(value: f64, rate: Option<f64>) -> f64 {
    match rate {
        Some(_) if value >= UNLIMITED => UNLIMITED,
        Some(r) => (value * (1.0 + r) * 100.0).round() / 100.0,
        None => value,
    }
}

/// Fill `num_years` values from `known`, extrapolating past the end.
///
/// `rates[i]` grows year `i` into year `i + 1`; a `None` entry (or a missing
/// one) carries the previous value forward unchanged.
pub fn expand(known: &[YearValue], rates: &[Option<f64>], num_years: usize) -> Vec<YearValue> {
    let mut out: Vec<YearValue> = known.iter().take(num_years).cloned().collect();
    while out.len() < num_years {
        let Some(prev) = out.last() else { break };
        let rate = rates.get(out.len() - 1).copied().flatten();
        let next = prev.indexed(rate);
        out.push(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_expand_indexed_scalar() {
        let out = expand(&[YearValue::Scalar(1000.0)], &[Some(0.02), Some(0.03), Some(0.04)], 3);
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[1].as_scalar().unwrap(), 1020.0);
        assert_relative_eq!(out[2].as_scalar().unwrap(), 1050.6);
    }

    #[test]
    fn test_expand_rounds_to_cents() {
        let out = expand(&[YearValue::Scalar(1000.0)], &[Some(0.001234)], 2);
        assert_relative_eq!(out[1].as_scalar().unwrap(), 1001.23);
    }

    #[test]
    fn test_expand_unindexed_row() {
        let row = YearValue::Row(vec![487.0, 3250.0]);
        let out = expand(&[row.clone()], &[], 4);
        assert!(out.iter().all(|v| *v == row));
    }

    #[test]
    fn test_expand_keeps_known_years_and_truncates() {
        let known = vec![
            YearValue::Scalar(1.0),
            YearValue::Scalar(2.0),
            YearValue::Scalar(3.0),
        ];
        assert_eq!(expand(&known, &[Some(0.5), Some(0.5)], 2), known[..2].to_vec());
    }

    #[test]
    fn test_unlimited_never_grows() {
        let out = expand(&[YearValue::Row(vec![UNLIMITED, 100.0])], &[Some(0.1)], 2);
        assert_eq!(out[1], YearValue::Row(vec![UNLIMITED, 110.0]));
    }

    #[test]
    fn test_expand_switches_indexing_by_year() {
        let out = expand(&[YearValue::Scalar(100.0)], &[Some(0.1), None, Some(0.1)], 4);
        let values: Vec<f64> = out.iter().filter_map(YearValue::as_scalar).collect();
        assert_eq!(values, vec![100.0, 110.0, 110.0, 121.0]);
    }
}
