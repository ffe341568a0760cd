//! Leaf values of a reform

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{json_kind, PolicyError, Result};

/// Dense numeric array with a fixed rectangular shape
#[derive(Debug, Clone, PartialEq)]
pub struct NumArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumArray {
    /// One-dimensional array
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> std::result::Result<Self, String> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(format!("ragged rows of length {} and {}", cols, bad.len()));
        }
        Ok(Self {
            shape: vec![rows.len(), cols],
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Convert a nested JSON list, rejecting ragged or non-numeric input
    pub fn from_json(value: &Value) -> std::result::Result<Self, String> {
        let mut shape = Vec::new();
        let mut node = value;
        while let Value::Array(items) = node {
            shape.push(items.len());
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }

        let mut data = Vec::with_capacity(shape.iter().product());
        collect_numbers(value, &shape, &mut data)?;
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Rows of a two-dimensional array
    pub fn rows(&self) -> Option<impl Iterator<Item = &[f64]>> {
        match self.shape.as_slice() {
            [_, cols] if *cols > 0 => Some(self.data.chunks(*cols)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        build_json(&self.shape, &self.data)
    }
}

fn collect_numbers(value: &Value, shape: &[usize], out: &mut Vec<f64>) -> std::result::Result<(), String> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(format!(
                    "ragged nested list: expected {} entries, found {}",
                    len,
                    items.len()
                ));
            }
            items.iter().try_for_each(|item| collect_numbers(item, rest, out))
        }
        (Value::Number(n), None) => {
            let v = n.as_f64().ok_or_else(|| format!("{} is not representable as f64", n))?;
            out.push(v);
            Ok(())
        }
        (Value::Array(_), None) => Err("ragged nested list: unexpected extra nesting".to_string()),
        (Value::Number(_), Some(_)) => Err("ragged nested list: number where a list was expected".to_string()),
        (other, _) => Err(format!("array element {} is a {}, not a number", other, json_kind(other))),
    }
}

fn build_json(shape: &[usize], data: &[f64]) -> Value {
    match shape.split_first() {
        None => data.first().map_or(Value::Null, |v| Value::from(*v)),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            let items = (0..len)
                .map(|i| build_json(rest, &data[i * stride..(i + 1) * stride]))
                .collect();
            Value::Array(items)
        }
    }
}

/// A single override value for one parameter in one year
#[derive(Debug, Clone, PartialEq)]
pub enum ReformValue {
    /// Companion `_cpi` indexing switch
    Flag(bool),
    Number(f64),
    Array(NumArray),
}

impl ReformValue {
    /// Convert a JSON leaf. Lists become fixed-shape arrays; strings, nulls
    /// and objects are rejected.
    pub fn from_json(name: &str, year: i32, value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(ReformValue::Flag(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(ReformValue::Number)
                .ok_or_else(|| PolicyError::invalid_value(name, year, format!("{} is not a finite number", n))),
            Value::Array(_) => NumArray::from_json(value)
                .map(ReformValue::Array)
                .map_err(|msg| PolicyError::invalid_value(name, year, msg)),
            other => Err(PolicyError::invalid_value(
                name,
                year,
                format!("expected a number, list or boolean, found {}", json_kind(other)),
            )),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ReformValue::Flag(b) => Value::Bool(*b),
            ReformValue::Number(v) => Value::from(*v),
            ReformValue::Array(arr) => arr.to_json(),
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ReformValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for ReformValue {
    fn from(v: f64) -> Self {
        ReformValue::Number(v)
    }
}

impl From<bool> for ReformValue {
    fn from(b: bool) -> Self {
        ReformValue::Flag(b)
    }
}

impl From<Vec<f64>> for ReformValue {
    fn from(v: Vec<f64>) -> Self {
        ReformValue::Array(NumArray::from_vec(v))
    }
}

impl Serialize for ReformValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
