//! Current-law parameter defaults
//!
//! The bundled table is compiled into the crate from
//! `data/current_law_policy.json`. Callers can also supply their own table
//! as JSON text or as an already parsed `serde_json::Value`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::value::{ValueShape, YearValue};
use crate::error::{PolicyError, Result};

/// First calendar year covered by the bundled defaults
pub const JSON_START_YEAR: i32 = 2013;

const BUNDLED_DEFAULTS: &str = include_str!("../../data/current_law_policy.json");

/// One parameter entry of the defaults table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(default)]
    pub long_name: String,

    #[serde(default)]
    pub description: String,

    /// Year of `value[0]`; the table's start year when absent
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Column labels for row-valued parameters
    #[serde(default)]
    pub col_label: Vec<String>,

    /// Whether values are indexed forward by default
    #[serde(default)]
    pub cpi_inflated: bool,

    /// Index with wage growth instead of price inflation
    #[serde(default)]
    pub wage_indexed: bool,

    /// Known values, one per consecutive year
    pub value: Vec<YearValue>,
}

impl ParameterSpec {
    pub fn shape(&self) -> Option<ValueShape> {
        self.value.first().map(YearValue::shape)
    }

    pub fn first_year(&self) -> i32 {
        self.start_year.unwrap_or(JSON_START_YEAR)
    }
}

/// Defaults table keyed by parameter name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterDefaults {
    params: BTreeMap<String, ParameterSpec>,
}

impl ParameterDefaults {
    /// Table compiled into the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DEFAULTS)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let defaults: Self = serde_json::from_str(text)
            .map_err(|e| PolicyError::Defaults(e.to_string()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let defaults: Self = serde_json::from_value(value)
            .map_err(|e| PolicyError::Defaults(e.to_string()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Read a defaults table from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterSpec)> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Earliest year any parameter has a known value for
    pub fn earliest_year(&self) -> Option<i32> {
        self.params.values().map(ParameterSpec::first_year).min()
    }

    fn validate(&self) -> Result<()> {
        for (name, spec) in &self.params {
            if name.ends_with("_cpi") {
                return Err(PolicyError::Defaults(format!(
                    "{} collides with the _cpi indexing flag suffix",
                    name
                )));
            }
            let Some(shape) = spec.shape() else {
                return Err(PolicyError::Defaults(format!("{} has no values", name)));
            };
            if shape == ValueShape::Row(0) {
                return Err(PolicyError::Defaults(format!("{} has empty rows", name)));
            }
            if let Some(bad) = spec.value.iter().find(|v| v.shape() != shape) {
                return Err(PolicyError::Defaults(format!(
                    "{} mixes value shapes {:?} and {:?}",
                    name,
                    shape,
                    bad.shape()
                )));
            }
            if let ValueShape::Row(cols) = shape {
                if !spec.col_label.is_empty() && spec.col_label.len() != cols {
                    return Err(PolicyError::Defaults(format!(
                        "{} has {} column labels for {} columns",
                        name,
                        spec.col_label.len(),
                        cols
                    )));
                }
            }
        }
        Ok(())
    }
}
