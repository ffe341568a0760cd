//! Conversion between parameter-keyed and year-keyed reforms

use serde_json::Value;

use super::descriptor::{ParameterKeyedReform, YearKeyedReform};
use crate::error::Result;

/// `{param -> {year -> value}}` into `{year -> {param -> value}}`
pub fn to_year_keyed(reform: &ParameterKeyedReform) -> YearKeyedReform {
    let mut out = YearKeyedReform::new();
    for (param, years) in reform.iter() {
        for (year, value) in years {
            out.insert(*year, param.clone(), value.clone());
        }
    }
    out
}

/// `{year -> {param -> value}}` into `{param -> {year -> value}}`
pub fn to_parameter_keyed(reform: &YearKeyedReform) -> ParameterKeyedReform {
    let mut out = ParameterKeyedReform::new();
    for (year, mods) in reform.iter() {
        for (param, value) in mods {
            out.insert(param.clone(), year, value.clone());
        }
    }
    out
}

/// Parse untyped parameter-keyed JSON straight into the year-keyed form
pub fn normalize_value(value: &Value) -> Result<YearKeyedReform> {
    ParameterKeyedReform::from_value(value).map(|reform| to_year_keyed(&reform))
}
