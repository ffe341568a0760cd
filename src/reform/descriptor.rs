//! Typed reform descriptors in both key orientations

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::value::ReformValue;
use crate::error::{json_kind, PolicyError, Result};

/// Overrides for a single year, keyed by parameter name
pub type ParameterMods = BTreeMap<String, ReformValue>;

/// `{param -> {year -> value}}`, the orientation reform files are written in
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterKeyedReform(BTreeMap<String, BTreeMap<i32, ReformValue>>);

/// `{year -> {param -> value}}`, the orientation reform application consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct YearKeyedReform(BTreeMap<i32, ParameterMods>);

/// A reform in either orientation
#[derive(Debug, Clone, PartialEq)]
pub enum ReformDescriptor {
    ParameterKeyed(ParameterKeyedReform),
    YearKeyed(YearKeyedReform),
}

/// Checked year-key coercion
pub(crate) fn parse_year(context: &str, key: &str) -> Result<i32> {
    key.trim()
        .parse::<i32>()
        .map_err(|_| PolicyError::key_type(context, key, "an integer calendar year"))
}

fn as_object<'a>(context: impl FnOnce() -> String, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| PolicyError::InputShape {
        context: context(),
        found: json_kind(value).to_string(),
    })
}

impl ParameterKeyedReform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untyped JSON: string parameter keys, each mapping year
    /// strings to leaf values.
    pub fn from_value(value: &Value) -> Result<Self> {
        let top = as_object(|| "reform".to_string(), value)?;
        let mut reform = Self::new();
        for (param, years) in top {
            let years = as_object(|| format!("reform parameter {}", param), years)?;
            for (key, leaf) in years {
                let year = parse_year(&format!("reform parameter {}", param), key)?;
                reform.insert(param.clone(), year, ReformValue::from_json(param, year, leaf)?);
            }
        }
        Ok(reform)
    }

    pub fn insert(&mut self, param: impl Into<String>, year: i32, value: ReformValue) -> Option<ReformValue> {
        self.0.entry(param.into()).or_default().insert(year, value)
    }

    pub fn get(&self, param: &str) -> Option<&BTreeMap<i32, ReformValue>> {
        self.0.get(param)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<i32, ReformValue>)> {
        self.0.iter()
    }

    /// Number of (param, year) overrides
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, i32, ReformValue)> for ParameterKeyedReform {
    fn from_iter<I: IntoIterator<Item = (String, i32, ReformValue)>>(iter: I) -> Self {
        let mut reform = Self::new();
        for (param, year, value) in iter {
            reform.insert(param, year, value);
        }
        reform
    }
}

impl YearKeyedReform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untyped JSON: integer-year keys (as strings), each mapping
    /// parameter names to leaf values.
    pub fn from_value(value: &Value) -> Result<Self> {
        let top = as_object(|| "reform passed to implement_reform".to_string(), value)?;
        let mut reform = Self::new();
        for (key, params) in top {
            let year = parse_year("reform", key)?;
            let params = as_object(|| format!("reform year {}", year), params)?;
            let mods = params
                .iter()
                .map(|(param, leaf)| ReformValue::from_json(param, year, leaf).map(|value| (param.clone(), value)))
                .collect::<Result<ParameterMods>>()?;
            // a year with no overrides still counts toward the reform's window
            reform.insert_year(year, mods);
        }
        Ok(reform)
    }

    pub fn insert(&mut self, year: i32, param: impl Into<String>, value: ReformValue) -> Option<ReformValue> {
        self.0.entry(year).or_default().insert(param.into(), value)
    }

    /// Add a whole year of overrides, merging with any already present
    pub fn insert_year(&mut self, year: i32, mods: ParameterMods) {
        self.0.entry(year).or_default().extend(mods);
    }

    pub fn get(&self, year: i32) -> Option<&ParameterMods> {
        self.0.get(&year)
    }

    /// Years in ascending order with their overrides
    pub fn iter(&self) -> impl Iterator<Item = (i32, &ParameterMods)> {
        self.0.iter().map(|(year, mods)| (*year, mods))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.0.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.0.keys().next_back().copied()
    }

    /// Number of (year, param) overrides
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// True only when no year is present, even an empty one
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<i32, ParameterMods>> for YearKeyedReform {
    fn from(map: BTreeMap<i32, ParameterMods>) -> Self {
        Self(map)
    }
}

impl ReformDescriptor {
    /// Detect the orientation of untyped JSON: year-keyed when every
    /// top-level key parses as a year, parameter-keyed otherwise.
    pub fn from_value(value: &Value) -> Result<Self> {
        let top = as_object(|| "reform".to_string(), value)?;
        let year_keyed = !top.is_empty() && top.keys().all(|k| parse_year("reform", k).is_ok());
        if year_keyed || top.is_empty() {
            YearKeyedReform::from_value(value).map(ReformDescriptor::YearKeyed)
        } else {
            ParameterKeyedReform::from_value(value).map(ReformDescriptor::ParameterKeyed)
        }
    }

    /// Canonical year-keyed form
    pub fn into_year_keyed(self) -> YearKeyedReform {
        match self {
            ReformDescriptor::YearKeyed(reform) => reform,
            ReformDescriptor::ParameterKeyed(reform) => super::normalize::to_year_keyed(&reform),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ReformDescriptor::YearKeyed(reform) => reform.is_empty(),
            ReformDescriptor::ParameterKeyed(reform) => reform.is_empty(),
        }
    }
}

impl From<YearKeyedReform> for ReformDescriptor {
    fn from(reform: YearKeyedReform) -> Self {
        ReformDescriptor::YearKeyed(reform)
    }
}

impl From<ParameterKeyedReform> for ReformDescriptor {
    fn from(reform: ParameterKeyedReform) -> Self {
        ReformDescriptor::ParameterKeyed(reform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_keyed_from_value() {
        let reform = YearKeyedReform::from_value(&json!({
            "2016": {"_II_em": [7000], "_SS_Earnings_c": [300000]},
            "2015": {"_AMT_thd_MarriedS": [60000]}
        }))
        .unwrap();
        assert_eq!(reform.years().collect::<Vec<_>>(), vec![2015, 2016]);
        assert_eq!(reform.len(), 3);
        assert_eq!(reform.first_year(), Some(2015));
        assert_eq!(reform.last_year(), Some(2016));
        assert!(reform.get(2016).unwrap().contains_key("_II_em"));
    }

    #[test]
    fn test_year_keyed_keeps_empty_years() {
        let reform = YearKeyedReform::from_value(&json!({"2010": {}, "2016": {"_II_em": [7000]}})).unwrap();
        assert_eq!(reform.years().collect::<Vec<_>>(), vec![2010, 2016]);
        assert_eq!(reform.len(), 1);
        assert!(!reform.is_empty());
        assert!(reform.get(2010).unwrap().is_empty());
    }

    #[test]
    fn test_insert_year_merges_overrides() {
        let mut reform = YearKeyedReform::new();
        reform.insert(2015, "_II_em", ReformValue::Number(5000.0));
        let mods: ParameterMods = [("_CTC_c".to_string(), ReformValue::Number(1500.0))].into_iter().collect();
        reform.insert_year(2015, mods);
        reform.insert_year(2017, ParameterMods::new());

        assert_eq!(reform.len(), 2);
        assert_eq!(reform.get(2015).unwrap().len(), 2);
        assert_eq!(reform.last_year(), Some(2017));
    }

    #[test]
    fn test_year_keyed_rejects_non_mapping() {
        let err = YearKeyedReform::from_value(&json!([2015])).unwrap_err();
        assert!(matches!(err, PolicyError::InputShape { .. }));
        assert!(err.to_string().contains("array"));

        let err = YearKeyedReform::from_value(&json!({"2015": [1]})).unwrap_err();
        assert!(err.to_string().contains("reform year 2015"));
    }

    #[test]
    fn test_year_keyed_rejects_non_integer_year() {
        let err = YearKeyedReform::from_value(&json!({"2015.5": {"_II_em": [1]}})).unwrap_err();
        match err {
            PolicyError::KeyType { key, .. } => assert_eq!(key, "2015.5"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parameter_keyed_from_value() {
        let reform = ParameterKeyedReform::from_value(&json!({
            "_II_em": {"2016": [7000], " 2019 ": [9000]},
            "_SS_Earnings_c_cpi": {"2017": false}
        }))
        .unwrap();
        assert_eq!(reform.len(), 3);
        let years: Vec<_> = reform.get("_II_em").unwrap().keys().copied().collect();
        assert_eq!(years, vec![2016, 2019]);
    }

    #[test]
    fn test_parameter_keyed_errors_name_the_key() {
        let err = ParameterKeyedReform::from_value(&json!({"_II_em": {"next": [1]}})).unwrap_err();
        assert!(err.to_string().contains("\"next\""));
        assert!(err.to_string().contains("_II_em"));

        let err = ParameterKeyedReform::from_value(&json!({"_II_em": [7000]})).unwrap_err();
        assert!(matches!(err, PolicyError::InputShape { .. }));
        assert!(err.to_string().contains("_II_em"));
    }

    #[test]
    fn test_descriptor_detects_orientation() {
        let by_year = ReformDescriptor::from_value(&json!({"2015": {"_II_em": [1]}})).unwrap();
        assert!(matches!(by_year, ReformDescriptor::YearKeyed(_)));

        let by_param = ReformDescriptor::from_value(&json!({"_II_em": {"2015": [1]}})).unwrap();
        assert!(matches!(by_param, ReformDescriptor::ParameterKeyed(_)));

        assert_eq!(by_year.into_year_keyed(), by_param.into_year_keyed());

        let empty = ReformDescriptor::from_value(&json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_serializes_with_string_year_keys() {
        let mut reform = YearKeyedReform::new();
        reform.insert(2015, "_II_em", ReformValue::from(vec![7000.0]));
        assert_eq!(serde_json::to_value(&reform).unwrap(), json!({"2015": {"_II_em": [7000.0]}}));
    }
}
