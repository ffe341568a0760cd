//! Dense year-by-year parameter table built from current-law defaults
//!
//! Every parameter holds one value per window year. Indexed parameters grow
//! year over year by the inflation (or wage growth) rate of the prior year,
//! rounded to cents; unindexed parameters carry their last value forward.
//! A reform overwrites a parameter from its year onward and re-derives the
//! trailing years with whatever indexing rule is then in force.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use super::defaults::{ParameterDefaults, ParameterSpec};
use super::timeline::ParameterTimeline;
use super::value::{expand, ValueShape, YearValue};
use super::window::PolicyWindow;
use crate::error::{PolicyError, Result};
use crate::rates::{default_rate, RateKind, RateSeries};
use crate::reform::{ParameterMods, ReformValue, CPI_SUFFIX};

/// Projected values and indexing state of one parameter
#[derive(Debug, Clone, PartialEq)]
struct ParameterSeries {
    long_name: String,
    col_label: Vec<String>,
    shape: ValueShape,
    /// Current-law indexing switch
    cpi_inflated: bool,
    /// `_cpi` flags by the year they take effect
    index_flags: BTreeMap<i32, bool>,
    wage_indexed: bool,
    values: Vec<YearValue>,
}

impl ParameterSeries {
    fn rate_kind(&self) -> RateKind {
        if self.wage_indexed {
            RateKind::WageGrowth
        } else {
            RateKind::Inflation
        }
    }

    /// Whether growth from `year` into the next year is indexed
    fn indexed_in(&self, year: i32) -> bool {
        self.index_flags
            .range(..=year)
            .next_back()
            .map_or(self.cpi_inflated, |(_, flag)| *flag)
    }
}

/// Parameter store implementing [`ParameterTimeline`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    window: PolicyWindow,
    inflation: RateSeries,
    wage_growth: RateSeries,
    params: BTreeMap<String, ParameterSeries>,
}

impl ParameterTable {
    /// Expand `defaults` across `window` and put the cursor at its start
    pub fn new(
        defaults: &ParameterDefaults,
        window: PolicyWindow,
        inflation: RateSeries,
        wage_growth: RateSeries,
    ) -> Result<Self> {
        for series in [&inflation, &wage_growth] {
            if series.start_year() != window.start_year() || series.len() != window.num_years() {
                return Err(PolicyError::ShapeMismatch(format!(
                    "{} rates cover {} years from {}, window covers {} years from {}",
                    series.kind().label(),
                    series.len(),
                    series.start_year(),
                    window.num_years(),
                    window.start_year()
                )));
            }
        }

        let mut table = Self {
            window,
            inflation,
            wage_growth,
            params: BTreeMap::new(),
        };
        for (name, spec) in defaults.iter() {
            let series = table.initial_series(name, spec)?;
            table.params.insert(name.clone(), series);
        }
        table.window.set_year(window.start_year())?;
        Ok(table)
    }

    fn initial_series(&self, name: &str, spec: &ParameterSpec) -> Result<ParameterSeries> {
        let start = self.window.start_year();
        let first = spec.first_year();
        if first > start {
            return Err(PolicyError::InvalidWindow(format!(
                "{} has no value before {} but start_year={}",
                name, first, start
            )));
        }
        let shape = spec
            .shape()
            .ok_or_else(|| PolicyError::Defaults(format!("{} has no values", name)))?;

        let mut series = ParameterSeries {
            long_name: spec.long_name.clone(),
            col_label: spec.col_label.clone(),
            shape,
            cpi_inflated: spec.cpi_inflated,
            index_flags: BTreeMap::new(),
            wage_indexed: spec.wage_indexed,
            values: Vec::new(),
        };

        let skip = (start - first) as usize;
        let seed = if skip < spec.value.len() {
            spec.value[skip..].to_vec()
        } else {
            // Known values end before the window opens: walk the last one
            // forward with the baked-in rates.
            let last_year = first + spec.value.len() as i32 - 1;
            let mut value = spec.value[spec.value.len() - 1].clone();
            for year in last_year..start {
                let rate = if series.cpi_inflated {
                    Some(default_rate(series.rate_kind(), year)?)
                } else {
                    None
                };
                value = value.indexed(rate);
            }
            vec![value]
        };

        series.values = expand(&seed, &self.index_rates(&series, start), self.window.num_years());
        Ok(series)
    }

    /// Growth rate for each year from `year` on, `None` where not indexed
    fn index_rates(&self, series: &ParameterSeries, year: i32) -> Vec<Option<f64>> {
        let rates = match series.rate_kind() {
            RateKind::Inflation => &self.inflation,
            RateKind::WageGrowth => &self.wage_growth,
        };
        (year..=self.window.end_year())
            .map(|y| if series.indexed_in(y) { rates.rate(y) } else { None })
            .collect()
    }

    pub fn window(&self) -> &PolicyWindow {
        &self.window
    }

    pub fn num_years(&self) -> usize {
        self.window.num_years()
    }

    pub fn inflation_rates(&self) -> &RateSeries {
        &self.inflation
    }

    pub fn wage_growth_rates(&self) -> &RateSeries {
        &self.wage_growth
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Value in the current cursor year
    pub fn value(&self, name: &str) -> Option<&YearValue> {
        self.value_in(name, self.window.current_year())
    }

    pub fn value_in(&self, name: &str, year: i32) -> Option<&YearValue> {
        let idx = self.window.index_of(year)?;
        self.params.get(name)?.values.get(idx)
    }

    /// Every window year's value, index 0 = `start_year`
    pub fn values(&self, name: &str) -> Option<&[YearValue]> {
        self.params.get(name).map(|s| s.values.as_slice())
    }

    /// Indexing in force for `name` in `year`, after any `_cpi` flags
    pub fn is_indexed(&self, name: &str, year: i32) -> Option<bool> {
        self.params.get(name).map(|s| s.indexed_in(year))
    }

    pub fn long_name(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.long_name.as_str())
    }

    pub fn col_labels(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(|s| s.col_label.as_slice())
    }

    /// Year-keyed view of the named parameters (all when `names` is empty)
    pub fn year_table(&self, names: &[String]) -> Result<BTreeMap<i32, BTreeMap<String, YearValue>>> {
        let selected: Vec<&str> = if names.is_empty() {
            self.names().collect()
        } else {
            for name in names {
                if !self.contains(name) {
                    return Err(PolicyError::UnknownParameter(name.clone()));
                }
            }
            names.iter().map(String::as_str).collect()
        };

        let mut out = BTreeMap::new();
        for (idx, year) in self.window.years().enumerate() {
            let row: BTreeMap<String, YearValue> = selected
                .iter()
                .filter_map(|name| {
                    let value = self.params.get(*name)?.values.get(idx)?;
                    Some((name.to_string(), value.clone()))
                })
                .collect();
            out.insert(year, row);
        }
        Ok(out)
    }

    /// Convert a reform value into consecutive per-year values
    fn seed_values(
        &self,
        series: &ParameterSeries,
        name: &str,
        year: i32,
        value: &ReformValue,
    ) -> Result<Vec<YearValue>> {
        let seed = match (series.shape, value) {
            (_, ReformValue::Flag(_)) => {
                return Err(PolicyError::invalid_value(
                    name,
                    year,
                    "boolean values are only valid for a _cpi indexing flag",
                ))
            }
            (ValueShape::Scalar, ReformValue::Number(v)) => vec![YearValue::Scalar(*v)],
            (ValueShape::Scalar, ReformValue::Array(arr)) if arr.ndim() == 1 => {
                arr.data().iter().map(|v| YearValue::Scalar(*v)).collect()
            }
            (ValueShape::Row(cols), ReformValue::Array(arr))
                if arr.ndim() == 2 && arr.shape()[1] == cols =>
            {
                arr.rows()
                    .map(|rows| rows.map(|r| YearValue::Row(r.to_vec())).collect::<Vec<_>>())
                    .unwrap_or_default()
            }
            (shape, value) => {
                let found = match value {
                    ReformValue::Array(arr) => format!("array of shape {:?}", arr.shape()),
                    _ => "a single number".to_string(),
                };
                let expected = match shape {
                    ValueShape::Scalar => "a number or a list of numbers".to_string(),
                    ValueShape::Row(cols) => format!("a list of rows with {} columns", cols),
                };
                return Err(PolicyError::ShapeMismatch(format!(
                    "{} in {} expects {}, found {}",
                    name, year, expected, found
                )));
            }
        };

        if seed.is_empty() {
            return Err(PolicyError::invalid_value(name, year, "no values supplied"));
        }
        let remaining = (self.window.end_year() - year + 1) as usize;
        if seed.len() > remaining {
            return Err(PolicyError::ShapeMismatch(format!(
                "{} supplies {} years of values from {} but end_year={}",
                name,
                seed.len(),
                year,
                self.window.end_year()
            )));
        }
        Ok(seed)
    }

    fn series(&self, name: &str) -> Result<&ParameterSeries> {
        self.params
            .get(name)
            .ok_or_else(|| PolicyError::UnknownParameter(name.to_string()))
    }

    /// Replace `name` from `year` on with `seed` expanded under its indexing
    fn reproject(&mut self, name: &str, year: i32, seed: &[YearValue]) -> Result<()> {
        let offset = self
            .window
            .index_of(year)
            .ok_or_else(|| PolicyError::InvalidWindow(format!("year {} is outside the window", year)))?;
        let remaining = self.window.num_years() - offset;
        let series = self.series(name)?;
        let projected = expand(seed, &self.index_rates(series, year), remaining);

        if let Some(series) = self.params.get_mut(name) {
            series.values.truncate(offset);
            series.values.extend(projected);
        }
        Ok(())
    }
}

impl ParameterTimeline for ParameterTable {
    fn start_year(&self) -> i32 {
        self.window.start_year()
    }

    fn end_year(&self) -> i32 {
        self.window.end_year()
    }

    fn current_year(&self) -> i32 {
        self.window.current_year()
    }

    fn set_year(&mut self, year: i32) -> Result<()> {
        self.window.set_year(year)
    }

    fn check_update(&self, year: i32, mods: &ParameterMods) -> Result<()> {
        if !self.window.contains(year) {
            return Err(PolicyError::InvalidWindow(format!(
                "update year {} is outside [{}, {}]",
                year,
                self.window.start_year(),
                self.window.end_year()
            )));
        }
        for (name, value) in mods {
            if let Some(root) = name.strip_suffix(CPI_SUFFIX) {
                self.series(root)?;
                if value.as_flag().is_none() {
                    return Err(PolicyError::invalid_value(name, year, "indexing flag must be true or false"));
                }
            } else {
                let series = self.series(name)?;
                self.seed_values(series, name, year, value)?;
            }
        }
        Ok(())
    }

    fn update(&mut self, year: i32, mods: &ParameterMods) -> Result<()> {
        if year != self.window.current_year() {
            return Err(PolicyError::InvalidWindow(format!(
                "update year {} != current_year {}",
                year,
                self.window.current_year()
            )));
        }
        self.check_update(year, mods)?;

        // Indexing flags take effect before any value is re-projected.
        for (name, value) in mods {
            if let (Some(root), Some(flag)) = (name.strip_suffix(CPI_SUFFIX), value.as_flag()) {
                if let Some(series) = self.params.get_mut(root) {
                    series.index_flags.insert(year, flag);
                }
            }
        }

        for (name, value) in mods {
            let seed = match name.strip_suffix(CPI_SUFFIX) {
                // A bare flag re-derives from the value already in force.
                Some(root) if !mods.contains_key(root) => {
                    let current = self.value_in(root, year).cloned();
                    debug!("{}: indexing set to {:?} from {}", root, value.as_flag(), year);
                    match current {
                        Some(v) => (root.to_string(), vec![v]),
                        None => continue,
                    }
                }
                Some(_) => continue,
                None => {
                    let series = self.series(name)?;
                    let seed = self.seed_values(series, name, year, value)?;
                    debug!("{}: {} year(s) of new values from {}", name, seed.len(), year);
                    (name.clone(), seed)
                }
            };
            self.reproject(&seed.0, year, &seed.1)?;
        }
        Ok(())
    }
}

/// Serializable snapshot used by the inspection binary
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub start_year: i32,
    pub end_year: i32,
    pub current_year: i32,
    pub values: BTreeMap<i32, BTreeMap<String, YearValue>>,
}

impl ParameterTable {
    pub fn snapshot(&self, names: &[String]) -> Result<TableSnapshot> {
        Ok(TableSnapshot {
            start_year: self.window.start_year(),
            end_year: self.window.end_year(),
            current_year: self.window.current_year(),
            values: self.year_table(names)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reform::NumArray;
    use approx::assert_relative_eq;

    const DEFAULTS: &str = r#"{
        "_em": {"cpi_inflated": true, "value": [1000, 1010]},
        "_flat": {"cpi_inflated": false, "value": [0.5]},
        "_wage": {"cpi_inflated": true, "wage_indexed": true, "value": [100000]},
        "_row": {"cpi_inflated": true, "col_label": ["a", "b"], "value": [[100, 200]]}
    }"#;

    fn rates(kind: RateKind, rate: f64, start: i32, n: usize) -> RateSeries {
        let map = (0..n).map(|i| (start + i as i32, rate)).collect();
        RateSeries::build(kind, Some(&map), start, n).unwrap()
    }

    fn table(start: i32, n: usize) -> ParameterTable {
        let defaults = ParameterDefaults::from_json_str(DEFAULTS).unwrap();
        ParameterTable::new(
            &defaults,
            PolicyWindow::new(start, n).unwrap(),
            rates(RateKind::Inflation, 0.10, start, n),
            rates(RateKind::WageGrowth, 0.20, start, n),
        )
        .unwrap()
    }

    fn scalar(t: &ParameterTable, name: &str, year: i32) -> f64 {
        t.value_in(name, year).and_then(YearValue::as_scalar).unwrap()
    }

    fn mods(entries: Vec<(&str, ReformValue)>) -> ParameterMods {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_initial_expansion() {
        let t = table(2013, 4);
        assert_eq!(t.current_year(), 2013);
        assert_relative_eq!(scalar(&t, "_em", 2013), 1000.0);
        assert_relative_eq!(scalar(&t, "_em", 2014), 1010.0);
        assert_relative_eq!(scalar(&t, "_em", 2015), 1111.0);
        assert_relative_eq!(scalar(&t, "_flat", 2016), 0.5);
        assert_relative_eq!(scalar(&t, "_wage", 2014), 120000.0);
        assert_eq!(t.value_in("_row", 2014), Some(&YearValue::Row(vec![110.0, 220.0])));
        assert_eq!(t.col_labels("_row").unwrap(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_window_after_known_values() {
        let defaults = ParameterDefaults::from_json_str(DEFAULTS).unwrap();
        let t = ParameterTable::new(
            &defaults,
            PolicyWindow::new(2016, 2).unwrap(),
            rates(RateKind::Inflation, 0.0, 2016, 2),
            rates(RateKind::WageGrowth, 0.0, 2016, 2),
        )
        .unwrap();
        // 1010 in 2014, grown by the baked-in 2014 and 2015 inflation rates
        assert_relative_eq!(scalar(&t, "_em", 2016), 1027.39);
        assert_relative_eq!(scalar(&t, "_em", 2017), 1027.39);
    }

    #[test]
    fn test_parameter_starting_after_window_rejected() {
        let defaults = ParameterDefaults::from_json_str(r#"{"_late": {"start_year": 2015, "value": [1]}}"#).unwrap();
        let err = ParameterTable::new(
            &defaults,
            PolicyWindow::new(2013, 3).unwrap(),
            rates(RateKind::Inflation, 0.0, 2013, 3),
            rates(RateKind::WageGrowth, 0.0, 2013, 3),
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidWindow(_)));
    }

    #[test]
    fn test_misaligned_rates_rejected() {
        let defaults = ParameterDefaults::from_json_str(DEFAULTS).unwrap();
        let err = ParameterTable::new(
            &defaults,
            PolicyWindow::new(2013, 3).unwrap(),
            rates(RateKind::Inflation, 0.0, 2014, 3),
            rates(RateKind::WageGrowth, 0.0, 2013, 3),
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::ShapeMismatch(_)));
    }

    #[test]
    fn test_update_overwrites_and_reprojects() {
        let mut t = table(2013, 4);
        t.set_year(2014).unwrap();
        t.update(2014, &mods(vec![("_em", vec![2000.0].into())])).unwrap();

        assert_relative_eq!(scalar(&t, "_em", 2013), 1000.0);
        assert_relative_eq!(scalar(&t, "_em", 2014), 2000.0);
        assert_relative_eq!(scalar(&t, "_em", 2015), 2200.0);
        assert_relative_eq!(scalar(&t, "_em", 2016), 2420.0);
    }

    #[test]
    fn test_update_with_cpi_flag_off() {
        let mut t = table(2013, 4);
        t.set_year(2015).unwrap();
        let m = mods(vec![("_em", ReformValue::Number(5000.0)), ("_em_cpi", false.into())]);
        t.update(2015, &m).unwrap();

        assert_relative_eq!(scalar(&t, "_em", 2016), 5000.0);
        assert_eq!(t.is_indexed("_em", 2015), Some(false));
        assert_eq!(t.is_indexed("_em", 2014), Some(true));
    }

    #[test]
    fn test_cpi_flag_only_applies_from_its_year() {
        let mut t = table(2013, 6);
        t.set_year(2016).unwrap();
        t.update(2016, &mods(vec![("_em_cpi", false.into())])).unwrap();
        assert_relative_eq!(scalar(&t, "_em", 2017), 1222.1);

        // an earlier override re-derives through the years before the flag
        t.set_year(2014).unwrap();
        t.update(2014, &mods(vec![("_em", ReformValue::Number(2000.0))])).unwrap();

        let values: Vec<f64> = t.values("_em").unwrap().iter().filter_map(YearValue::as_scalar).collect();
        assert_eq!(values, vec![1000.0, 2000.0, 2200.0, 2420.0, 2420.0, 2420.0]);
        assert_eq!(t.is_indexed("_em", 2015), Some(true));
        assert_eq!(t.is_indexed("_em", 2016), Some(false));
    }

    #[test]
    fn test_later_flag_survives_earlier_flag() {
        let mut t = table(2013, 5);
        t.set_year(2016).unwrap();
        t.update(2016, &mods(vec![("_flat_cpi", true.into())])).unwrap();
        t.set_year(2014).unwrap();
        t.update(2014, &mods(vec![("_flat_cpi", false.into())])).unwrap();

        assert_eq!(t.is_indexed("_flat", 2015), Some(false));
        assert_eq!(t.is_indexed("_flat", 2016), Some(true));
        assert_relative_eq!(scalar(&t, "_flat", 2017), 0.55);
    }

    #[test]
    fn test_bare_cpi_flag_reprojects_current_value() {
        let mut t = table(2013, 4);
        t.set_year(2014).unwrap();
        t.update(2014, &mods(vec![("_flat_cpi", true.into())])).unwrap();

        assert_relative_eq!(scalar(&t, "_flat", 2014), 0.5);
        assert_relative_eq!(scalar(&t, "_flat", 2015), 0.55);
        assert_eq!(t.is_indexed("_flat", 2016), Some(true));
        assert_eq!(t.is_indexed("_flat", 2013), Some(false));
    }

    #[test]
    fn test_row_update() {
        let mut t = table(2013, 3);
        let rows = NumArray::from_rows(vec![vec![300.0, 400.0]]).unwrap();
        t.update(2013, &mods(vec![("_row", ReformValue::Array(rows))])).unwrap();
        assert_eq!(t.value_in("_row", 2015), Some(&YearValue::Row(vec![363.0, 484.0])));
    }

    #[test]
    fn test_update_requires_cursor_year() {
        let mut t = table(2013, 3);
        let err = t.update(2014, &mods(vec![("_em", 1.0.into())])).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidWindow(_)));
    }

    #[test]
    fn test_check_update_rejects_bad_payloads() {
        let t = table(2013, 3);
        let cases = vec![
            mods(vec![("_missing", 1.0.into())]),
            mods(vec![("_missing_cpi", true.into())]),
            mods(vec![("_em_cpi", 1.0.into())]),
            mods(vec![("_em", true.into())]),
            mods(vec![("_row", vec![1.0, 2.0].into())]),
            mods(vec![("_em", Vec::<f64>::new().into())]),
            mods(vec![("_em", vec![1.0, 2.0, 3.0, 4.0].into())]),
        ];
        for m in cases {
            assert!(t.check_update(2013, &m).is_err(), "accepted {:?}", m);
        }
        assert!(t.check_update(2013, &mods(vec![("_em", vec![1.0, 2.0, 3.0].into())])).is_ok());
    }

    #[test]
    fn test_failed_update_leaves_table_untouched() {
        let mut t = table(2013, 3);
        let before = t.clone();
        let m = mods(vec![("_em", 1.0.into()), ("_row", 2.0.into())]);
        assert!(t.update(2013, &m).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn test_year_table_selection() {
        let t = table(2013, 2);
        let view = t.year_table(&["_flat".to_string()]).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[&2014]["_flat"], YearValue::Scalar(0.5));
        assert!(t.year_table(&["_nope".to_string()]).is_err());
        assert_eq!(t.year_table(&[]).unwrap()[&2013].len(), 4);
    }
}
