//! Federal tax policy parameters with reform support

use std::path::Path;

use serde_json::Value;

use super::config::PolicyConfig;
use crate::error::{PolicyError, Result};
use crate::parameters::{
    ParameterDefaults, ParameterTable, ParameterTimeline, PolicyWindow, YearValue,
};
use crate::rates::{self, RateKind, RateSeries};
use crate::reform::{self, apply_reform, ReformDescriptor, YearKeyedReform};

/// Policy parameters projected over a window of calendar years.
///
/// Built once from current-law defaults and indexing rates, then mutated
/// only through reforms. The current-year cursor selects which year
/// [`Policy::value`] reports.
///
/// # Example
/// ```
/// use policy_reform::{Policy, PolicyConfig};
///
/// let mut policy = Policy::new(PolicyConfig::default().with_years(2013, 5))?;
/// let reform = Policy::read_json_reform_text(r#"{"_II_em": {"2015": [7000]}}"#)?;
/// policy.implement_reform(&reform)?;
///
/// assert_eq!(policy.current_year(), 2013);
/// assert_eq!(policy.value_in("_II_em", 2015).and_then(|v| v.as_scalar()), Some(7000.0));
/// # Ok::<(), policy_reform::PolicyError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    table: ParameterTable,
}

impl Policy {
    /// Build from a configuration, validating window and rate series
    pub fn new(config: PolicyConfig) -> Result<Self> {
        let defaults = match config.parameter_defaults {
            Some(defaults) => defaults,
            None => ParameterDefaults::bundled()?,
        };
        if let Some(earliest) = defaults.earliest_year() {
            if config.start_year < earliest {
                return Err(PolicyError::InvalidWindow(format!(
                    "start_year={} < earliest defaults year={}",
                    config.start_year, earliest
                )));
            }
        }

        let window = PolicyWindow::new(config.start_year, config.num_years)?;
        let inflation = RateSeries::build(
            RateKind::Inflation,
            config.inflation_rates.as_ref(),
            config.start_year,
            config.num_years,
        )?;
        let wage_growth = RateSeries::build(
            RateKind::WageGrowth,
            config.wage_growth_rates.as_ref(),
            config.start_year,
            config.num_years,
        )?;

        Ok(Self {
            table: ParameterTable::new(&defaults, window, inflation, wage_growth)?,
        })
    }

    /// Current-law policy over the default budget window
    pub fn current_law() -> Result<Self> {
        Self::new(PolicyConfig::default())
    }

    /// Current-law policy over a custom window with default rates
    pub fn with_years(start_year: i32, num_years: usize) -> Result<Self> {
        Self::new(PolicyConfig::default().with_years(start_year, num_years))
    }

    /// Build from a raw defaults mapping (same schema as the bundled file)
    pub fn from_parameter_dict(parameter_dict: Value, start_year: i32, num_years: usize) -> Result<Self> {
        let defaults = ParameterDefaults::from_value(parameter_dict)?;
        Self::new(
            PolicyConfig::default()
                .with_parameter_defaults(defaults)
                .with_years(start_year, num_years),
        )
    }

    /// Complete baked-in price inflation table
    pub fn default_inflation_rates() -> std::collections::BTreeMap<i32, f64> {
        rates::default_inflation_rates()
    }

    /// Complete baked-in wage growth table
    pub fn default_wage_growth_rates() -> std::collections::BTreeMap<i32, f64> {
        rates::default_wage_growth_rates()
    }

    /// Price inflation rates in use, index 0 = `start_year`
    pub fn inflation_rates(&self) -> &[f64] {
        self.table.inflation_rates().as_slice()
    }

    /// Wage growth rates in use, index 0 = `start_year`
    pub fn wage_growth_rates(&self) -> &[f64] {
        self.table.wage_growth_rates().as_slice()
    }

    pub fn start_year(&self) -> i32 {
        self.table.start_year()
    }

    pub fn end_year(&self) -> i32 {
        self.table.end_year()
    }

    pub fn num_years(&self) -> usize {
        self.table.num_years()
    }

    pub fn current_year(&self) -> i32 {
        self.table.current_year()
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        self.table.set_year(year)
    }

    /// Value of `name` in the current year
    pub fn value(&self, name: &str) -> Option<&YearValue> {
        self.table.value(name)
    }

    pub fn value_in(&self, name: &str, year: i32) -> Option<&YearValue> {
        self.table.value_in(name, year)
    }

    pub fn values(&self, name: &str) -> Option<&[YearValue]> {
        self.table.values(name)
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    /// Read a commented JSON reform file into the year-keyed form that
    /// [`Policy::implement_reform`] accepts
    pub fn read_json_reform_file<P: AsRef<Path>>(path: P) -> Result<YearKeyedReform> {
        reform::read_json_reform_file(path)
    }

    pub fn read_json_reform_text(text: &str) -> Result<YearKeyedReform> {
        reform::read_json_reform_text(text)
    }

    /// Implement a multi-year reform and leave `current_year` unchanged
    pub fn implement_reform(&mut self, reform: &YearKeyedReform) -> Result<()> {
        apply_reform(&mut self.table, reform)
    }

    /// Implement a reform given in either orientation
    pub fn implement_descriptor(&mut self, reform: ReformDescriptor) -> Result<()> {
        self.implement_reform(&reform.into_year_keyed())
    }

    /// Implement an untyped year-keyed reform; `null` is a no-op
    pub fn implement_reform_value(&mut self, reform: &Value) -> Result<()> {
        if reform.is_null() {
            return Ok(());
        }
        let reform = YearKeyedReform::from_value(reform)?;
        self.implement_reform(&reform)
    }

    /// Read a reform file and implement it
    pub fn implement_reform_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let reform = Self::read_json_reform_file(path)?;
        self.implement_reform(&reform)
    }
}
