//! Construction options for a [`Policy`](super::Policy)

use std::collections::BTreeMap;

use crate::parameters::{ParameterDefaults, JSON_START_YEAR};

/// Last year of the budget window covered by the bundled defaults
pub const LAST_BUDGET_YEAR: i32 = 2026;

/// Years from `JSON_START_YEAR` through `LAST_BUDGET_YEAR`
pub const DEFAULT_NUM_YEARS: usize = (LAST_BUDGET_YEAR - JSON_START_YEAR + 1) as usize;

/// Configuration for building a policy object
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Parameter defaults; the bundled current-law table when `None`
    pub parameter_defaults: Option<ParameterDefaults>,

    /// First calendar year of the window
    pub start_year: i32,

    /// Number of calendar years in the window
    pub num_years: usize,

    /// Custom price inflation rates by year (`num_years` entries from `start_year`)
    pub inflation_rates: Option<BTreeMap<i32, f64>>,

    /// Custom wage growth rates by year (`num_years` entries from `start_year`)
    pub wage_growth_rates: Option<BTreeMap<i32, f64>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            parameter_defaults: None,
            start_year: JSON_START_YEAR,
            num_years: DEFAULT_NUM_YEARS,
            inflation_rates: None,
            wage_growth_rates: None,
        }
    }
}

impl PolicyConfig {
    pub fn with_years(mut self, start_year: i32, num_years: usize) -> Self {
        self.start_year = start_year;
        self.num_years = num_years;
        self
    }

    pub fn with_parameter_defaults(mut self, defaults: ParameterDefaults) -> Self {
        self.parameter_defaults = Some(defaults);
        self
    }

    pub fn with_inflation_rates(mut self, rates: BTreeMap<i32, f64>) -> Self {
        self.inflation_rates = Some(rates);
        self
    }

    pub fn with_wage_growth_rates(mut self, rates: BTreeMap<i32, f64>) -> Self {
        self.wage_growth_rates = Some(rates);
        self
    }

    /// Last calendar year, `None` when the window is empty or overflows
    pub fn end_year(&self) -> Option<i32> {
        let last_offset = i32::try_from(self.num_years.checked_sub(1)?).ok()?;
        self.start_year.checked_add(last_offset)
    }
}
