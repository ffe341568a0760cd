//! Price-inflation and wage-growth rate series used to index parameters
//!
//! The baked-in tables cover `JSON_START_YEAR..=LAST_BUDGET_YEAR`. Callers
//! may supply their own mapping instead, which must line up exactly with
//! the policy window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

/// Decimal (not percentage) annual price inflation rates by calendar year
const DEFAULT_INFLATION_RATES: [(i32, f64); 14] = [
    (2013, 0.0148),
    (2014, 0.0159),
    (2015, 0.0013),
    (2016, 0.0135),
    (2017, 0.0233),
    (2018, 0.0236),
    (2019, 0.0238),
    (2020, 0.0245),
    (2021, 0.0242),
    (2022, 0.0240),
    (2023, 0.0239),
    (2024, 0.0240),
    (2025, 0.0245),
    (2026, 0.0242),
];

/// Decimal annual wage growth rates by calendar year
const DEFAULT_WAGE_GROWTH_RATES: [(i32, f64); 14] = [
    (2013, 0.0276),
    (2014, 0.0496),
    (2015, 0.0477),
    (2016, 0.0479),
    (2017, 0.0441),
    (2018, 0.0420),
    (2019, 0.0383),
    (2020, 0.0381),
    (2021, 0.0403),
    (2022, 0.0413),
    (2023, 0.0417),
    (2024, 0.0417),
    (2025, 0.0415),
    (2026, 0.0416),
];

/// Which of the two indexing series a rate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateKind {
    Inflation,
    WageGrowth,
}

impl RateKind {
    pub fn label(self) -> &'static str {
        match self {
            RateKind::Inflation => "inflation",
            RateKind::WageGrowth => "wage growth",
        }
    }

    fn table(self) -> &'static [(i32, f64)] {
        match self {
            RateKind::Inflation => &DEFAULT_INFLATION_RATES,
            RateKind::WageGrowth => &DEFAULT_WAGE_GROWTH_RATES,
        }
    }
}

/// Complete default inflation table
pub fn default_inflation_rates() -> BTreeMap<i32, f64> {
    DEFAULT_INFLATION_RATES.iter().copied().collect()
}

/// Complete default wage growth table
pub fn default_wage_growth_rates() -> BTreeMap<i32, f64> {
    DEFAULT_WAGE_GROWTH_RATES.iter().copied().collect()
}

/// Single baked-in rate lookup
pub fn default_rate(kind: RateKind, year: i32) -> Result<f64> {
    kind.table()
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, rate)| *rate)
        .ok_or(PolicyError::UnsupportedYear {
            series: kind.label(),
            year,
        })
}

/// One rate per simulated year, index 0 = `start_year`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    kind: RateKind,
    start_year: i32,
    rates: Vec<f64>,
}

impl RateSeries {
    /// Build the series for `[start_year, start_year + num_years)`.
    ///
    /// A supplied mapping must have exactly `num_years` entries and its
    /// smallest year must equal `start_year`; without one the baked-in
    /// table is used.
    pub fn build(
        kind: RateKind,
        custom: Option<&BTreeMap<i32, f64>>,
        start_year: i32,
        num_years: usize,
    ) -> Result<Self> {
        let years = (0..num_years).map(|i| start_year + i as i32);
        let rates = match custom {
            Some(map) if !map.is_empty() => {
                if map.len() != num_years {
                    return Err(PolicyError::ShapeMismatch(format!(
                        "len({} rates)={} != num_years={}",
                        kind.label(),
                        map.len(),
                        num_years
                    )));
                }
                let first = map.keys().next().copied().unwrap_or(start_year);
                if first != start_year {
                    return Err(PolicyError::ShapeMismatch(format!(
                        "min({} rate years)={} != start_year={}",
                        kind.label(),
                        first,
                        start_year
                    )));
                }
                years
                    .map(|year| {
                        map.get(&year).copied().ok_or_else(|| {
                            PolicyError::ShapeMismatch(format!(
                                "{} rates are missing year {}",
                                kind.label(),
                                year
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            _ => years
                .map(|year| default_rate(kind, year))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            kind,
            start_year,
            rates,
        })
    }

    pub fn kind(&self) -> RateKind {
        self.kind
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rate for a calendar year inside the series
    pub fn rate(&self, year: i32) -> Option<f64> {
        let idx = usize::try_from(year - self.start_year).ok()?;
        self.rates.get(idx).copied()
    }

    /// Rates from `year` to the end of the series
    pub fn from_year(&self, year: i32) -> &[f64] {
        let idx = usize::try_from(year - self.start_year).unwrap_or(0);
        self.rates.get(idx..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(start: i32, n: usize) -> BTreeMap<i32, f64> {
        (0..n).map(|i| (start + i as i32, 0.02)).collect()
    }

    #[test]
    fn test_default_series_slices_table() {
        let series = RateSeries::build(RateKind::Inflation, None, 2015, 3).unwrap();
        assert_eq!(series.as_slice(), &[0.0013, 0.0135, 0.0233]);
        assert_eq!(series.rate(2016), Some(0.0135));
        assert_eq!(series.rate(2018), None);
        assert_eq!(series.from_year(2016), &[0.0135, 0.0233]);
    }

    #[test]
    fn test_default_series_outside_table() {
        let err = RateSeries::build(RateKind::WageGrowth, None, 2020, 10).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::UnsupportedYear { year: 2027, .. }
        ));
        assert!(RateSeries::build(RateKind::Inflation, None, 2010, 2).is_err());
    }

    #[test]
    fn test_custom_series_wrong_length() {
        let rates = custom(2013, 4);
        let err = RateSeries::build(RateKind::Inflation, Some(&rates), 2013, 5).unwrap_err();
        assert!(matches!(err, PolicyError::ShapeMismatch(_)));
    }

    #[test]
    fn test_custom_series_wrong_start() {
        let rates = custom(2014, 5);
        let err = RateSeries::build(RateKind::Inflation, Some(&rates), 2013, 5).unwrap_err();
        assert!(err.to_string().contains("start_year=2013"));
    }

    #[test]
    fn test_custom_series_with_gap() {
        let mut rates = custom(2013, 5);
        rates.remove(&2015);
        rates.insert(2030, 0.01);
        let err = RateSeries::build(RateKind::Inflation, Some(&rates), 2013, 5).unwrap_err();
        assert!(err.to_string().contains("2015"));
    }

    #[test]
    fn test_custom_series_beyond_default_table() {
        let rates = custom(2030, 3);
        let series = RateSeries::build(RateKind::WageGrowth, Some(&rates), 2030, 3).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.kind(), RateKind::WageGrowth);
    }

    #[test]
    fn test_default_tables_complete() {
        assert_eq!(default_inflation_rates().len(), 14);
        assert_eq!(default_wage_growth_rates()[&2026], 0.0416);
        assert_eq!(default_rate(RateKind::Inflation, 2013).unwrap(), 0.0148);
    }
}
