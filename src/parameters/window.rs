//! Simulation window and current-year cursor

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

/// Closed year interval `[start_year, end_year]` with a movable cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyWindow {
    start_year: i32,
    num_years: usize,
    current_year: i32,
}

impl PolicyWindow {
    /// Create a window with the cursor at `start_year`
    pub fn new(start_year: i32, num_years: usize) -> Result<Self> {
        if num_years < 1 {
            return Err(PolicyError::InvalidWindow(format!(
                "num_years={} < 1",
                num_years
            )));
        }
        let last_offset = i32::try_from(num_years - 1).ok();
        if last_offset.and_then(|offset| start_year.checked_add(offset)).is_none() {
            return Err(PolicyError::InvalidWindow(format!(
                "start_year={} with num_years={} overflows the calendar",
                start_year, num_years
            )));
        }
        Ok(Self {
            start_year,
            num_years,
            current_year: start_year,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn num_years(&self) -> usize {
        self.num_years
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + (self.num_years - 1) as i32
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year()
    }

    /// Offset of `year` from `start_year`, if inside the window
    pub fn index_of(&self, year: i32) -> Option<usize> {
        if self.contains(year) {
            Some((year - self.start_year) as usize)
        } else {
            None
        }
    }

    /// Move the cursor; fails when `year` is outside the window
    pub fn set_year(&mut self, year: i32) -> Result<()> {
        if !self.contains(year) {
            return Err(PolicyError::InvalidWindow(format!(
                "year {} is outside [{}, {}]",
                year,
                self.start_year,
                self.end_year()
            )));
        }
        self.current_year = year;
        Ok(())
    }

    /// Calendar years covered by the window, ascending
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let window = PolicyWindow::new(2013, 5).unwrap();
        assert_eq!(window.end_year(), 2017);
        assert_eq!(window.current_year(), 2013);
        assert_eq!(window.index_of(2015), Some(2));
        assert_eq!(window.index_of(2018), None);
        assert_eq!(window.years().collect::<Vec<_>>(), vec![2013, 2014, 2015, 2016, 2017]);
    }

    #[test]
    fn test_zero_years_rejected() {
        assert!(matches!(
            PolicyWindow::new(2013, 0),
            Err(PolicyError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_oversized_window_rejected() {
        assert!(PolicyWindow::new(2013, i32::MAX as usize).is_err());
        assert!(PolicyWindow::new(2013, usize::MAX).is_err());
        assert!(PolicyWindow::new(i32::MAX, 2).is_err());

        let window = PolicyWindow::new(1, i32::MAX as usize).unwrap();
        assert_eq!(window.end_year(), i32::MAX);
    }

    #[test]
    fn test_set_year_stays_inside() {
        let mut window = PolicyWindow::new(2013, 3).unwrap();
        window.set_year(2015).unwrap();
        assert_eq!(window.current_year(), 2015);

        assert!(window.set_year(2016).is_err());
        assert!(window.set_year(2012).is_err());
        assert_eq!(window.current_year(), 2015);
    }
}
