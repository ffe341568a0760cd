//! Collaborator interface driven by reform application

use crate::error::Result;
use crate::reform::ParameterMods;

/// Dense year-by-year parameter store with a current-year cursor.
///
/// Reform application only talks to the store through this trait: it moves
/// the cursor and hands over one year of overrides at a time.
pub trait ParameterTimeline {
    fn start_year(&self) -> i32;

    fn end_year(&self) -> i32;

    fn current_year(&self) -> i32;

    /// Move the cursor; fails outside `[start_year, end_year]`
    fn set_year(&mut self, year: i32) -> Result<()>;

    /// Check that `mods` could be applied in `year` without touching any
    /// state. Implementations that cannot check ahead accept everything.
    fn check_update(&self, _year: i32, _mods: &ParameterMods) -> Result<()> {
        Ok(())
    }

    /// Overwrite the named parameters from `year` onward and re-derive
    /// every later year. `year` must equal the current cursor.
    fn update(&mut self, year: i32, mods: &ParameterMods) -> Result<()>;
}
