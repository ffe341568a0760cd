//! Multi-year reform application
//!
//! Years are validated as a batch, every year's payload is checked against
//! the timeline, and only then are the years applied in ascending order.
//! The caller's cursor is restored afterward, also when an update fails.

use log::{debug, info};

use super::descriptor::YearKeyedReform;
use crate::error::{PolicyError, Result};
use crate::parameters::ParameterTimeline;

/// Apply `reform` to `timeline`, leaving `current_year` unchanged.
///
/// Rejects the whole reform before any mutation when its first year falls
/// before `start_year` or `current_year`, when its last year falls after
/// `end_year`, or when any year's overrides fail `check_update`.
pub fn apply_reform<T>(timeline: &mut T, reform: &YearKeyedReform) -> Result<()>
where
    T: ParameterTimeline + ?Sized,
{
    let (Some(first), Some(last)) = (reform.first_year(), reform.last_year()) else {
        return Ok(());
    };

    check_window(timeline, first, last)?;
    for (year, mods) in reform.iter() {
        timeline.check_update(year, mods)?;
    }

    let saved_cursor = timeline.current_year();
    let applied = reform.iter().try_for_each(|(year, mods)| {
        timeline.set_year(year)?;
        debug!("applying {} reform provision(s) in {}", mods.len(), year);
        timeline.update(year, mods)
    });
    let restored = timeline.set_year(saved_cursor);
    applied?;
    restored?;

    info!(
        "implemented reform with {} provision(s) over {}-{}",
        reform.len(),
        first,
        last
    );
    Ok(())
}

fn check_window<T>(timeline: &T, first: i32, last: i32) -> Result<()>
where
    T: ParameterTimeline + ?Sized,
{
    if first < timeline.start_year() {
        return Err(PolicyError::TemporalWindow {
            year: first,
            relation: "<",
            bound_name: "start_year",
            bound: timeline.start_year(),
        });
    }
    if first < timeline.current_year() {
        return Err(PolicyError::TemporalWindow {
            year: first,
            relation: "<",
            bound_name: "current_year",
            bound: timeline.current_year(),
        });
    }
    if last > timeline.end_year() {
        return Err(PolicyError::TemporalWindow {
            year: last,
            relation: ">",
            bound_name: "end_year",
            bound: timeline.end_year(),
        });
    }
    Ok(())
}
