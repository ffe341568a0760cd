//! Parameter timeline: current-law defaults expanded year by year

mod defaults;
mod table;
mod timeline;
mod value;
mod window;

pub use defaults::{ParameterDefaults, ParameterSpec, JSON_START_YEAR};
pub use table::{ParameterTable, TableSnapshot};
pub use timeline::ParameterTimeline;
pub use value::{expand, ValueShape, YearValue, UNLIMITED};
pub use window::PolicyWindow;
