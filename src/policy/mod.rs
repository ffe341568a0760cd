//! Policy object: simulation window, indexing rates and reform entry points

mod config;
mod data;

pub use config::{PolicyConfig, DEFAULT_NUM_YEARS, LAST_BUDGET_YEAR};
pub use data::Policy;
