//! Policy Reform - time-indexed tax policy parameters with multi-year reforms
//!
//! This library provides:
//! - Current-law parameter defaults expanded over a window of years
//! - Price-inflation and wage-growth indexing of parameter values
//! - Reform file parsing (JSON with `//` comments)
//! - Conversion between parameter-keyed and year-keyed reforms
//! - Atomic multi-year reform application that preserves the current year

pub mod error;
pub mod parameters;
pub mod policy;
pub mod rates;
pub mod reform;

// Re-export commonly used types
pub use error::{PolicyError, Result};
pub use parameters::{ParameterDefaults, ParameterTable, ParameterTimeline, PolicyWindow, YearValue};
pub use policy::{Policy, PolicyConfig};
pub use rates::RateSeries;
pub use reform::{ParameterKeyedReform, ReformDescriptor, ReformValue, YearKeyedReform};
