//! Reform descriptors: parsing, orientation normalization and application
//!
//! A reform is a sparse set of (year, parameter, value) overrides to
//! current-law policy. Reform files are authored parameter-first:
//!
//! ```json
//! {
//!     "_II_em": {"2016": [7000], "2019": [9000]},  // exemption
//!     "_SS_Earnings_c_cpi": {"2017": false}
//! }
//! ```
//!
//! Application consumes the year-first orientation, where each year's
//! overrides are handed to the parameter timeline in ascending order.

mod apply;
mod descriptor;
mod normalize;
mod parser;
mod value;

pub use apply::apply_reform;
pub use descriptor::{ParameterKeyedReform, ParameterMods, ReformDescriptor, YearKeyedReform};
pub use normalize::{normalize_value, to_parameter_keyed, to_year_keyed};
pub use parser::{read_json_reform_file, read_json_reform_text, strip_comments};
pub use value::{NumArray, ReformValue};

/// Suffix of the companion flag that switches a parameter's indexing
pub const CPI_SUFFIX: &str = "_cpi";
