//! Reform file reader
//!
//! Reform files are JSON with `//` line comments. Everything from `//` to
//! the end of a line is removed before parsing; this does not understand
//! `//` inside string literals.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::error;
use regex::Regex;
use serde_json::Value;

use super::descriptor::YearKeyedReform;
use super::normalize::normalize_value;
use crate::error::{PolicyError, Result};

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"//.*").expect("comment pattern is a valid regex"))
}

/// Remove `//` comments from every line
pub fn strip_comments(text: &str) -> String {
    comment_pattern().replace_all(text, "").into_owned()
}

/// Read a commented JSON reform file and return its year-keyed form
pub fn read_json_reform_file<P: AsRef<Path>>(path: P) -> Result<YearKeyedReform> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PolicyError::ResourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    parse_reform(&text, path.to_path_buf())
}

/// Same as [`read_json_reform_file`] for in-memory text
pub fn read_json_reform_text(text: &str) -> Result<YearKeyedReform> {
    parse_reform(text, PathBuf::from("<text>"))
}

fn parse_reform(text: &str, path: PathBuf) -> Result<YearKeyedReform> {
    let stripped = strip_comments(text);
    let raw: Value = match serde_json::from_str(&stripped) {
        Ok(raw) => raw,
        Err(source) => {
            let err = PolicyError::MalformedJson {
                path,
                text: stripped,
                source,
            };
            if let Some(diagnostic) = err.diagnostic() {
                error!("{}\n{}", err, diagnostic);
            }
            return Err(err);
        }
    };
    normalize_value(&raw)
}
