//! CSV rule table parsing and validation for famlink
//!
//! The config format is one CSV row per rule:
//! `App,Max Duration,Days,Time Ranges` with `#` comments.
//! Parsing produces a validated [`RuleTable`]; malformed rows and
//! ambiguous overlapping rules fail with [`ConfigError`].

mod rules;
mod schema;
mod validation;

pub use rules::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Missing or invalid header (expected '{}')", schema::HEADER)]
    InvalidHeader,

    #[error("Line {line}: malformed row: {message}")]
    BadRow { line: usize, message: String },

    #[error("Validation failed:\n{}", format_errors(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load and validate a rule table from a CSV file
pub fn load_rules(path: impl AsRef<Path>) -> ConfigResult<RuleTable> {
    let content = std::fs::read_to_string(path)?;
    parse_rules(&content)
}

/// Parse and validate a rule table from CSV content
pub fn parse_rules(content: &str) -> ConfigResult<RuleTable> {
    let rows = parse_csv(content)?;

    let mut errors = Vec::new();
    let mut parsed = Vec::new();
    for row in &rows {
        match parse_rule(row) {
            Ok(rule) => parsed.push(rule),
            Err(row_errors) => errors.extend(row_errors),
        }
    }

    // Ambiguity is only meaningful over syntactically valid rules
    if errors.is_empty() {
        errors.extend(check_ambiguity(&parsed));
    }

    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    tracing::debug!(rules = parsed.len(), "Rule table validated");
    Ok(RuleTable::new(parsed.into_iter().map(Rule::from).collect()))
}
