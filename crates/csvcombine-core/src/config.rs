//! Configuration resolution
//!
//! Parameters arrive as raw strings (from a job file, command-line flags, or
//! an upstream input row). They are merged into a [`ParameterSet`] and then
//! resolved exactly once into an immutable [`CombineConfig`] before any
//! resource is touched.

use crate::error::{Error, Result};
use crate::selector::ResourceFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DELIMITER: &str = "delimiter";
pub const QUOTECHAR: &str = "quotechar";
pub const REGEX: &str = "regex";
pub const SKIP_LINES: &str = "skip_lines";
pub const STOP: &str = "stop";

const KNOWN_PARAMETERS: &[&str] = &[DELIMITER, QUOTECHAR, REGEX, SKIP_LINES, STOP];

/// What to do when no files match, or the matched files hold no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    /// Fail with `NoInputFiles` / `NoRowsProduced`
    #[default]
    Stop,
    /// Return an empty result
    Continue,
}

impl EmptyPolicy {
    pub fn is_stop(self) -> bool {
        self == EmptyPolicy::Stop
    }
}

/// Resolved, validated settings for one combine run
#[derive(Debug, Clone)]
pub struct CombineConfig {
    /// Field separator
    pub delimiter: u8,
    /// Quote character
    pub quote: u8,
    /// Resource name filter
    pub filter: ResourceFilter,
    /// Rows before the header row
    pub skip_lines: usize,
    /// Empty input / empty output handling
    pub empty_policy: EmptyPolicy,
}

impl CombineConfig {
    /// Config with default delimiter `,`, quote `"`, no skipped rows, and `Stop` policy
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            delimiter: b',',
            quote: b'"',
            filter: ResourceFilter::new(pattern)?,
            skip_lines: 0,
            empty_policy: EmptyPolicy::default(),
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    pub fn with_empty_policy(mut self, empty_policy: EmptyPolicy) -> Self {
        self.empty_policy = empty_policy;
        self
    }
}

/// Raw, unvalidated parameters keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Create a new empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Template with every parameter at its default and an example filter
    pub fn template() -> Self {
        Self::new()
            .with(DELIMITER, ",")
            .with(QUOTECHAR, "\"")
            .with(REGEX, "^data-.*\\.csv$")
            .with(SKIP_LINES, "0")
            .with(STOP, "true")
    }

    /// Set a parameter
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`ParameterSet::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Overlay values from an upstream input row
    ///
    /// Only known parameter names are taken; returns how many were rebound.
    pub fn rebind<I, K, V>(&mut self, row: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut rebound = 0;
        for (name, value) in row {
            let name = name.as_ref();
            if KNOWN_PARAMETERS.contains(&name) {
                self.values.insert(name.to_string(), value.into());
                rebound += 1;
            } else {
                tracing::debug!(parameter = name, "ignoring unknown upstream parameter");
            }
        }
        rebound
    }

    /// Parse a `name=value` assignment and apply it
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::invalid_parameter(assignment, "expected 'name=value'")
        })?;
        if self.rebind([(name.trim(), value)]) == 0 {
            return Err(Error::invalid_parameter(name.trim(), "unknown parameter"));
        }
        Ok(())
    }

    /// Validate and produce the run configuration
    pub fn resolve(&self) -> Result<CombineConfig> {
        for name in self.values.keys() {
            if !KNOWN_PARAMETERS.contains(&name.as_str()) {
                tracing::warn!(parameter = %name, "ignoring unknown parameter");
            }
        }

        let delimiter = single_byte(DELIMITER, self.get(DELIMITER).unwrap_or(","))?;
        let quote = single_byte(QUOTECHAR, self.get(QUOTECHAR).unwrap_or("\""))?;
        if delimiter == quote {
            return Err(Error::invalid_parameter(
                QUOTECHAR,
                "must differ from the delimiter",
            ));
        }

        let pattern = self
            .get(REGEX)
            .ok_or_else(|| Error::invalid_parameter(REGEX, "a file name filter is required"))?;

        let skip_lines = match self.get(SKIP_LINES) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::invalid_parameter(
                    SKIP_LINES,
                    format!("'{}' is not a non-negative integer", raw),
                )
            })?,
            None => 0,
        };

        let empty_policy = match self.get(STOP) {
            Some(raw) => {
                if parse_flag(STOP, raw)? {
                    EmptyPolicy::Stop
                } else {
                    EmptyPolicy::Continue
                }
            }
            None => EmptyPolicy::default(),
        };

        Ok(CombineConfig {
            delimiter,
            quote,
            filter: ResourceFilter::new(pattern)?,
            skip_lines,
            empty_policy,
        })
    }

    /// Load parameters from a JSON job file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save parameters to a JSON job file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn single_byte(name: &str, raw: &str) -> Result<u8> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(Error::invalid_parameter(
            name,
            format!("'{}' must be exactly one ASCII character", raw),
        )),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::invalid_parameter(
            name,
            format!("'{}' is not a boolean", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_name(err: Error) -> String {
        match err {
            Error::InvalidParameter { name, .. } => name,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = ParameterSet::new().with(REGEX, "x").resolve().unwrap();

        assert_eq!(config.delimiter, b',');
        assert_eq!(config.quote, b'"');
        assert_eq!(config.skip_lines, 0);
        assert_eq!(config.empty_policy, EmptyPolicy::Stop);
        assert_eq!(config.filter.pattern(), "x");
    }

    #[test]
    fn test_template_resolves() {
        let config = ParameterSet::template().resolve().unwrap();
        assert!(config.filter.matches("data-1.csv"));
    }

    #[test]
    fn test_explicit_values() {
        let config = ParameterSet::new()
            .with(DELIMITER, ";")
            .with(QUOTECHAR, "'")
            .with(REGEX, "a")
            .with(SKIP_LINES, " 2 ")
            .with(STOP, "False")
            .resolve()
            .unwrap();

        assert_eq!(config.delimiter, b';');
        assert_eq!(config.quote, b'\'');
        assert_eq!(config.skip_lines, 2);
        assert_eq!(config.empty_policy, EmptyPolicy::Continue);
    }

    #[test]
    fn test_non_integer_skip_lines() {
        let params = ParameterSet::new().with(REGEX, "a").with(SKIP_LINES, "two");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), SKIP_LINES);

        let params = ParameterSet::new().with(REGEX, "a").with(SKIP_LINES, "-1");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), SKIP_LINES);
    }

    #[test]
    fn test_bad_delimiter_and_quote() {
        let params = ParameterSet::new().with(REGEX, "a").with(DELIMITER, ",,");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), DELIMITER);

        let params = ParameterSet::new().with(REGEX, "a").with(DELIMITER, "");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), DELIMITER);

        let params = ParameterSet::new().with(REGEX, "a").with(QUOTECHAR, "§");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), QUOTECHAR);

        let params = ParameterSet::new().with(REGEX, "a").with(QUOTECHAR, ",");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), QUOTECHAR);
    }

    #[test]
    fn test_missing_or_invalid_regex() {
        assert_eq!(invalid_name(ParameterSet::new().resolve().unwrap_err()), REGEX);

        let params = ParameterSet::new().with(REGEX, "[");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), REGEX);
    }

    #[test]
    fn test_bad_stop_flag() {
        let params = ParameterSet::new().with(REGEX, "a").with(STOP, "maybe");
        assert_eq!(invalid_name(params.resolve().unwrap_err()), STOP);
    }

    #[test]
    fn test_rebind_from_upstream_row() {
        let mut params = ParameterSet::template();
        let rebound = params.rebind([("regex", "^other"), ("skip_lines", "1"), ("label", "x")]);

        assert_eq!(rebound, 2);
        assert_eq!(params.get(REGEX), Some("^other"));
        assert_eq!(params.get("label"), None);

        let config = params.resolve().unwrap();
        assert_eq!(config.skip_lines, 1);
        assert!(config.filter.matches("other.csv"));
    }

    #[test]
    fn test_apply_assignment() {
        let mut params = ParameterSet::template();
        params.apply_assignment("delimiter=;").unwrap();
        assert_eq!(params.get(DELIMITER), Some(";"));

        params.apply_assignment("regex=a=b").unwrap();
        assert_eq!(params.get(REGEX), Some("a=b"));

        assert!(params.apply_assignment("no-equals").is_err());
        assert!(params.apply_assignment("colour=red").is_err());
    }

    #[test]
    fn test_json_is_a_flat_map() {
        let params = ParameterSet::new().with(REGEX, "a").with(STOP, "false");
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"regex":"a","stop":"false"}"#);

        let back: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
