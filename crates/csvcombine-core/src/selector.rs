//! Resource selection by file name pattern

use crate::error::{Error, Result};
use crate::resource::ResourceRef;
use regex::Regex;

/// A compiled name filter
///
/// The pattern is matched from the start of the resource name, but need not
/// consume the whole name: `data` matches `data-2024.csv`, `2024` does not.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pattern: String,
    regex: Regex,
}

impl ResourceFilter {
    /// Compile a filter from a regular expression
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| Error::invalid_parameter("regex", e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given by the caller
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a resource name satisfies the filter
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Keep the matching resources, preserving catalog order
    pub fn select(&self, catalog: &[ResourceRef]) -> Vec<ResourceRef> {
        let selected: Vec<ResourceRef> = catalog
            .iter()
            .filter(|r| self.matches(&r.name))
            .cloned()
            .collect();
        tracing::debug!(
            pattern = self.pattern.as_str(),
            catalog = catalog.len(),
            selected = selected.len(),
            "selected resources"
        );
        selected
    }
}

/// Compile `pattern` and select the matching resources from `catalog`
pub fn select(pattern: &str, catalog: &[ResourceRef]) -> Result<Vec<ResourceRef>> {
    Ok(ResourceFilter::new(pattern)?.select(catalog))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ResourceRef> {
        vec![
            ResourceRef::new("p", "test-csv-one.csv"),
            ResourceRef::new("p", "other.txt"),
            ResourceRef::new("q", "test-csv-two.csv"),
            ResourceRef::new("p", "my-test-csv.csv"),
        ]
    }

    #[test]
    fn test_select_preserves_catalog_order() {
        let selected = select("test-csv", &catalog()).unwrap();
        let names: Vec<&str> = selected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["test-csv-one.csv", "test-csv-two.csv"]);
    }

    #[test]
    fn test_match_is_anchored_at_start_only() {
        let filter = ResourceFilter::new("test").unwrap();
        assert!(filter.matches("test-csv-one.csv"));
        assert!(!filter.matches("my-test-csv.csv"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let filter = ResourceFilter::new("a|b").unwrap();
        assert!(filter.matches("a.csv"));
        assert!(filter.matches("b.csv"));
        assert!(!filter.matches("cb.csv"));
    }

    #[test]
    fn test_explicit_anchors() {
        let selected = select("^test-csv.{4}\\.csv$", &catalog()).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert!(select("none", &catalog()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = select("(unclosed", &catalog()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name, .. } if name == "regex"));
    }
}
