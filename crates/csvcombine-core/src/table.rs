//! Output model for a combined dataset

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Type URI attached to every combined schema
pub const ROW_TYPE_URI: &str = "urn:row";

/// Ordered column names of a combined dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Type of every entity in the dataset
    pub type_uri: String,
    /// Column names, in header order
    pub paths: Vec<String>,
}

impl EntitySchema {
    /// Create a schema over the given header
    pub fn new(paths: Vec<String>) -> Self {
        Self {
            type_uri: ROW_TYPE_URI.to_string(),
            paths,
        }
    }

    /// Schema without columns
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Find the position of a column by name
    pub fn find_path(&self, name: &str) -> Option<usize> {
        self.paths.iter().position(|p| p == name)
    }
}

/// One output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Synthetic identifier, `urn:<n>`
    pub uri: String,
    /// One value list per column; always a single value here
    pub values: Vec<Vec<String>>,
}

impl Entity {
    /// Build the `index`-th (1-origin) entity from a normalized row
    pub fn from_row(index: usize, row: Vec<String>) -> Self {
        Self {
            uri: format!("urn:{}", index),
            values: row.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// Get the first value of a column
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Flatten back into a plain row
    pub fn row_values(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.first().cloned().unwrap_or_default())
            .collect()
    }
}

/// The schema-tagged row collection produced by a combine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedResult {
    /// Column names
    pub schema: EntitySchema,
    /// Deduplicated rows
    pub entities: Vec<Entity>,
}

impl CombinedResult {
    /// Result with no header and no rows
    pub fn empty() -> Self {
        Self::with_header(Vec::new())
    }

    /// Result with a header but no rows
    pub fn with_header(header: Vec<String>) -> Self {
        Self {
            schema: EntitySchema::new(header),
            entities: Vec::new(),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.schema.paths.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Find an entity by its URI
    pub fn find_entity(&self, uri: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.uri == uri)
    }

    /// Write header and rows as delimited text
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        if !self.schema.paths.is_empty() {
            csv_writer.write_record(&self.schema.paths).map_err(std::io::Error::from)?;
        }
        for entity in &self.entities {
            csv_writer.write_record(entity.row_values()).map_err(std::io::Error::from)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
