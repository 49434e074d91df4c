//! csvcombine-core: Core library for combining CSV resources into one dataset
//!
//! This library provides functionality to:
//! - List resources from a store and select them by a file name regex
//! - Parse delimited text with configurable delimiter and quote character
//! - Enforce that every selected file shares the header of the first one
//! - Normalize and deduplicate rows across all files
//! - Report progress once per processed file

pub mod combiner;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod resource;
pub mod selector;
pub mod table;
pub mod task;

pub use combiner::{combine, deduplicate};
pub use config::{CombineConfig, EmptyPolicy, ParameterSet};
pub use error::{Error, Result};
pub use parser::{parse_csv_str, parse_table, RawTable};
pub use report::{ExecutionReport, LogSink, ProgressSink, RecordingSink};
pub use resource::{DirectoryStore, MemoryStore, ResourceRef, ResourceStore, Session};
pub use selector::{select, ResourceFilter};
pub use table::{CombinedResult, Entity, EntitySchema};
pub use task::CsvCombineTask;
