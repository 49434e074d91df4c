//! Progress reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One progress notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Number of files processed so far
    pub entity_count: usize,
    /// "file processed" or "files processed"
    pub operation_desc: String,
    /// When the report was produced
    pub timestamp: DateTime<Utc>,
}

impl ExecutionReport {
    /// Report for `count` processed files
    pub fn files_processed(count: usize) -> Self {
        let operation_desc = if count == 1 {
            "file processed"
        } else {
            "files processed"
        };
        Self {
            entity_count: count,
            operation_desc: operation_desc.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Human-readable line, e.g. "3 files processed"
    pub fn summary(&self) -> String {
        format!("{} {}", self.entity_count, self.operation_desc)
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_count, self.operation_desc)
    }
}

/// Receiver of progress notifications
pub trait ProgressSink {
    fn update(&mut self, report: ExecutionReport);
}

/// Keeps every report it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub reports: Vec<ExecutionReport>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent report, if any
    pub fn last(&self) -> Option<&ExecutionReport> {
        self.reports.last()
    }

    /// Counts of all received reports, in order
    pub fn counts(&self) -> Vec<usize> {
        self.reports.iter().map(|r| r.entity_count).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn update(&mut self, report: ExecutionReport) {
        self.reports.push(report);
    }
}

/// Forwards reports to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn update(&mut self, report: ExecutionReport) {
        tracing::info!(count = report.entity_count, "{}", report.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_and_plural() {
        assert_eq!(ExecutionReport::files_processed(0).summary(), "0 files processed");
        assert_eq!(ExecutionReport::files_processed(1).summary(), "1 file processed");
        assert_eq!(ExecutionReport::files_processed(2).summary(), "2 files processed");
    }

    #[test]
    fn test_display_matches_summary() {
        let report = ExecutionReport::files_processed(5);
        assert_eq!(report.to_string(), report.summary());
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.update(ExecutionReport::files_processed(1));
        sink.update(ExecutionReport::files_processed(2));

        assert_eq!(sink.counts(), vec![1, 2]);
        assert_eq!(sink.last().map(|r| r.operation_desc.as_str()), Some("files processed"));
    }
}
