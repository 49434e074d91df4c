//! Delimited text parser producing raw, untrimmed tables

use crate::error::{Error, Result};

/// Parsed content of one resource, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Physical records in file order
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Get the number of records
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Trimmed cells of the record at `skip_lines`
    ///
    /// A table without a record at that index yields an empty header.
    pub fn header_at(&self, skip_lines: usize) -> Vec<String> {
        self.rows
            .get(skip_lines)
            .map(|row| trim_cells(row))
            .unwrap_or_default()
    }

    /// Trimmed records strictly after the header at `skip_lines`
    ///
    /// Each row comes with its 0-origin record index. Blank lines carry no
    /// cells and are not data.
    pub fn data_rows_after(
        &self,
        skip_lines: usize,
    ) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(skip_lines.saturating_add(1))
            .filter(|(_, row)| !row.is_empty())
            .map(|(idx, row)| (idx, trim_cells(row)))
    }
}

fn trim_cells(row: &[String]) -> Vec<String> {
    row.iter().map(|c| c.trim().to_string()).collect()
}

/// Parse delimited text into a RawTable
///
/// Quoting follows the usual CSV rules: quoted fields may contain the
/// delimiter and line breaks, and a doubled quote character is a literal one.
/// Blank lines are kept as rows without cells so that record indexes match
/// the physical layout of the file.
pub fn parse_table(content: &str, delimiter: u8, quote: u8, source_name: &str) -> Result<RawTable> {
    let bytes = content.as_bytes();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quote(quote)
        .double_quote(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut prev_end = 0usize;
    while csv_reader.read_record(&mut record).map_err(|e| Error::Csv {
        resource: source_name.to_string(),
        source: e,
    })? {
        let end = (csv_reader.position().byte() as usize).min(bytes.len());
        let mut gap = &bytes[prev_end.min(end)..end];
        // a record ending in `\r` leaves the `\n` of its CRLF for the next read
        if prev_end > 0 && bytes[prev_end - 1] == b'\r' {
            gap = gap.strip_prefix(b"\n").unwrap_or(gap);
        }
        for _ in 0..leading_line_breaks(gap) {
            rows.push(Vec::new());
        }
        rows.push(record.iter().map(str::to_string).collect());
        prev_end = end;
    }

    Ok(RawTable { rows })
}

/// Count the `\n`, `\r\n` or `\r` line breaks before the first other byte
fn leading_line_breaks(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\n' => i += 1,
            _ => break,
        }
        count += 1;
    }
    count
}

/// Parse comma-separated, double-quoted text (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<RawTable> {
    parse_table(content, b',', b'"', source_name)
}
