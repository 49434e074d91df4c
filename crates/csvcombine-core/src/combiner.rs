//! Combine engine: header validation, row normalization, and deduplication

use crate::config::CombineConfig;
use crate::error::{Error, Result};
use crate::parser::parse_table;
use crate::report::{ExecutionReport, ProgressSink};
use crate::resource::{ResourceRef, ResourceStore, Session};
use crate::table::{CombinedResult, Entity, EntitySchema};
use std::collections::HashSet;

/// Combine the given resources into one deduplicated dataset
///
/// Resources are processed strictly in order. The header of the first
/// resource becomes the header of the result; any later resource with a
/// different header aborts the run. The sink is notified once per resource.
pub fn combine(
    resources: &[ResourceRef],
    config: &CombineConfig,
    session: &Session,
    store: &dyn ResourceStore,
    sink: &mut dyn ProgressSink,
) -> Result<CombinedResult> {
    if resources.is_empty() {
        if config.empty_policy.is_stop() {
            return Err(Error::NoInputFiles);
        }
        tracing::info!("no input files found, returning empty result");
        return Ok(CombinedResult::empty());
    }

    let mut header: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (i, resource) in resources.iter().enumerate() {
        tracing::info!("adding file {}", resource.name);

        let bytes = store.fetch_resource(session, resource)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| Error::Decode {
            resource: resource.name.clone(),
            source: e,
        })?;
        let table = parse_table(text, config.delimiter, config.quote, &resource.name)?;

        let candidate = table.header_at(config.skip_lines);
        if i == 0 {
            header = candidate;
        } else if candidate != header {
            return Err(Error::InconsistentHeader {
                resource: resource.name.clone(),
            });
        }

        let before = rows.len();
        for (record_idx, row) in table.data_rows_after(config.skip_lines) {
            rows.push(fit_to_header(row, header.len(), resource, record_idx)?);
        }
        tracing::debug!(
            resource = %resource,
            rows = rows.len() - before,
            "folded rows"
        );

        sink.update(ExecutionReport::files_processed(i + 1));
    }

    let unique = deduplicate(rows);

    if unique.is_empty() {
        if config.empty_policy.is_stop() {
            return Err(Error::NoRowsProduced);
        }
        tracing::info!("no rows found in input files, returning empty result");
        return Ok(CombinedResult::with_header(header));
    }

    let entities = unique
        .into_iter()
        .enumerate()
        .map(|(i, row)| Entity::from_row(i + 1, row))
        .collect();

    Ok(CombinedResult {
        schema: EntitySchema::new(header),
        entities,
    })
}

/// Drop structurally equal rows
///
/// Survivors come back in first-seen order; callers must not rely on it.
pub fn deduplicate(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    let mut unique = Vec::new();
    for row in rows {
        if !seen.contains(&row) {
            seen.insert(row.clone());
            unique.push(row);
        }
    }
    unique
}

/// Pad short rows with empty cells; rows wider than the header are an error
fn fit_to_header(
    mut row: Vec<String>,
    width: usize,
    resource: &ResourceRef,
    record_idx: usize,
) -> Result<Vec<String>> {
    if row.len() > width {
        return Err(Error::RowTooWide {
            resource: resource.name.clone(),
            row: record_idx + 1,
            cells: row.len(),
            columns: width,
        });
    }
    if row.len() < width {
        tracing::warn!(
            resource = %resource,
            row = record_idx + 1,
            cells = row.len(),
            columns = width,
            "row shorter than header, padding with empty cells"
        );
        row.resize(width, String::new());
    }
    Ok(row)
}
