//! End-to-end combine task: catalog lookup, selection, and combining

use crate::combiner::combine;
use crate::config::CombineConfig;
use crate::error::Result;
use crate::report::{ExecutionReport, ProgressSink};
use crate::resource::{ResourceRef, ResourceStore, Session};
use crate::table::CombinedResult;

/// A configured combine run
#[derive(Debug, Clone)]
pub struct CsvCombineTask {
    config: CombineConfig,
}

impl CsvCombineTask {
    pub fn new(config: CombineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Resources in the store's catalog that the filter selects
    pub fn matching_resources(
        &self,
        store: &dyn ResourceStore,
        session: &Session,
    ) -> Result<Vec<ResourceRef>> {
        let catalog = store.list_resources(session)?;
        Ok(self.config.filter.select(&catalog))
    }

    /// Run the whole combine operation
    pub fn execute(
        &self,
        store: &dyn ResourceStore,
        session: &Session,
        sink: &mut dyn ProgressSink,
    ) -> Result<CombinedResult> {
        sink.update(ExecutionReport::files_processed(0));
        if let Some(user) = &session.user {
            tracing::debug!(user = %user, "running combine task");
        }

        let resources = self.matching_resources(store, session)?;
        let result = combine(&resources, &self.config, session, store, sink)?;

        tracing::info!(
            files = resources.len(),
            columns = result.column_count(),
            rows = result.row_count(),
            "combined CSV files"
        );
        Ok(result)
    }
}
