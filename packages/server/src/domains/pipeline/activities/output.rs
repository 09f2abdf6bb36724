use anyhow::{Context, Result};
use foundry_client::Table;

use crate::domains::pipeline::matching::select_matching_rows;
use crate::domains::pipeline::{DatasetKey, MatchTarget, PipelineError};
use crate::kernel::ServerDeps;

/// One-shot read of an output table filtered by organization or file name.
///
/// Unlike polling, a table whose columns cannot be matched is an error here.
pub async fn output_rows(
    deps: &ServerDeps,
    dataset: DatasetKey,
    file_name: Option<String>,
    org_name: Option<String>,
) -> Result<Table> {
    let rid = dataset.rid(&deps.pipeline.datasets);
    let table = deps
        .platform
        .read_table(rid)
        .await
        .with_context(|| format!("Failed to read {} output", dataset))?;

    let target = MatchTarget::default()
        .with_file_name(file_name)
        .with_org_name(org_name);
    let rows = select_matching_rows(&dataset.schema(), &table, &target).map_err(PipelineError::from)?;

    tracing::info!(dataset = %dataset, rows = rows.len(), "Dataset located");
    Ok(rows)
}
