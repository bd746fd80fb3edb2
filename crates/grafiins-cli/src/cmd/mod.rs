pub mod churn;
pub mod demo;

use grafiins_core::{ExportError, ExportSummary};

use crate::output::{CliError, OutputMode, render_error};

/// Report an export failure with its stable code, then turn it into an `anyhow` error.
pub fn export_failed(output: OutputMode, err: ExportError) -> anyhow::Error {
    let cli_error = CliError::from_code(err.to_string(), err.code());
    if let Err(render_err) = render_error(output, &cli_error) {
        return render_err;
    }
    anyhow::Error::new(err).context("csv export failed")
}

/// Serializable view of an [`ExportSummary`].
#[derive(Debug, serde::Serialize)]
pub struct ExportReport {
    pub vertex_path: String,
    pub edge_path: String,
    pub vertex_rows: usize,
    pub edge_rows: usize,
}

impl From<ExportSummary> for ExportReport {
    fn from(summary: ExportSummary) -> Self {
        Self {
            vertex_path: summary.vertex_path.display().to_string(),
            edge_path: summary.edge_path.display().to_string(),
            vertex_rows: summary.vertex_rows,
            edge_rows: summary.edge_rows,
        }
    }
}
