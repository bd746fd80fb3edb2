//! Error and rejection types.
//!
//! Two classes of failure exist:
//!
//! - **Contract violations** (stale handle, empty reachability set, DAG
//!   self-loop) are caller bugs and panic at the call site.
//! - **Recoverable outcomes** are returned as values: [`EdgeRejection`] when
//!   an edge insertion is refused, [`ExportError`] when writing a table fails.
//!
//! Every recoverable failure maps to a stable [`ErrorCode`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::graph::VertexId;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ParallelEdge,
    CycleDetected,
    ExportWriteFailed,
    ExportSchemaMismatch,
    InvalidDelimiter,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ParallelEdge => "E2001",
            Self::CycleDetected => "E2002",
            Self::ExportWriteFailed => "E5001",
            Self::ExportSchemaMismatch => "E5002",
            Self::InvalidDelimiter => "E5003",
        }
    }

    /// Short human-facing summary.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ParallelEdge => "Parallel edge rejected",
            Self::CycleDetected => "Cycle would be created",
            Self::ExportWriteFailed => "Export write failed",
            Self::ExportSchemaMismatch => "Payload fields differ from the export schema",
            Self::InvalidDelimiter => "Invalid export delimiter",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in grafiins.toml and retry."),
            Self::ParallelEdge => {
                Some("Enable `allow_parallel_edges` or reuse the existing edge.")
            }
            Self::CycleDetected => Some("Remove or reverse an edge on the reported cycle."),
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
            Self::ExportSchemaMismatch => {
                Some("Payload `fields()` must return the same names in the same order every call.")
            }
            Self::InvalidDelimiter => Some("Use a single ASCII character such as ',' or ';'."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why an edge insertion was refused. The graph is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdgeRejection {
    #[error("edge {src} -> {dst} rejected: parallel edges are not allowed")]
    ParallelEdge { src: VertexId, dst: VertexId },

    /// `cycle` is the closed path the edge would have created, starting and
    /// ending at `src`.
    #[error("edge {src} -> {dst} rejected: it would close the cycle {}", format_path(.cycle))]
    WouldCreateCycle {
        src: VertexId,
        dst: VertexId,
        cycle: Vec<VertexId>,
    },
}

impl EdgeRejection {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ParallelEdge { .. } => ErrorCode::ParallelEdge,
            Self::WouldCreateCycle { .. } => ErrorCode::CycleDetected,
        }
    }
}

/// Failure while writing an export table.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("export write failed: {0}")]
    Io(#[from] io::Error),

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table} row {handle} has fields [{actual}], schema is [{expected}]")]
    SchemaMismatch {
        table: &'static str,
        handle: usize,
        expected: String,
        actual: String,
    },

    #[error("delimiter {0:?} is not a single ASCII character")]
    InvalidDelimiter(char),
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Create { .. } | Self::Io(_) | Self::Csv(_) => ErrorCode::ExportWriteFailed,
            Self::SchemaMismatch { .. } => ErrorCode::ExportSchemaMismatch,
            Self::InvalidDelimiter(_) => ErrorCode::InvalidDelimiter,
        }
    }
}

/// Render a vertex path as `v0 -> v1 -> v0`.
#[must_use]
pub fn format_path(path: &[VertexId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
