#![forbid(unsafe_code)]
//! grafiins-core library.
//!
//! Directed graphs and DAGs over slot-reusing entity arenas, with
//! reachability, cycle detection and CSV export.
//!
//! # Conventions
//!
//! - **Contract violations** (stale handles, empty query sets, DAG
//!   self-loops) panic.
//! - **Recoverable outcomes** are values: [`EdgeRejection`] and [`ExportError`].
//! - **Config loading** uses `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `debug!`, `trace!`). No
//!   subscriber is installed here.

pub mod arena;
pub mod config;
pub mod dag;
pub mod error;
pub mod export;
pub mod graph;
pub mod payload;

pub use arena::{Arena, Handle};
pub use config::{Config, ExportConfig, GraphConfig, QuoteMode};
pub use dag::Dag;
pub use error::{EdgeRejection, ErrorCode, ExportError};
pub use export::ExportSummary;
pub use graph::{EdgeId, Graph, VertexId};
pub use payload::{EdgeData, Fields, Serializable, VertexData};
