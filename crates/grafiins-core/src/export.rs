//! CSV export of the vertex and edge tables.
//!
//! # Format
//!
//! ```text
//! vertex_i,label,graphviz_shape,...      edge_i,src_vertex_i,dst_vertex_i,label
//! 0,v0,circle,...                        0,3,4,e0
//! 2,v2,circle,...                        1,1,2,e1
//! ```
//!
//! - The first column is the handle's slot index.
//! - Remaining columns come from the payload's [`Serializable::fields`];
//!   the header is derived from `Default::default()`.
//! - Edge tables always carry `src_vertex_i` and `dst_vertex_i` before the
//!   payload columns.
//! - Rows are in ascending handle order.
//! - Values are quoted according to [`QuoteMode`].

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{ExportConfig, QuoteMode};
use crate::error::ExportError;
use crate::graph::Graph;
use crate::payload::{Fields, Serializable};

/// Files written by [`to_csv_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub vertex_path: PathBuf,
    pub edge_path: PathBuf,
    pub vertex_rows: usize,
    pub edge_rows: usize,
}

/// Write the vertex table to `writer`. Returns the number of data rows.
///
/// # Errors
///
/// Fails on I/O errors, an invalid delimiter, or a payload whose fields
/// differ from the default-derived schema.
pub fn write_vertices<V, E, W>(
    graph: &Graph<V, E>,
    config: &ExportConfig,
    writer: W,
) -> Result<usize, ExportError>
where
    V: Serializable,
    W: io::Write,
{
    let rows = graph
        .vertex_rows()
        .into_iter()
        .map(|(vertex, fields)| (vertex.index(), fields));
    write_table(
        csv_writer(config, writer)?,
        "vertex",
        &config.vertex_handle_column,
        &V::field_names(),
        rows,
    )
}

/// Write the edge table to `writer`. Returns the number of data rows.
///
/// # Errors
///
/// Fails on I/O errors, an invalid delimiter, or a payload whose fields
/// differ from the default-derived schema.
pub fn write_edges<V, E, W>(
    graph: &Graph<V, E>,
    config: &ExportConfig,
    writer: W,
) -> Result<usize, ExportError>
where
    E: Serializable,
    W: io::Write,
{
    let rows = graph
        .edge_rows()
        .into_iter()
        .map(|(edge, fields)| (edge.index(), fields));
    write_table(
        csv_writer(config, writer)?,
        "edge",
        &config.edge_handle_column,
        &Graph::<V, E>::edge_field_names(),
        rows,
    )
}

/// Write both tables into `dir` using the file names from `config`.
///
/// # Errors
///
/// Fails if either file cannot be created or written.
pub fn to_csv_files<V, E>(
    graph: &Graph<V, E>,
    config: &ExportConfig,
    dir: &Path,
) -> Result<ExportSummary, ExportError>
where
    V: Serializable,
    E: Serializable,
{
    let vertex_path = dir.join(&config.vertex_file);
    let edge_path = dir.join(&config.edge_file);

    let vertex_rows = write_vertices(graph, config, create(&vertex_path)?)?;
    let edge_rows = write_edges(graph, config, create(&edge_path)?)?;

    info!(
        vertices = vertex_rows,
        edges = edge_rows,
        vertex_path = %vertex_path.display(),
        edge_path = %edge_path.display(),
        "exported graph to csv"
    );

    Ok(ExportSummary {
        vertex_path,
        edge_path,
        vertex_rows,
        edge_rows,
    })
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Create {
            path: path.to_path_buf(),
            source,
        })
}

fn csv_writer<W: io::Write>(
    config: &ExportConfig,
    writer: W,
) -> Result<csv::Writer<W>, ExportError> {
    let delimiter = u8::try_from(config.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(ExportError::InvalidDelimiter(config.delimiter))?;

    let quote_style = match config.quote {
        QuoteMode::Necessary => csv::QuoteStyle::Necessary,
        QuoteMode::Always => csv::QuoteStyle::Always,
        QuoteMode::Never => csv::QuoteStyle::Never,
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(quote_style)
        .from_writer(writer))
}

fn write_table<W: io::Write>(
    mut writer: csv::Writer<W>,
    table: &'static str,
    handle_column: &str,
    schema: &[String],
    rows: impl Iterator<Item = (usize, Fields)>,
) -> Result<usize, ExportError> {
    writer.write_record(std::iter::once(handle_column).chain(schema.iter().map(String::as_str)))?;

    let mut written = 0;
    for (handle, fields) in rows {
        let matches_schema = fields.len() == schema.len()
            && fields.iter().zip(schema).all(|((name, _), expected)| name == expected);
        if !matches_schema {
            return Err(ExportError::SchemaMismatch {
                table,
                handle,
                expected: schema.join(","),
                actual: fields
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }

        let handle = handle.to_string();
        writer.write_record(
            std::iter::once(handle.as_str()).chain(fields.iter().map(|(_, value)| value.as_str())),
        )?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
