//! `grafiins demo`: build the 14-vertex reference graph, query it, export it.
//!
//! Vertices 1, 5, 6, 7, 10 and 12 are tagged as inputs, 0 and 4 as outputs.
//! The graph is acyclic until the extra edge `v3 -> v10` closes
//! `v3 -> v10 -> v11 -> v9 -> v3`.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use grafiins_core::error::format_path;
use grafiins_core::{Config, EdgeData, Graph, VertexData, VertexId, export};

use super::{ExportReport, export_failed};
use crate::output::{OutputMode, render};

/// Arguments for `grafiins demo`.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Directory that receives the vertex and edge CSV files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

const INPUTS: [usize; 6] = [1, 5, 6, 7, 10, 12];
const OUTPUTS: [usize; 2] = [0, 4];

/// `(sources, targets)` pairs checked by the demo.
const REACH_CHECKS: [(&[usize], &[usize]); 11] = [
    (&[9], &[9]),
    (&[6], &[4]),
    (&[6], &[3]),
    (&[7], &[3, 9]),
    (&[7], &[0, 3, 9]),
    (&[7], &[10, 0]),
    (&[8], &[7]),
    (&[13, 7, 5], &[4]),
    (&[13, 7, 5], &[4, 0]),
    (&[13, 7, 5], &[6]),
    (&[2, 8], &[0]),
];

#[derive(Debug, Serialize)]
struct ReachCheck {
    sources: Vec<String>,
    targets: Vec<String>,
    connected: bool,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    vertices: usize,
    edges: usize,
    reachability: Vec<ReachCheck>,
    cyclic_before: bool,
    cyclic_with_extra_edge: bool,
    cycle: Option<Vec<String>>,
    cyclic_after_removal: bool,
    export: ExportReport,
}

/// Execute `grafiins demo`.
pub fn run_demo(args: &DemoArgs, config: &Config, output: OutputMode) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let (mut graph, v) = reference_graph(config);

    let reachability = REACH_CHECKS
        .iter()
        .map(|(sources, targets)| {
            let sources = pick(&v, sources);
            let targets = pick(&v, targets);
            ReachCheck {
                connected: graph.are_connected_any(&sources, &targets),
                sources: names(&sources),
                targets: names(&targets),
            }
        })
        .collect();

    let cyclic_before = graph.is_cyclic();
    let extra = graph.add_edge(v[3], v[10], EdgeData::new("cyclic edge!"));
    let cyclic_with_extra_edge = graph.is_cyclic();
    let cycle = graph.find_cycle();
    if let Some(cycle) = &cycle {
        debug!(cycle = %format_path(cycle), "extra edge closes a cycle");
    }
    if let Some(edge) = extra {
        graph.remove_edge(edge);
    }
    let cyclic_after_removal = graph.is_cyclic();

    let summary = export::to_csv_files(&graph, &config.export, &args.out_dir)
        .map_err(|err| export_failed(output, err))?;

    let report = DemoReport {
        vertices: graph.n_vertices(),
        edges: graph.n_edges(),
        reachability,
        cyclic_before,
        cyclic_with_extra_edge,
        cycle: cycle.as_deref().map(|c| c.iter().map(ToString::to_string).collect()),
        cyclic_after_removal,
        export: summary.into(),
    };

    render(output, &report, render_demo_human)
}

/// Build the reference graph. `v[i]` is the vertex labelled `v{i}`.
///
/// Slot 0 is freed and reused, and edges `e0`/`e1` are removed and their
/// slots handed out again, so the exported indices show slot reuse.
fn reference_graph(config: &Config) -> (Graph<VertexData, EdgeData>, Vec<VertexId>) {
    let mut g = Graph::from_config(&config.graph);

    let v0 = g.add_vertex(VertexData::new("v0"));
    let v1 = g.add_vertex(VertexData::new("v1"));
    g.remove_vertex(v0);
    let v0 = g.add_vertex(VertexData::new("v0"));
    let v2 = g.add_vertex(VertexData::new("v2"));
    let v3 = g.add_vertex(VertexData::new("v3"));

    let e0 = g.add_edge(v0, v1, EdgeData::new("e0"));
    let e1 = g.add_edge(v1, v2, EdgeData::new("e1"));
    g.add_edge(v2, v3, EdgeData::new("e2"));
    for edge in [e0, e1].into_iter().flatten() {
        g.remove_edge(edge);
    }

    let mut v = vec![v0, v1, v2, v3];
    v.extend((4..14).map(|i| g.add_vertex(VertexData::new(format!("v{i}")))));

    for (src, dst, label) in [
        (3, 4, "e0"),
        (1, 2, "e1"),
        (5, 0, "e3"),
        (6, 3, "e4"),
        (7, 8, "e5"),
        (8, 9, "e6"),
        (9, 3, "e7"),
        (10, 11, "e8"),
        (11, 9, "e9"),
        (12, 11, "e10"),
    ] {
        g.add_edge(v[src], v[dst], EdgeData::new(label));
    }

    for (indices, cluster) in [(&INPUTS[..], "inputs"), (&OUTPUTS[..], "outputs")] {
        for &i in indices {
            let vertex = g.vertex_mut(v[i]);
            vertex.graphviz_shape = "doublecircle".to_string();
            vertex.graphviz_width = 0.4;
            vertex.graphviz_cluster = cluster.to_string();
        }
    }

    (g, v)
}

fn pick(v: &[VertexId], indices: &[usize]) -> BTreeSet<VertexId> {
    indices.iter().map(|&i| v[i]).collect()
}

fn names(set: &BTreeSet<VertexId>) -> Vec<String> {
    set.iter().map(ToString::to_string).collect()
}

fn render_demo_human(report: &DemoReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Reference graph: {} vertices, {} edges", report.vertices, report.edges)?;

    writeln!(w, "\nReachability")?;
    for check in &report.reachability {
        writeln!(
            w,
            "  {{{}}} -> {{{}}}: {}",
            check.sources.join(", "),
            check.targets.join(", "),
            if check.connected { "connected" } else { "not connected" }
        )?;
    }

    writeln!(w, "\nCycles")?;
    writeln!(w, "  initial:          {}", cyclicity(report.cyclic_before))?;
    writeln!(w, "  with v3 -> v10:   {}", cyclicity(report.cyclic_with_extra_edge))?;
    if let Some(cycle) = &report.cycle {
        writeln!(w, "  cycle:            {}", cycle.join(" -> "))?;
    }
    writeln!(w, "  after removal:    {}", cyclicity(report.cyclic_after_removal))?;

    writeln!(w, "\nExport")?;
    writeln!(w, "  {} ({} rows)", report.export.vertex_path, report.export.vertex_rows)?;
    writeln!(w, "  {} ({} rows)", report.export.edge_path, report.export.edge_rows)?;
    Ok(())
}

const fn cyclicity(value: bool) -> &'static str {
    if value { "cyclic" } else { "acyclic" }
}
