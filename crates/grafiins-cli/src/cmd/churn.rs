//! `grafiins churn`: seeded random mutations against a graph or DAG.
//!
//! Each step picks one of add-vertex, remove-vertex, add-edge or remove-edge.
//! Removals and edge endpoints use `random_vertex` / `random_edge`, so slots
//! are freed and reused throughout the run. The same seed always produces
//! the same report.

use std::collections::BTreeMap;
use std::io::Write;

use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use grafiins_core::{Config, Dag, EdgeId, EdgeRejection, Graph, VertexId};

use crate::output::{OutputMode, render};

/// Arguments for `grafiins churn`.
#[derive(Args, Debug)]
pub struct ChurnArgs {
    /// RNG seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of mutation steps.
    #[arg(long, default_value_t = 1_000)]
    pub steps: usize,

    /// Keep the edge set acyclic.
    #[arg(long)]
    pub dag: bool,

    /// Accept parallel edges (overrides `graph.allow_parallel_edges`).
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug, Default, Serialize)]
struct Counts {
    vertices_added: usize,
    vertices_removed: usize,
    edges_added: usize,
    edges_removed: usize,
    self_loops_skipped: usize,
}

#[derive(Debug, Serialize)]
struct ChurnReport {
    seed: u64,
    steps: usize,
    dag: bool,
    allow_parallel_edges: bool,
    vertices: usize,
    edges: usize,
    counts: Counts,
    /// Rejected edge insertions keyed by error code.
    rejections: BTreeMap<String, usize>,
    cyclic: bool,
    cycle: Option<Vec<String>>,
}

/// Graph under churn: plain or acyclic.
enum Target {
    Graph(Graph<(), ()>),
    Dag(Dag<(), ()>),
}

impl Target {
    const fn graph(&self) -> &Graph<(), ()> {
        match self {
            Self::Graph(graph) => graph,
            Self::Dag(dag) => dag.as_graph(),
        }
    }

    fn add_vertex(&mut self) -> VertexId {
        match self {
            Self::Graph(graph) => graph.add_vertex(()),
            Self::Dag(dag) => dag.add_vertex(()),
        }
    }

    fn remove_vertex(&mut self, vertex: VertexId) {
        match self {
            Self::Graph(graph) => graph.remove_vertex(vertex),
            Self::Dag(dag) => dag.remove_vertex(vertex),
        }
    }

    fn insert_edge(&mut self, src: VertexId, dst: VertexId) -> Result<EdgeId, EdgeRejection> {
        match self {
            Self::Graph(graph) => graph.insert_edge(src, dst, ()),
            Self::Dag(dag) => dag.insert_edge(src, dst, ()),
        }
    }

    fn remove_edge(&mut self, edge: EdgeId) {
        match self {
            Self::Graph(graph) => graph.remove_edge(edge),
            Self::Dag(dag) => dag.remove_edge(edge),
        }
    }
}

/// Execute `grafiins churn`.
pub fn run_churn(args: &ChurnArgs, config: &Config, output: OutputMode) -> anyhow::Result<()> {
    let report = churn(args, config);
    info!(
        seed = report.seed,
        steps = report.steps,
        vertices = report.vertices,
        edges = report.edges,
        "churn finished"
    );
    render(output, &report, render_churn_human)
}

fn churn(args: &ChurnArgs, config: &Config) -> ChurnReport {
    let allow_parallel_edges = args.parallel || config.graph.allow_parallel_edges;
    let mut target = if args.dag {
        Target::Dag(Dag::with_parallel_edges(allow_parallel_edges))
    } else {
        Target::Graph(Graph::with_parallel_edges(allow_parallel_edges))
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut counts = Counts::default();
    let mut rejections: BTreeMap<String, usize> = BTreeMap::new();

    for _ in 0..args.steps {
        match rng.gen_range(0..10) {
            // Grow vertices a little faster than they are removed.
            0..=2 => {
                target.add_vertex();
                counts.vertices_added += 1;
            }
            3 => {
                if let Some(vertex) = target.graph().random_vertex(&mut rng) {
                    target.remove_vertex(vertex);
                    counts.vertices_removed += 1;
                }
            }
            4..=7 => {
                let graph = target.graph();
                let (Some(src), Some(dst)) =
                    (graph.random_vertex(&mut rng), graph.random_vertex(&mut rng))
                else {
                    continue;
                };
                // Self-loops are a contract violation for a DAG.
                if args.dag && src == dst {
                    counts.self_loops_skipped += 1;
                    continue;
                }
                match target.insert_edge(src, dst) {
                    Ok(_) => counts.edges_added += 1,
                    Err(rejection) => {
                        debug!(%rejection, "edge rejected");
                        *rejections.entry(rejection.code().code().to_string()).or_default() += 1;
                    }
                }
            }
            _ => {
                if let Some(edge) = target.graph().random_edge(&mut rng) {
                    target.remove_edge(edge);
                    counts.edges_removed += 1;
                }
            }
        }
    }

    let graph = target.graph();
    graph.debug_validate_invariants();
    let cycle = graph.find_cycle();

    ChurnReport {
        seed: args.seed,
        steps: args.steps,
        dag: args.dag,
        allow_parallel_edges,
        vertices: graph.n_vertices(),
        edges: graph.n_edges(),
        counts,
        rejections,
        cyclic: cycle.is_some(),
        cycle: cycle.map(|c| c.iter().map(ToString::to_string).collect()),
    }
}

fn render_churn_human(report: &ChurnReport, w: &mut dyn Write) -> std::io::Result<()> {
    let kind = if report.dag { "dag" } else { "graph" };
    writeln!(
        w,
        "Churned {kind} for {} steps (seed {})",
        report.steps, report.seed
    )?;
    writeln!(w, "  vertices:  {}", report.vertices)?;
    writeln!(w, "  edges:     {}", report.edges)?;
    writeln!(
        w,
        "  added:     {} vertices, {} edges",
        report.counts.vertices_added, report.counts.edges_added
    )?;
    writeln!(
        w,
        "  removed:   {} vertices, {} edges",
        report.counts.vertices_removed, report.counts.edges_removed
    )?;
    for (code, count) in &report.rejections {
        writeln!(w, "  rejected:  {count} ({code})")?;
    }
    match &report.cycle {
        Some(cycle) => writeln!(w, "  cyclic:    yes ({})", cycle.join(" -> "))?,
        None => writeln!(w, "  cyclic:    no")?,
    }
    Ok(())
}
