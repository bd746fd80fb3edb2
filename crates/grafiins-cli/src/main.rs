#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use grafiins_core::ErrorCode;
use grafiins_core::config::resolve_config;
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "grafiins",
    author,
    version,
    about = "grafiins: directed graphs and DAGs over generational arenas",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of `./grafiins.toml` and the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Build the reference graph, run reachability and cycle checks, export CSV",
        after_help = "EXAMPLES:\n    grafiins demo --out-dir ./out\n\n    grafiins --json demo --out-dir ./out"
    )]
    Demo(cmd::demo::DemoArgs),

    #[command(
        about = "Apply seeded random mutations and report the resulting graph",
        after_help = "EXAMPLES:\n    grafiins churn --seed 7 --steps 500\n\n    # Keep the graph acyclic\n    grafiins churn --seed 7 --steps 500 --dag"
    )]
    Churn(cmd::churn::ChurnArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GRAFIINS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "grafiins=debug,grafiins_core=debug,info"
        } else {
            "grafiins=info,grafiins_core=info,warn"
        })
    });

    let format = env::var("GRAFIINS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let working_dir = env::current_dir()?;
    let config = match resolve_config(cli.config.as_deref(), &working_dir) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };

    match cli.command {
        Commands::Demo(ref args) => cmd::demo::run_demo(args, &config, output),
        Commands::Churn(ref args) => cmd::churn::run_churn(args, &config, output),
    }
}
