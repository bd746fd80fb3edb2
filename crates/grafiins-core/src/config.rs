use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "grafiins.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub allow_parallel_edges: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_vertex_file")]
    pub vertex_file: PathBuf,
    #[serde(default = "default_edge_file")]
    pub edge_file: PathBuf,
    #[serde(default = "default_vertex_handle_column")]
    pub vertex_handle_column: String,
    #[serde(default = "default_edge_handle_column")]
    pub edge_handle_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub quote: QuoteMode,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            vertex_file: default_vertex_file(),
            edge_file: default_edge_file(),
            vertex_handle_column: default_vertex_handle_column(),
            edge_handle_column: default_edge_handle_column(),
            delimiter: default_delimiter(),
            quote: QuoteMode::default(),
        }
    }
}

/// When exported cell values are wrapped in quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteMode {
    /// Quote only values containing the delimiter, a quote or a newline.
    #[default]
    Necessary,
    Always,
    /// Write values verbatim. Output is ambiguous if a value holds the delimiter.
    Never,
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(path)
}

/// Load `<config_dir>/grafiins/config.toml`, or the defaults if absent.
pub fn load_user_config() -> Result<Config> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };
    load_config(&config_dir.join("grafiins/config.toml"))
}

/// Resolve the effective config.
///
/// Precedence (highest wins):
/// 1. `explicit` path (must exist)
/// 2. `grafiins.toml` in `working_dir`
/// 3. user config
/// 4. defaults
pub fn resolve_config(explicit: Option<&Path>, working_dir: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        debug!(path = %path.display(), "using explicit config");
        return read_config(path);
    }

    let project = working_dir.join(PROJECT_CONFIG_FILE);
    if project.exists() {
        debug!(path = %project.display(), "using project config");
        return read_config(&project);
    }

    load_user_config()
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if !config.export.delimiter.is_ascii() {
        bail!(
            "Invalid delimiter {:?} in {}: must be a single ASCII character",
            config.export.delimiter,
            path.display()
        );
    }
    Ok(config)
}

fn default_vertex_file() -> PathBuf {
    PathBuf::from("vertices.csv")
}

fn default_edge_file() -> PathBuf {
    PathBuf::from("edges.csv")
}

fn default_vertex_handle_column() -> String {
    "vertex_i".to_string()
}

fn default_edge_handle_column() -> String {
    "edge_i".to_string()
}

const fn default_delimiter() -> char {
    ','
}
