use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strata_core::kernel::constants;

/// Strata: boot a kernel with the shipped bundles and inspect it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    pub ping: bool,

    /// Kernel configuration file (.json, .yaml/.yml or .toml)
    #[arg(long, short, value_name = "FILE", env = constants::CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `strata_core=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered routes as `name<TAB>path`
    Routes,
    /// Render the path of a route and navigate to it
    Render {
        /// Route name or path
        key: String,
        /// Path parameter, repeatable
        #[arg(long = "param", short, value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        /// Query parameter, repeatable
        #[arg(long = "query", short, value_name = "KEY=VALUE", value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },
    /// Run a full init/shutdown cycle and print every phase transition
    Phases,
}

/// Parse a `KEY=VALUE` argument.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
