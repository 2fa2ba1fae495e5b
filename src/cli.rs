//! Command-line argument parsing for the ExpoCLI kernel.

use clap::Parser;
use expocli_kernel::config::Config;
use expocli_kernel::error::{KernelError, Result};
use expocli_kernel::output::OutputFormat;
use std::path::PathBuf;

/// Notebook kernel for ExpoCLI SQL-like XML queries.
#[derive(Parser, Debug)]
#[command(name = "expocli-kernel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run a single query and print the result
    #[arg(value_name = "QUERY", conflicts_with_all = ["serve", "install_kernelspec"])]
    pub query: Option<String>,

    /// Serve JSON-lines requests on stdin, writing messages to stdout
    #[arg(long, conflicts_with = "install_kernelspec")]
    pub serve: bool,

    /// Connection file passed by the notebook launcher
    #[arg(long, value_name = "PATH")]
    pub connection_file: Option<PathBuf>,

    /// Write a kernelspec into DIR/expocli/kernel.json and exit
    #[arg(long, value_name = "DIR")]
    pub install_kernelspec: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the expocli executable (skips discovery)
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Query timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format for one-shot mode
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write logs to the state directory instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    /// Applies CLI overrides on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(path) = &self.executable {
            config.executable.path = Some(path.clone());
        }
        if let Some(secs) = self.timeout {
            config.executable.query_timeout_secs = secs;
        }
        config.validate()
    }

    /// Validates argument combinations clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.query.is_none() && !self.serve && self.install_kernelspec.is_none() {
            return Err(KernelError::config(
                "Nothing to do: pass a QUERY, --serve, or --install-kernelspec",
            ));
        }
        self.parse_output_format().map_err(KernelError::config)?;
        Ok(())
    }
}
