//! ExpoCLI kernel - notebook kernel adapter for the ExpoCLI XML query tool.

mod cli;

use std::io::Write;
use std::sync::Arc;

use cli::Cli;
use expocli_kernel::config::Config;
use expocli_kernel::error::{KernelError, Result};
use expocli_kernel::executor::{self, QueryExecutor};
use expocli_kernel::kernel::{ExecuteRequest, Kernel};
use expocli_kernel::kernelspec::{self, KernelSpec};
use expocli_kernel::logging;
use expocli_kernel::output::MessageOutput;
use expocli_kernel::session::Session;
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if cli.log_file {
        logging::init_file_logging(&logging::get_log_path());
    } else {
        logging::init_stderr_logging();
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

/// Runs the requested mode. Returns false when a one-shot query failed.
async fn run(cli: Cli) -> Result<bool> {
    cli.validate()?;

    if let Some(root) = &cli.install_kernelspec {
        let exe = std::env::current_exe()?;
        let path = kernelspec::install(root, &KernelSpec::for_executable(&exe))?;
        println!("Installed kernelspec at {}", path.display());
        return Ok(true);
    }

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides()?;
    cli.apply_overrides(&mut config)?;

    let executable = executor::locate(&config.executable).await;
    let runner = QueryExecutor::new(executable, config.executable.query_timeout());
    info!(
        executable = %runner.executable().display(),
        timeout_secs = runner.timeout().as_secs(),
        "query executor ready"
    );
    let mut kernel = Kernel::new(Arc::new(runner)).with_magic_prefix(&config.kernel.magic_prefix);

    if cli.serve {
        if let Some(path) = &cli.connection_file {
            info!(connection_file = %path.display(), "ignoring connection file, serving on stdio");
        }
        let mut session = Session::new(kernel);
        session
            .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        return Ok(true);
    }

    let query = cli
        .query
        .as_deref()
        .ok_or_else(|| KernelError::internal("no query to run"))?;
    let format = cli.parse_output_format().map_err(KernelError::config)?;

    let outcome = kernel.execute(&ExecuteRequest::new(query)).await;
    let succeeded = outcome.reply.is_ok();
    let rendered = MessageOutput::new(format).format(&outcome.into_messages());

    std::io::stdout().write_all(rendered.stdout.as_bytes())?;
    std::io::stderr().write_all(rendered.stderr.as_bytes())?;

    Ok(succeeded)
}
