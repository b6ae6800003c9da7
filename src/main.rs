use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tiny_proxy::lifecycle::{self, Overrides, Shutdown};
use tiny_proxy::observability::init_logging;

#[derive(Parser)]
#[command(name = "tiny-proxy")]
#[command(about = "Concurrent HTTP/1.0 forwarding proxy", long_about = None)]
struct Cli {
    /// Port to listen on
    port: u16,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host or address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = Overrides {
        port: cli.port,
        bind_host: cli.bind,
        config_path: cli.config,
    };
    let config = match lifecycle::prepare_config(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tiny-proxy: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("tiny-proxy: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!("tiny-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.trigger_on(lifecycle::shutdown_signal());

    if let Err(e) = lifecycle::run(config, &shutdown).await {
        tracing::error!(error = %e, "Failed to listen on port {}", cli.port);
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
