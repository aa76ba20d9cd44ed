use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use centralized_api::config::Config;
use centralized_api::router::GatewayRequest;
use centralized_api::{logger, operations, server};

/// Centralized operation router
#[derive(Parser, Debug)]
#[command(name = "centralized-api")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path, without extension
    #[arg(long, global = true, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the routed endpoint over HTTP (default)
    Serve,

    /// Route a single gateway event from a JSON file and print the response
    Invoke {
        /// Path to the event file
        event: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;

    // Size the runtime from `server.workers`, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            logger::init(&cfg)?;
            let router = Arc::new(operations::build_router(&cfg)?);
            runtime.block_on(server::serve(&cfg, router))
        }
        Command::Invoke { event } => {
            logger::init_quiet(&cfg)?;
            let raw = std::fs::read_to_string(&event)?;
            let request: GatewayRequest = serde_json::from_str(&raw)?;
            let router = operations::build_router(&cfg)?;
            let response = runtime.block_on(router.handle(request));
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
