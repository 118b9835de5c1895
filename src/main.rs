use clap::Parser;
use pipedag::cli::{Cli, Commands};
use pipedag::cli_handlers;
use pipedag::core::PipelineService;
use pipedag::mcp::run_mcp_server;
use pipedag::server::run_server;
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status of `check` when the pipeline contains a cycle
const EXIT_CYCLIC: i32 = 2;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries MCP traffic and command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            bind,
            db,
            allow_origins,
            max_body_bytes,
            limits,
        } => {
            let config = Commands::service_config(bind, db, allow_origins, max_body_bytes, limits);
            if let Err(e) = run_server(config).await {
                eprintln!("Server error: {e:#}");
                process::exit(1);
            }
            return;
        }
        Commands::Mcp { db, limits } => {
            let service = match PipelineService::open_at(&db.db, limits.into()) {
                Ok(service) => service,
                Err(e) => {
                    eprintln!("Failed to initialize MCP server: {e}");
                    process::exit(1);
                }
            };
            if let Err(e) = run_mcp_server(service).await {
                eprintln!("MCP server error: {e}");
                process::exit(1);
            }
            return;
        }
        Commands::Check { file, json } => match cli_handlers::handle_check(&file, json) {
            Ok(true) => Ok(()),
            Ok(false) => process::exit(EXIT_CYCLIC),
            Err(e) => Err(e),
        },
        Commands::History {
            client_id,
            db,
            json,
        } => cli_handlers::handle_history(&db.db, &client_id, json),
        Commands::Clear { client_id, db } => cli_handlers::handle_clear(&db.db, &client_id),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
