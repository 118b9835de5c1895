use crate::config::{
    DEFAULT_ALLOWED_ORIGIN, DEFAULT_BIND, DEFAULT_DB_FILE, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_MAX_EDGES, DEFAULT_MAX_NODES, DEFAULT_MAX_VERSIONS, Limits, ServiceConfig,
};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipedag")]
#[command(about = "Pipeline DAG validation service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// SQLite file holding submission history
    #[arg(long, env = "PIPEDAG_DB", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct LimitArgs {
    /// Versions kept per client
    #[arg(long, env = "PIPEDAG_MAX_VERSIONS", default_value_t = DEFAULT_MAX_VERSIONS, value_parser = parse_positive)]
    pub max_versions: usize,
    /// Largest accepted node count
    #[arg(long, env = "PIPEDAG_MAX_NODES", default_value_t = DEFAULT_MAX_NODES, value_parser = parse_positive)]
    pub max_nodes: usize,
    /// Largest accepted edge count
    #[arg(long, env = "PIPEDAG_MAX_EDGES", default_value_t = DEFAULT_MAX_EDGES, value_parser = parse_positive)]
    pub max_edges: usize,
}

impl From<LimitArgs> for Limits {
    fn from(args: LimitArgs) -> Self {
        Limits {
            max_nodes: args.max_nodes,
            max_edges: args.max_edges,
            max_versions: args.max_versions,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "PIPEDAG_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
        #[command(flatten)]
        db: DbArgs,
        /// Origin allowed by CORS (repeatable, or comma separated)
        #[arg(
            long = "allow-origin",
            env = "PIPEDAG_ALLOW_ORIGINS",
            value_delimiter = ',',
            default_value = DEFAULT_ALLOWED_ORIGIN
        )]
        allow_origins: Vec<String>,
        /// Largest accepted request body in bytes
        #[arg(long, env = "PIPEDAG_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Run as an MCP server over stdio
    Mcp {
        #[command(flatten)]
        db: DbArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Check a pipeline JSON file without storing it
    Check {
        /// Path to a pipeline document, or `-` for stdin
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a client's stored versions
    History {
        /// Client ID
        client_id: String,
        #[command(flatten)]
        db: DbArgs,
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a client's stored versions
    Clear {
        /// Client ID
        client_id: String,
        #[command(flatten)]
        db: DbArgs,
    },
}

impl Commands {
    /// Build the service configuration for `serve`
    pub fn service_config(
        bind: SocketAddr,
        db: DbArgs,
        allow_origins: Vec<String>,
        max_body_bytes: usize,
        limits: LimitArgs,
    ) -> ServiceConfig {
        ServiceConfig {
            bind,
            db_path: db.db,
            allowed_origins: allow_origins,
            max_body_bytes,
            limits: limits.into(),
        }
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
