//! Service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "pipedag.db";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default origin allowed by CORS (the pipeline editor dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Versions kept per client.
pub const DEFAULT_MAX_VERSIONS: usize = 20;

pub const DEFAULT_MAX_NODES: usize = 10_000;
pub const DEFAULT_MAX_EDGES: usize = 50_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Caps applied to a submission before the DAG check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_nodes: usize,
    pub max_edges: usize,
    pub max_versions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }
}

/// Configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub limits: Limits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            limits: Limits::default(),
        }
    }
}
