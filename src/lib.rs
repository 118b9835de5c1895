pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod models;
pub mod server;

pub use error::{PipelineError, Result};
pub use graph::{find_cycle, is_dag};
pub use models::*;
