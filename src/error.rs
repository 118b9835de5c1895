use thiserror::Error;

/// All possible errors in the pipeline service
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No submissions found for client '{0}'")]
    ClientNotFound(String),

    #[error("Pipeline has {count} nodes, limit is {limit}")]
    TooManyNodes { count: usize, limit: usize },

    #[error("Pipeline has {count} edges, limit is {limit}")]
    TooManyEdges { count: usize, limit: usize },

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MCP error: {0}")]
    Mcp(String),
}

impl PipelineError {
    /// Stable machine-readable code used in MCP and HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ClientNotFound(_) => "client_not_found",
            PipelineError::TooManyNodes { .. } => "too_many_nodes",
            PipelineError::TooManyEdges { .. } => "too_many_edges",
            PipelineError::Db(_) => "database_error",
            PipelineError::Io(_) => "io_error",
            PipelineError::Json(_) => "invalid_json",
            PipelineError::Mcp(_) => "mcp_error",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;
