use crate::core::PipelineService;
use crate::error::PipelineError;
use crate::models::PipelineRequest;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pipeline checker MCP server
#[derive(Clone)]
pub struct PipelineMcp {
    service: Arc<Mutex<PipelineService>>,
    tool_router: ToolRouter<Self>,
}

// Input types for tools
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CheckPipelineInput {
    /// Node objects, each with an `id` (string or integer)
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
    /// Edge objects, each with `source` and `target` node ids
    #[serde(default)]
    pub edges: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SubmitPipelineInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
    #[serde(default)]
    pub edges: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ClientIdInput {
    pub client_id: String,
}

// Response type
#[derive(Debug, Serialize)]
pub struct McpResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> McpResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "ok",
            data: Some(data),
            error_code: None,
            message: None,
        }
    }

    pub fn error(error_code: &str, message: &str) -> Self {
        Self {
            status: "error",
            data: None,
            error_code: Some(error_code.to_string()),
            message: Some(message.to_string()),
        }
    }
}

fn to_json<T: Serialize>(response: McpResponse<T>) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(&response)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn error_to_response(e: PipelineError) -> McpResponse<()> {
    McpResponse::error(e.code(), &e.to_string())
}

fn respond<T: Serialize>(result: crate::Result<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(data) => to_json(McpResponse::success(data)),
        Err(e) => to_json(error_to_response(e)),
    }
}

/// Rebuild a submission from loosely typed tool arguments
fn build_request(
    client_id: Option<String>,
    nodes: Vec<serde_json::Value>,
    edges: Vec<serde_json::Value>,
) -> crate::Result<PipelineRequest> {
    let mut body = serde_json::json!({ "nodes": nodes, "edges": edges });
    if let Some(client_id) = client_id {
        body["client_id"] = serde_json::Value::String(client_id);
    }
    Ok(serde_json::from_value(body)?)
}

#[tool_router]
impl PipelineMcp {
    pub fn new(service: PipelineService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Check whether a pipeline graph is a DAG without storing it. Returns node and edge counts, is_dag, and the cycle path when one exists."
    )]
    async fn check_pipeline(
        &self,
        params: Parameters<CheckPipelineInput>,
    ) -> Result<CallToolResult, McpError> {
        let service = self.service.lock().await;
        let p = params.0;

        respond(
            build_request(None, p.nodes, p.edges)
                .and_then(|request| service.check_only(&request)),
        )
    }

    #[tool(
        description = "Submit a pipeline for a client. The pipeline is checked for cycles and appended to the client's version history."
    )]
    async fn submit_pipeline(
        &self,
        params: Parameters<SubmitPipelineInput>,
    ) -> Result<CallToolResult, McpError> {
        let service = self.service.lock().await;
        let p = params.0;

        respond(
            build_request(p.client_id, p.nodes, p.edges)
                .and_then(|request| service.parse_pipeline(request)),
        )
    }

    #[tool(description = "Get the stored version history of a client's pipelines, oldest first.")]
    async fn get_history(
        &self,
        params: Parameters<ClientIdInput>,
    ) -> Result<CallToolResult, McpError> {
        let service = self.service.lock().await;
        respond(service.client_history(&params.0.client_id))
    }
}

#[tool_handler]
impl ServerHandler for PipelineMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Pipeline checker - validates that node/edge pipelines form a directed acyclic graph. \
                 Use check_pipeline for a dry run, submit_pipeline to store a version for a client, \
                 and get_history to read a client's stored versions."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_mcp_server(service: PipelineService) -> Result<(), Box<dyn std::error::Error>> {
    let mcp = PipelineMcp::new(service);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "error starting MCP server");
    })?;

    service.waiting().await?;
    Ok(())
}
