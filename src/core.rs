use crate::config::Limits;
use crate::db::PipelineStore;
use crate::error::{PipelineError, Result};
use crate::graph;
use crate::models::{
    CheckReport, ClientHistory, NodeId, ParseResponse, PipelineRequest, Submission,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;

/// Core business logic
pub struct PipelineService {
    store: PipelineStore,
    limits: Limits,
}

impl PipelineService {
    /// Open (and initialize) the store at a specific path
    pub fn open_at<P: AsRef<Path>>(path: P, limits: Limits) -> Result<Self> {
        let store = PipelineStore::open(path)?;
        store.init()?;
        Ok(PipelineService { store, limits })
    }

    pub fn in_memory(limits: Limits) -> Result<Self> {
        let store = PipelineStore::open_in_memory()?;
        store.init()?;
        Ok(PipelineService { store, limits })
    }

    // ==================== Pipeline Operations ====================

    /// Check a pipeline and append it to the client's version history
    pub fn parse_pipeline(&self, request: PipelineRequest) -> Result<ParseResponse> {
        self.enforce_limits(&request)?;

        let is_dag = graph::is_dag(&request.node_ids(), &request.edge_pairs());
        let timestamp = Utc::now();
        let num_nodes = request.nodes.len();
        let num_edges = request.edges.len();

        let submission = Submission {
            timestamp,
            num_nodes,
            num_edges,
            is_dag,
            nodes: request.nodes,
            edges: request.edges,
        };
        let current_version_size = self.store.record_submission(
            &request.client_id,
            &submission,
            self.limits.max_versions,
        )?;

        tracing::info!(
            client_id = %request.client_id,
            num_nodes,
            num_edges,
            is_dag,
            current_version_size,
            "pipeline submitted"
        );

        Ok(ParseResponse {
            num_nodes,
            num_edges,
            is_dag,
            current_version_size,
            timestamp,
        })
    }

    /// Check a pipeline without storing it, reporting a cycle if one exists
    pub fn check_only(&self, request: &PipelineRequest) -> Result<CheckReport> {
        self.enforce_limits(request)?;
        Ok(check_pipeline(request))
    }

    // ==================== History Operations ====================

    pub fn client_history(&self, client_id: &str) -> Result<ClientHistory> {
        self.store
            .history(client_id)?
            .ok_or_else(|| PipelineError::ClientNotFound(client_id.to_string()))
    }

    pub fn all_histories(&self) -> Result<BTreeMap<String, ClientHistory>> {
        self.store.all_histories()
    }

    pub fn clear_history(&self, client_id: &str) -> Result<usize> {
        let removed = self.store.clear_history(client_id)?;
        tracing::info!(client_id, removed, "history cleared");
        Ok(removed)
    }

    fn enforce_limits(&self, request: &PipelineRequest) -> Result<()> {
        if request.nodes.len() > self.limits.max_nodes {
            return Err(PipelineError::TooManyNodes {
                count: request.nodes.len(),
                limit: self.limits.max_nodes,
            });
        }
        if request.edges.len() > self.limits.max_edges {
            return Err(PipelineError::TooManyEdges {
                count: request.edges.len(),
                limit: self.limits.max_edges,
            });
        }
        Ok(())
    }
}

/// Run the DAG check on a pipeline, without limits or storage
pub fn check_pipeline(request: &PipelineRequest) -> CheckReport {
    let nodes = request.node_ids();
    let edges = request.edge_pairs();
    let cycle: Option<Vec<NodeId>> =
        graph::find_cycle(&nodes, &edges).map(|path| path.into_iter().cloned().collect());

    CheckReport {
        num_nodes: nodes.len(),
        num_edges: edges.len(),
        is_dag: cycle.is_none(),
        cycle,
    }
}
