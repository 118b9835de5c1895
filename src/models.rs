use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a node within one submission.
///
/// Frontends send either strings or integers; `1` and `"1"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(id) => write!(f, "{id}"),
            NodeId::Str(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Str(s.to_string())
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Int(id)
    }
}

/// A node as sent by the pipeline editor. Only `id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed edge as sent by the pipeline editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_client_id() -> String {
    "unknown".to_string()
}

/// Body of a pipeline submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRequest {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub nodes: Vec<PipelineNode>,
    #[serde(default)]
    pub edges: Vec<PipelineEdge>,
}

impl PipelineRequest {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }
}

/// One stored version of a client's pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub timestamp: DateTime<Utc>,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
    pub nodes: Vec<PipelineNode>,
    pub edges: Vec<PipelineEdge>,
}

/// All stored versions for one client, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientHistory {
    pub version_history: Vec<Submission>,
}

/// Response envelope for a pipeline submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
    pub current_version_size: usize,
    pub timestamp: DateTime<Utc>,
}

/// Result of checking a pipeline without storing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<NodeId>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_id_accepts_strings_and_integers() {
        let ids: Vec<NodeId> = serde_json::from_value(json!(["llm-1", 7])).unwrap();
        assert_eq!(ids, vec![NodeId::from("llm-1"), NodeId::from(7)]);
        assert_ne!(NodeId::from(1), NodeId::from("1"));
    }

    #[test]
    fn test_request_defaults() {
        let request: PipelineRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.client_id, "unknown");
        assert!(request.nodes.is_empty());
        assert!(request.edges.is_empty());
    }

    #[test]
    fn test_request_keeps_editor_fields() {
        let body = json!({
            "client_id": "abc",
            "nodes": [{"id": "input-1", "type": "customInput", "position": {"x": 1, "y": 2}}],
            "edges": [{"id": "e1", "source": "input-1", "target": "llm-1", "animated": true}]
        });
        let request: PipelineRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.node_ids(), vec![NodeId::from("input-1")]);
        assert_eq!(
            request.edge_pairs(),
            vec![(NodeId::from("input-1"), NodeId::from("llm-1"))]
        );
        assert_eq!(request.nodes[0].extra["type"], json!("customInput"));
        assert_eq!(request.edges[0].extra["animated"], json!(true));

        let back = serde_json::to_value(&request.edges[0]).unwrap();
        assert_eq!(back["id"], json!("e1"));
        assert_eq!(back["source"], json!("input-1"));
    }

    #[test]
    fn test_check_report_omits_missing_cycle() {
        let report = CheckReport {
            num_nodes: 1,
            num_edges: 0,
            is_dag: true,
            cycle: None,
        };
        let value = serde_json::to_value(report).unwrap();
        assert!(value.get("cycle").is_none());
    }
}
