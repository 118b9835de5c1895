use crate::config::Limits;
use crate::core::{PipelineService, check_pipeline};
use crate::error::PipelineError;
use crate::models::{NodeId, PipelineRequest};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read a pipeline document from a file, or stdin for `-`
pub fn read_pipeline(path: &Path) -> Result<PipelineRequest, PipelineError> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Handle the check command. Returns whether the pipeline is a DAG.
pub fn handle_check(file: &Path, json: bool) -> Result<bool, PipelineError> {
    let request = read_pipeline(file)?;
    let report = check_pipeline(&request);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.is_dag);
    }

    println!("Nodes: {}", report.num_nodes);
    println!("Edges: {}", report.num_edges);
    println!("Is DAG: {}", report.is_dag);
    if let Some(ref cycle) = report.cycle {
        println!("Cycle: {}", format_cycle(cycle));
    }

    Ok(report.is_dag)
}

/// Handle the history command
pub fn handle_history(db: &Path, client_id: &str, json: bool) -> Result<(), PipelineError> {
    let service = PipelineService::open_at(db, Limits::default())?;
    let history = service.client_history(client_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!(
        "Client {client_id}: {} version(s)",
        history.version_history.len()
    );
    for (i, version) in history.version_history.iter().enumerate() {
        println!(
            "  v{:<3} {}  nodes={:<4} edges={:<4} {}",
            i + 1,
            version.timestamp.format("%Y-%m-%d %H:%M:%S"),
            version.num_nodes,
            version.num_edges,
            if version.is_dag { "DAG" } else { "cyclic" }
        );
    }

    Ok(())
}

/// Handle the clear command
pub fn handle_clear(db: &Path, client_id: &str) -> Result<(), PipelineError> {
    let service = PipelineService::open_at(db, Limits::default())?;
    let removed = service.clear_history(client_id)?;
    if removed == 0 {
        return Err(PipelineError::ClientNotFound(client_id.to_string()));
    }

    println!("Removed {removed} version(s) for client {client_id}");
    Ok(())
}

fn format_cycle(path: &[NodeId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}
