use crate::error::Result;
use crate::models::{ClientHistory, PipelineEdge, PipelineNode, Submission};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;

/// Submission history database
pub struct PipelineStore {
    conn: Connection,
}

impl PipelineStore {
    /// Open database connection
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(PipelineStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(PipelineStore { conn })
    }

    /// Initialize the database schema
    pub fn init(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                num_nodes INTEGER NOT NULL,
                num_edges INTEGER NOT NULL,
                is_dag INTEGER NOT NULL,
                nodes TEXT NOT NULL,
                edges TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_submissions_client_id ON submissions(client_id, id)",
            [],
        )?;
        Ok(())
    }

    // ==================== Submission Operations ====================

    /// Append a submission and trim the client's history to the newest
    /// `max_versions` entries. Returns the history length afterwards.
    pub fn record_submission(
        &self,
        client_id: &str,
        submission: &Submission,
        max_versions: usize,
    ) -> Result<usize> {
        let nodes = serde_json::to_string(&submission.nodes)?;
        let edges = serde_json::to_string(&submission.edges)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO submissions (client_id, submitted_at, num_nodes, num_edges, is_dag, nodes, edges)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                client_id,
                submission.timestamp,
                submission.num_nodes as i64,
                submission.num_edges as i64,
                submission.is_dag,
                &nodes,
                &edges,
            ),
        )?;
        tx.execute(
            "DELETE FROM submissions
             WHERE client_id = ?1 AND id NOT IN (
                 SELECT id FROM submissions WHERE client_id = ?1 ORDER BY id DESC LIMIT ?2
             )",
            (client_id, max_versions as i64),
        )?;
        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM submissions WHERE client_id = ?1",
            [client_id],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(count as usize)
    }

    /// Get a client's history, oldest first. `None` if the client never submitted.
    pub fn history(&self, client_id: &str) -> Result<Option<ClientHistory>> {
        let mut stmt = self.conn.prepare(
            "SELECT submitted_at, num_nodes, num_edges, is_dag, nodes, edges
             FROM submissions
             WHERE client_id = ?1
             ORDER BY id",
        )?;

        let rows = stmt.query_map([client_id], submission_from_row)?;
        let version_history = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        if version_history.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ClientHistory { version_history }))
        }
    }

    /// Get every client's history keyed by client id
    pub fn all_histories(&self) -> Result<BTreeMap<String, ClientHistory>> {
        let mut stmt = self.conn.prepare(
            "SELECT client_id, submitted_at, num_nodes, num_edges, is_dag, nodes, edges
             FROM submissions
             ORDER BY client_id, id",
        )?;

        let rows = stmt.query_map([], |row| {
            let client_id: String = row.get(0)?;
            Ok((client_id, submission_from_columns(row, 1)?))
        })?;

        let mut histories: BTreeMap<String, ClientHistory> = BTreeMap::new();
        for row in rows {
            let (client_id, submission) = row?;
            histories
                .entry(client_id)
                .or_default()
                .version_history
                .push(submission);
        }

        Ok(histories)
    }

    /// Delete a client's history. Returns the number of versions removed.
    pub fn clear_history(&self, client_id: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM submissions WHERE client_id = ?1", [client_id])?;
        Ok(removed)
    }
}

// ==================== Row Parsers ====================

fn submission_from_row(row: &Row) -> std::result::Result<Submission, rusqlite::Error> {
    submission_from_columns(row, 0)
}

fn submission_from_columns(
    row: &Row,
    first: usize,
) -> std::result::Result<Submission, rusqlite::Error> {
    let timestamp: DateTime<Utc> = row.get(first)?;
    let num_nodes: i64 = row.get(first + 1)?;
    let num_edges: i64 = row.get(first + 2)?;
    let nodes: Vec<PipelineNode> = parse_json_column(row, first + 4)?;
    let edges: Vec<PipelineEdge> = parse_json_column(row, first + 5)?;

    Ok(Submission {
        timestamp,
        num_nodes: num_nodes as usize,
        num_edges: num_edges as usize,
        is_dag: row.get(first + 3)?,
        nodes,
        edges,
    })
}

fn parse_json_column<T: serde::de::DeserializeOwned>(
    row: &Row,
    idx: usize,
) -> std::result::Result<T, rusqlite::Error> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
