//! Neo4j layer for the code graph: index catalog management and the fixed
//! relationship-building queries, both with per-statement timing.

mod client;
mod statements;

use std::time::Duration;

use thiserror::Error;

pub use client::GraphClient;
pub use statements::{INDEX_STATEMENTS, IndexStatement, RELATIONSHIP_QUERIES, RelationshipQuery};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),
    #[error("row decoding error: {0}")]
    De(#[from] neo4rs::DeError),
    #[error(transparent)]
    Config(#[from] sougraph_config::ConfigError),
}

/// Result of one index statement: how long it took, and the error when it
/// failed (failures do not stop the run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub name: &'static str,
    pub elapsed: Duration,
    pub error: Option<String>,
}

/// One `SHOW INDEXES` catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub index_type: String,
    pub labels: Vec<String>,
    pub properties: Vec<String>,
    pub state: String,
}

/// Result of one relationship-building query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub name: &'static str,
    pub rel_type: &'static str,
    pub elapsed: Duration,
    pub created: i64,
}
