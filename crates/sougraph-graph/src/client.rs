use std::sync::Arc;
use std::time::Instant;

use neo4rs::{Graph, query};
use sougraph_config::GraphConfig;

use crate::statements::{INDEX_STATEMENTS, RELATIONSHIP_QUERIES};
use crate::{GraphError, IndexInfo, IndexOutcome, LinkOutcome};

/// Thin client over a bolt connection for the fixed statement catalog.
pub struct GraphClient {
    graph: Arc<Graph>,
}

impl GraphClient {
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let password = config.password()?;
        let graph = Graph::new(&config.uri, &config.username, &password).await?;

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Runs every index statement, timing each one. A failed statement is
    /// recorded and logged; the remaining statements still run. Statements
    /// are `IF NOT EXISTS`, so re-running is safe.
    pub async fn create_indexes(&self) -> Vec<IndexOutcome> {
        let mut outcomes = Vec::with_capacity(INDEX_STATEMENTS.len());

        for statement in INDEX_STATEMENTS {
            let started = Instant::now();
            let error = match self.graph.run(query(statement.cypher)).await {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(index = statement.name, error = %err, "index creation failed");
                    Some(err.to_string())
                }
            };

            outcomes.push(IndexOutcome {
                name: statement.name,
                elapsed: started.elapsed(),
                error,
            });
        }

        outcomes
    }

    /// Current index catalog via `SHOW INDEXES`.
    pub async fn list_indexes(&self) -> Result<Vec<IndexInfo>, GraphError> {
        let mut stream = self.graph.execute(query("SHOW INDEXES")).await?;

        let mut indexes = Vec::new();
        while let Some(row) = stream.next().await? {
            indexes.push(IndexInfo {
                name: row.get("name")?,
                index_type: row.get("type")?,
                labels: row.get::<Option<Vec<String>>>("labelsOrTypes")?.unwrap_or_default(),
                properties: row.get::<Option<Vec<String>>>("properties")?.unwrap_or_default(),
                state: row.get("state")?,
            });
        }

        Ok(indexes)
    }

    /// Runs the five relationship-building queries in order, reporting
    /// wall-clock time and relationships created per query.
    ///
    /// The driver exposes no mutation counters, so "created" is the count
    /// delta for the query's relationship type; the queries are MERGE-only,
    /// which makes the delta exact.
    pub async fn build_relationships(
        &self,
        repository_url: &str,
    ) -> Result<Vec<LinkOutcome>, GraphError> {
        let mut outcomes = Vec::with_capacity(RELATIONSHIP_QUERIES.len());

        for relationship in RELATIONSHIP_QUERIES {
            let before = self.count_relationships(relationship.rel_type).await?;

            let started = Instant::now();
            self.graph
                .run(query(relationship.cypher).param("repository_url", repository_url))
                .await?;
            let elapsed = started.elapsed();

            let after = self.count_relationships(relationship.rel_type).await?;
            outcomes.push(LinkOutcome {
                name: relationship.name,
                rel_type: relationship.rel_type,
                elapsed,
                created: after - before,
            });
        }

        Ok(outcomes)
    }

    async fn count_relationships(&self, rel_type: &str) -> Result<i64, GraphError> {
        // Relationship types cannot be parameterized; rel_type only ever
        // comes from the static catalog.
        let cypher = format!("MATCH ()-[r:{rel_type}]->() RETURN count(r) AS total");
        let mut stream = self.graph.execute(query(&cypher)).await?;

        match stream.next().await? {
            Some(row) => Ok(row.get("total")?),
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient").finish_non_exhaustive()
    }
}
