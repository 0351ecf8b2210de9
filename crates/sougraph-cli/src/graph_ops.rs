use anyhow::{Context, Result};
use sougraph_config::SougraphConfig;
use sougraph_graph::GraphClient;

pub async fn run_create_indexes(config: &SougraphConfig) -> Result<()> {
    let client = GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("failed to connect to neo4j at {}", config.graph.uri))?;

    println!("Creating indexes...\n");
    let mut failures = 0usize;
    for outcome in client.create_indexes().await {
        match &outcome.error {
            None => println!(
                "✓ Created {} ({:.3}s)",
                outcome.name,
                outcome.elapsed.as_secs_f64()
            ),
            Some(err) => {
                failures += 1;
                println!("✗ Failed to create {}: {err}", outcome.name);
            }
        }
    }

    println!("\nCurrent index catalog:\n");
    let indexes = client
        .list_indexes()
        .await
        .context("failed to list indexes")?;
    for index in indexes {
        println!("Index: {}", index.name);
        println!("  Type: {}", index.index_type);
        if !index.labels.is_empty() {
            println!("  Labels: {}", index.labels.join(", "));
        }
        if !index.properties.is_empty() {
            println!("  Properties: {}", index.properties.join(", "));
        }
        println!("  State: {}", index.state);
        println!();
    }

    if failures > 0 {
        tracing::warn!(failures, "some index statements failed");
    }
    Ok(())
}

pub async fn run_link(config: &SougraphConfig, repository_url: Option<String>) -> Result<()> {
    let repository_url = repository_url
        .or_else(|| config.graph.repository_url.clone())
        .context(
            "no repository url: pass --repository-url or set graph.repository_url in sougraph.toml",
        )?;

    let client = GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("failed to connect to neo4j at {}", config.graph.uri))?;

    let outcomes = client
        .build_relationships(&repository_url)
        .await
        .context("relationship building failed")?;

    for outcome in outcomes {
        println!("Query: {}", outcome.name);
        println!(
            "Execution time: {:.4} seconds",
            outcome.elapsed.as_secs_f64()
        );
        println!("Relationships created: {}\n", outcome.created);
    }

    Ok(())
}
