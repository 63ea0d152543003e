//! Curriculum Graph Query Tool
//!
//! Loads a curriculum JSON file into the knowledge graph and runs a single
//! query against it, printing the result as pretty JSON. Useful for checking
//! authored content (duplicate ids, broken cross-links, breadcrumbs) without
//! starting the app.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin graph-query -- stats
//! cargo run --bin graph-query -- node os-paging
//! cargo run --bin graph-query -- lineage os-paging
//! cargo run --bin graph-query -- nav os-paging
//! cargo run --bin graph-query -- search memory 5
//! ```
//!
//! # Environment Variables
//!
//! - `SYLLABUS_CONTENT_PATH`: Curriculum JSON file
//!   (default: `~/.syllabus/content/curriculum.json`)
//! - `SYLLABUS_SEARCH_LIMIT`: Default result limit for `search`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! Logs go to stderr so stdout stays valid JSON.

use std::path::PathBuf;

use serde_json::{json, Value};
use syllabus_core::{GraphConfig, IndexState, KnowledgeGraphService, KnowledgeNode};

const USAGE: &str = "usage: graph-query <stats | node <id> | lineage <id> | nav <topic-id> | search <query> [limit]>";

#[derive(Debug)]
enum Command {
    Stats,
    Node(String),
    Lineage(String),
    Nav(String),
    Search { query: String, limit: Option<usize> },
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;

        let mut required = |what: &str| {
            args.next()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("missing {}\n{}", what, USAGE))
        };

        let parsed = match command {
            "stats" => Command::Stats,
            "node" => Command::Node(required("<id>")?),
            "lineage" => Command::Lineage(required("<id>")?),
            "nav" => Command::Nav(required("<topic-id>")?),
            "search" => {
                let query = required("<query>")?;
                let limit = match args.next() {
                    Some(raw) => Some(
                        raw.parse::<usize>()
                            .map_err(|e| anyhow::anyhow!("invalid limit '{}': {}", raw, e))?,
                    ),
                    None => None,
                };
                Command::Search { query, limit }
            }
            other => anyhow::bail!("unknown command '{}'\n{}", other, USAGE),
        };

        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let mut config = GraphConfig::from_env();
    if config.content_path.is_none() {
        config.content_path = Some(default_content_path()?);
    }
    if let Some(path) = &config.content_path {
        tracing::info!("📚 Curriculum: {}", path.display());
    }

    let graph = KnowledgeGraphService::from_config(config);
    if graph.ensure_ready() == IndexState::BuildFailed {
        anyhow::bail!("failed to load curriculum (see log above)");
    }

    let output = run(&graph, command);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn default_content_path() -> anyhow::Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;

    Ok(home_dir
        .join(".syllabus")
        .join("content")
        .join("curriculum.json"))
}

fn run(graph: &KnowledgeGraphService, command: Command) -> Value {
    match command {
        Command::Stats => {
            let report = graph.report();
            json!({
                "state": graph.state(),
                "nodes": graph.index().len(),
                "report": report,
            })
        }
        Command::Node(id) => match graph.get_node(&id) {
            Some(node) => json!({
                "node": node,
                "children": graph.get_children(&id).into_iter().map(summary).collect::<Vec<_>>(),
                "relatedTopics": graph.get_related_topics(&id).into_iter().map(summary).collect::<Vec<_>>(),
            }),
            None => json!({ "node": null }),
        },
        Command::Lineage(id) => {
            json!(graph.get_lineage(&id).into_iter().map(summary).collect::<Vec<_>>())
        }
        Command::Nav(id) => {
            let nav = graph.get_topic_navigation(&id);
            json!({
                "prev": nav.prev.map(summary),
                "next": nav.next.map(summary),
            })
        }
        Command::Search { query, limit } => {
            let results = match limit {
                Some(limit) => graph.search(&query, limit),
                None => graph.search_default(&query),
            };
            json!(results.into_iter().map(summary).collect::<Vec<_>>())
        }
    }
}

/// Compact node view without the source payload
fn summary(node: &KnowledgeNode) -> Value {
    json!({
        "id": node.id,
        "kind": node.kind,
        "title": node.title,
        "path": node.path,
    })
}
