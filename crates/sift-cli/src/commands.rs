//! Command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures::future::join_all;
use serde_json::Value;
use sift_api::Server;
use sift_client::QueryRelay;
use sift_core::SiftConfig;
use sift_engine::{IndexReceipt, Search};
use sift_mapping::MappingTable;

use crate::cli::{Cli, Command};
use crate::config_handlers::handle_config_command;

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let engine = cli.engine.as_deref();
    let load = || load_config(config_path, engine);

    match cli.command {
        Command::Config { action } => Ok(handle_config_command(config_path, action)?),
        Command::Serve { bind } => cmd_serve(&load()?, bind).await,
        Command::Index { doc_type, file } => {
            let search = build_search(&load()?)?;
            let receipts = cmd_index(&search, &doc_type, &file).await?;
            tracing::info!("Indexed {} {doc_type} document(s)", receipts.len());
            Ok(())
        }
        Command::Query { doc_type, query } => {
            let search = build_search(&load()?)?;
            let results = search.query(doc_type.as_deref(), &query).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Relay {
            doc_type,
            offset,
            limit,
            term,
        } => {
            let relay = QueryRelay::from_config(&load()?)?;
            let response = relay
                .search(doc_type.as_deref(), &term, offset, limit)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Mappings => {
            println!("{}", load_mappings(&load()?)?.to_json_pretty()?);
            Ok(())
        }
    }
}

/// Load configuration and apply the `--engine` override.
pub fn load_config(config_path: Option<&str>, engine: Option<&str>) -> Result<SiftConfig> {
    let mut config = SiftConfig::load(config_path)?;
    if let Some(engine) = engine {
        config.engine.name = engine.to_string();
    }
    Ok(config)
}

/// Built-in mappings, overlaid with the configured mappings file.
pub fn load_mappings(config: &SiftConfig) -> Result<MappingTable> {
    let mut table = MappingTable::builtin();
    if let Some(path) = config.mappings_file() {
        let extra = MappingTable::load(&path)
            .with_context(|| format!("Failed to load mappings from {}", path.display()))?;
        tracing::debug!("Loaded {} mapping(s) from {}", extra.len(), path.display());
        table.extend(extra);
    }
    Ok(table)
}

/// A search service over the configured engine.
pub fn build_search(config: &SiftConfig) -> Result<Search> {
    let search = Search::from_config(config.effective_engine(), load_mappings(config)?);
    if !search.is_available() {
        tracing::warn!("Search engine '{}' is not available", config.engine.name);
    }
    Ok(search)
}

/// Serve the provider endpoint until Ctrl-C.
pub async fn cmd_serve(config: &SiftConfig, bind: Option<String>) -> Result<()> {
    let search = Arc::new(build_search(config)?);
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    Server::new(search, bind).run().await?;
    Ok(())
}

/// Index every document in `file` and print each receipt as a JSON line.
///
/// All documents are queued before any result is awaited. Fails if any
/// document failed.
pub async fn cmd_index(search: &Search, doc_type: &str, file: &Path) -> Result<Vec<IndexReceipt>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let documents = documents_from_value(value);
    let results = join_all(
        documents
            .into_iter()
            .map(|document| search.index(doc_type, document)),
    )
    .await;

    let mut receipts = Vec::new();
    let mut failures = 0;
    for (position, result) in results.into_iter().enumerate() {
        match result {
            Ok(receipt) => {
                println!("{}", serde_json::to_string(&receipt)?);
                receipts.push(receipt);
            }
            Err(e) => {
                eprintln!("document {position}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} document(s) failed to index", failures + receipts.len());
    }
    Ok(receipts)
}

/// Elements of a top-level array, or the value itself.
pub fn documents_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_in(dir: &tempfile::TempDir) -> SiftConfig {
        let mut config = SiftConfig::default();
        config.engine.index_path = Some(dir.path().join("index").to_string_lossy().into_owned());
        config
    }

    #[test]
    fn test_documents_from_value() {
        assert_eq!(documents_from_value(json!([1, 2])).len(), 2);
        assert_eq!(documents_from_value(json!({"id": 1})), vec![json!({"id": 1})]);
        assert!(documents_from_value(json!([])).is_empty());
    }

    #[test]
    fn test_load_mappings_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mappings.json");
        std::fs::write(&path, r#"{"note": {"_id": "id", "body": "body"}}"#).unwrap();

        let mut config = SiftConfig::default();
        config.mappings_path = Some(path.to_string_lossy().into_owned());
        let table = load_mappings(&config).unwrap();
        assert!(table.contains("note"));
        assert!(table.contains("contact"));
    }

    #[test]
    fn test_load_mappings_missing_file() {
        let mut config = SiftConfig::default();
        config.mappings_path = Some("/nonexistent/mappings.json".to_string());
        assert!(load_mappings(&config).is_err());
    }

    #[test]
    fn test_load_config_engine_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\nname = \"tantivy\"\n").unwrap();
        let config = load_config(path.to_str(), Some("remote")).unwrap();
        assert_eq!(config.engine.name, "remote");
    }

    #[tokio::test]
    async fn test_cmd_index_array_then_query() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("photos.json");
        std::fs::write(
            &file,
            json!([
                {"id": "p1", "caption": "Sunset over the lake"},
                {"id": "p2", "caption": "Morning run"}
            ])
            .to_string(),
        )
        .unwrap();

        let search = build_search(&config_in(&dir)).unwrap();
        let receipts = cmd_index(&search, "photo", &file).await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].id, "p1");

        let results = search.query(Some("photo"), "lake").await.unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.hits[0].id, "p1");
    }

    #[tokio::test]
    async fn test_cmd_index_reports_failures() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("bad.json");
        std::fs::write(
            &file,
            json!([{"id": "p1", "caption": "ok"}, {"caption": "no id"}]).to_string(),
        )
        .unwrap();

        let search = build_search(&config_in(&dir)).unwrap();
        let err = cmd_index(&search, "photo", &file).await.unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }
}
