// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine bootstrap and command execution.

use std::sync::Arc;

use chrono::Utc;
use mnemo_config::MnemoConfig;
use mnemo_config::model::VectorStoreBackend;
use mnemo_core::types::{ConversationLog, Scene};
use mnemo_core::{Memory, MemoryPoint, MnemoError, VectorStore};
use mnemo_memory::providers::{embedding_provider_from_config, summarizer_from_config};
use mnemo_memory::{EmbeddingService, MemoryEngine};
use mnemo_storage::{InMemoryVectorStore, SqliteVectorStore};
use serde_json::{Value, json};
use tracing::info;

use crate::Commands;

/// Open the configured store and wire up the embedding and summarizer providers.
pub(crate) async fn open_engine(config: &MnemoConfig) -> Result<MemoryEngine, MnemoError> {
    if !config.memory.enabled {
        return Err(MnemoError::Config(
            "memory is disabled (memory.enabled = false)".to_string(),
        ));
    }

    let store: Arc<dyn VectorStore> = match config.vector_store.backend {
        VectorStoreBackend::Sqlite => {
            Arc::new(SqliteVectorStore::open(&config.vector_store.data_path).await?)
        }
        VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
    };

    let mut engine = MemoryEngine::new(store, config.memory.clone());
    if let Some(provider) = embedding_provider_from_config(&config.embedding)? {
        engine = engine.with_embeddings(EmbeddingService::new(
            provider,
            config.embedding.cache_capacity,
        ));
    }
    if let Some(summarizer) = summarizer_from_config(&config.llm)? {
        engine = engine.with_summarizer(summarizer);
    }

    info!(
        backend = ?config.vector_store.backend,
        embeddings = ?config.embedding.provider,
        llm = config.llm.enabled,
        "memory engine ready"
    );
    Ok(engine)
}

/// Run one command against `engine` and return its JSON output.
pub(crate) async fn execute(engine: &MemoryEngine, command: Commands) -> Result<Value, MnemoError> {
    match command {
        Commands::Record {
            keywords,
            content,
            summary,
            scene,
        } => {
            let mut point = MemoryPoint::new(keywords, content.clone(), summary);
            engine
                .weigh(&mut point, &content, Scene::from_label(&scene), Utc::now())
                .await?;
            let total_weight = point.total_weight;
            let key = engine.record_point(point).await?;
            Ok(json!({ "key": key, "total_weight": total_weight }))
        }
        Commands::Search { terms } => to_json(&engine.search_points(&terms.join(" ")).await?),
        Commands::Optimize => {
            let deleted = engine.cleanup_expired().await?;
            Ok(json!({ "deleted": deleted }))
        }
        Commands::Cluster { path } => {
            let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
                MnemoError::InvalidInput(format!("cannot read {}: {e}", path.display()))
            })?;
            let logs: Vec<ConversationLog> = serde_json::from_str(&raw).map_err(|e| {
                MnemoError::InvalidInput(format!("malformed logs in {}: {e}", path.display()))
            })?;
            to_json(&engine.cluster_conversations(&logs).await?)
        }
        Commands::Adjust { id, multiplier } => {
            to_json(&engine.adjust_memory_weight(id, multiplier).await?)
        }
        Commands::List => to_json(&engine.all_memories().await?),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, MnemoError> {
    serde_json::to_value(value).map_err(|e| MnemoError::Internal(e.to_string()))
}
