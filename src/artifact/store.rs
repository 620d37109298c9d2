//! Durable keyed table of artifact metadata: conditional insert, load,
//! atomic modify, and paged query.
//!
//! The reference implementation backs the trait with an async
//! `RwLock`-guarded `BTreeMap` keyed by the composite key, so a paged scan
//! over `(taskId, runId)` is a contiguous range — the trait boundary is
//! what the spec constrains, not the storage engine behind it (see
//! SPEC_FULL.md §4.4).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use tokio::sync::RwLock;

use super::{Artifact, ArtifactKey};

pub enum CreateOutcome {
    Created(Artifact),
    /// Conditional insert found an existing record at the same key.
    Conflict(Artifact),
}

#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub entries: Vec<Artifact>,
    pub continuation: Option<String>,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn create(&self, artifact: Artifact) -> CreateOutcome;

    async fn load(&self, key: &ArtifactKey) -> Option<Artifact>;

    /// Atomic read-modify-write. Returns the updated record, or `None` if
    /// the key was absent.
    async fn modify(
        &self,
        key: &ArtifactKey,
        mutator: Box<dyn FnOnce(&mut Artifact) + Send>,
    ) -> Option<Artifact>;

    async fn query(
        &self,
        task_id: &str,
        run_id: u32,
        continuation: Option<String>,
        limit: usize,
    ) -> QueryPage;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    inner: Arc<RwLock<BTreeMap<ArtifactKey, Artifact>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode_cursor(key: &ArtifactKey) -> String {
        base64::engine::general_purpose::STANDARD.encode(&key.name)
    }

    fn decode_cursor(cursor: &str) -> Option<String> {
        base64::engine::general_purpose::STANDARD
            .decode(cursor)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn create(&self, artifact: Artifact) -> CreateOutcome {
        let key = artifact.key();
        let mut map = self.inner.write().await;
        if let Some(existing) = map.get(&key) {
            return CreateOutcome::Conflict(existing.clone());
        }
        map.insert(key, artifact.clone());
        CreateOutcome::Created(artifact)
    }

    async fn load(&self, key: &ArtifactKey) -> Option<Artifact> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    async fn modify(
        &self,
        key: &ArtifactKey,
        mutator: Box<dyn FnOnce(&mut Artifact) + Send>,
    ) -> Option<Artifact> {
        let mut map = self.inner.write().await;
        let artifact = map.get_mut(key)?;
        mutator(artifact);
        Some(artifact.clone())
    }

    async fn query(
        &self,
        task_id: &str,
        run_id: u32,
        continuation: Option<String>,
        limit: usize,
    ) -> QueryPage {
        let map = self.inner.read().await;
        let cursor_name = continuation.as_deref().and_then(Self::decode_cursor);

        let mut matching: Vec<&Artifact> = map
            .iter()
            .filter(|(k, _)| k.task_id == task_id && k.run_id == run_id)
            .map(|(_, v)| v)
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let start = match &cursor_name {
            Some(name) => matching
                .iter()
                .position(|a| a.name.as_str() > name.as_str())
                .unwrap_or(matching.len()),
            None => 0,
        };

        let remaining = &matching[start..];
        let take = remaining.len().min(limit);
        let entries: Vec<Artifact> = remaining[..take].iter().map(|a| (**a).clone()).collect();

        let continuation = if remaining.len() > take {
            entries.last().map(|a| Self::encode_cursor(&a.key()))
        } else {
            None
        };

        QueryPage {
            entries,
            continuation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactDetails;
    use chrono::Utc;

    fn artifact(task_id: &str, run_id: u32, name: &str) -> Artifact {
        Artifact {
            task_id: task_id.to_string(),
            run_id,
            name: name.to_string(),
            content_type: "application/json".to_string(),
            expires: Utc::now() + chrono::Duration::days(1),
            details: ArtifactDetails::Reference {
                url: "https://example.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_is_conditional_on_key() {
        let store = InMemoryArtifactStore::new();
        let a = artifact("T1", 0, "public/log.txt");
        match store.create(a.clone()).await {
            CreateOutcome::Created(_) => {}
            CreateOutcome::Conflict(_) => panic!("expected first create to succeed"),
        }
        match store.create(a.clone()).await {
            CreateOutcome::Conflict(existing) => assert_eq!(existing.name, "public/log.txt"),
            CreateOutcome::Created(_) => panic!("expected conflict on re-create"),
        }
    }

    #[tokio::test]
    async fn query_pages_in_name_order() {
        let store = InMemoryArtifactStore::new();
        for name in ["c.txt", "a.txt", "b.txt"] {
            store.create(artifact("T1", 0, name)).await;
        }

        let page1 = store.query("T1", 0, None, 2).await;
        assert_eq!(
            page1.entries.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
            vec!["a.txt", "b.txt"]
        );
        assert!(page1.continuation.is_some());

        let page2 = store.query("T1", 0, page1.continuation, 2).await;
        assert_eq!(
            page2.entries.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
            vec!["c.txt"]
        );
        assert!(page2.continuation.is_none());
    }
}
