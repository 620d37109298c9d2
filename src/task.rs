//! Read-only projection of the Task entity, consumed by the artifact service.
//!
//! The Task/Run state machine itself lives outside this core; we only need
//! the fields the artifact lifecycle reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Completed,
    Failed,
    Exception,
}

#[derive(Debug, Clone)]
pub struct Run {
    pub state: RunState,
    pub worker_group: String,
    pub worker_id: String,
    /// When the run entered its current (terminal-ish) state; only meaningful
    /// for `Exception`, where it gates the upload grace window.
    pub resolved: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
    Exception,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: String,
    pub expires: DateTime<Utc>,
    pub routes: Vec<String>,
    pub runs: Vec<Run>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        match self.runs.last().map(|r| r.state) {
            Some(RunState::Running) | None => TaskStatus::Running,
            Some(RunState::Completed) => TaskStatus::Completed,
            Some(RunState::Failed) => TaskStatus::Failed,
            Some(RunState::Exception) => TaskStatus::Exception,
        }
    }
}

/// Read-only collaborator: loads a `Task` by id.
#[async_trait]
pub trait TaskReader: Send + Sync {
    async fn load(&self, task_id: &str) -> Option<Task>;
}

/// In-memory task table, used by tests and as a reference implementation
/// until a real queue-service task table is wired in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskReader {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, task: Task) {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.task_id.clone(), task);
    }
}

#[async_trait]
impl TaskReader for InMemoryTaskReader {
    async fn load(&self, task_id: &str) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks.get(task_id).cloned()
    }
}
