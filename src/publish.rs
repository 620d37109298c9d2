//! Emits `artifactCreated` to configured routes. Delivery is at-least-once
//! from this core's perspective; subscribers must tolerate duplicates.

use async_trait::async_trait;
use serde::Serialize;

use crate::artifact::ArtifactJson;
use crate::task::TaskStatus;

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactCreatedPayload {
    pub status: TaskStatusJson,
    pub artifact: ArtifactJson,
    #[serde(rename = "workerGroup")]
    pub worker_group: String,
    #[serde(rename = "workerId")]
    pub worker_id: String,
    #[serde(rename = "runId")]
    pub run_id: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusJson {
    Running,
    Completed,
    Failed,
    Exception,
}

impl From<TaskStatus> for TaskStatusJson {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Running => TaskStatusJson::Running,
            TaskStatus::Completed => TaskStatusJson::Completed,
            TaskStatus::Failed => TaskStatusJson::Failed,
            TaskStatus::Exception => TaskStatusJson::Exception,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn artifact_created(
        &self,
        payload: ArtifactCreatedPayload,
        routes: &[String],
    ) -> Result<(), PublishError>;
}

/// Reference publisher: emits a structured log line per publish, suitable
/// for a log-shipping pipeline to pick up in place of a real message bus.
#[derive(Debug, Clone, Default)]
pub struct TracingPublisher;

#[async_trait]
impl Publisher for TracingPublisher {
    async fn artifact_created(
        &self,
        payload: ArtifactCreatedPayload,
        routes: &[String],
    ) -> Result<(), PublishError> {
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| PublishError(format!("failed to serialize payload: {e}")))?;
        tracing::info!(
            routes = ?routes,
            artifact = %payload.artifact.name,
            "artifactCreated {}",
            payload_json
        );
        Ok(())
    }
}

/// Channel-backed publisher used by tests to assert publish counts and
/// payload contents without a real message bus.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: tokio::sync::mpsc::UnboundedSender<(ArtifactCreatedPayload, Vec<String>)>,
}

impl ChannelPublisher {
    pub fn new() -> (
        Self,
        tokio::sync::mpsc::UnboundedReceiver<(ArtifactCreatedPayload, Vec<String>)>,
    ) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn artifact_created(
        &self,
        payload: ArtifactCreatedPayload,
        routes: &[String],
    ) -> Result<(), PublishError> {
        self.sender
            .send((payload, routes.to_vec()))
            .map_err(|e| PublishError(e.to_string()))
    }
}
