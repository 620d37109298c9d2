//! Shared state for the artifact HTTP surface.

use std::sync::Arc;

use crate::artifact::service::ArtifactService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ArtifactService>,
}

impl AppState {
    pub fn new(service: Arc<ArtifactService>) -> Self {
        Self { service }
    }
}
