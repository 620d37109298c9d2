//! The `Artifact` entity and its wire-facing variant records.

pub mod service;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Composite primary key: `(taskId, runId, name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub task_id: String,
    pub run_id: u32,
    pub name: String,
}

impl ArtifactKey {
    pub fn new(task_id: impl Into<String>, run_id: u32, name: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            run_id,
            name: name.into(),
        }
    }
}

/// Per-`storageType` variant payload. Carries exactly the fields described
/// in spec §3; the enum discriminant doubles as `storageType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArtifactDetails {
    S3 { bucket: String, prefix: String },
    Azure { container: String, path: String },
    Reference { url: String },
    Error { message: String, reason: String },
}

impl ArtifactDetails {
    pub fn storage_type(&self) -> &'static str {
        match self {
            ArtifactDetails::S3 { .. } => "s3",
            ArtifactDetails::Azure { .. } => "azure",
            ArtifactDetails::Reference { .. } => "reference",
            ArtifactDetails::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub task_id: String,
    pub run_id: u32,
    pub name: String,
    pub content_type: String,
    pub expires: DateTime<Utc>,
    pub details: ArtifactDetails,
}

impl Artifact {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(self.task_id.clone(), self.run_id, self.name.clone())
    }

    pub fn storage_type(&self) -> &'static str {
        self.details.storage_type()
    }

    /// Public wire projection used by list responses and `artifactCreated`
    /// events. Carries `url` only for `reference` artifacts.
    pub fn to_json(&self) -> ArtifactJson {
        let url = match &self.details {
            ArtifactDetails::Reference { url } => Some(url.clone()),
            _ => None,
        };
        ArtifactJson {
            storage_type: self.storage_type().to_string(),
            name: self.name.clone(),
            expires: self.expires,
            content_type: self.content_type.clone(),
            url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactJson {
    #[serde(rename = "storageType")]
    pub storage_type: String,
    pub name: String,
    pub expires: DateTime<Utc>,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Create-request body, discriminated by `storageType`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "storageType", rename_all = "lowercase")]
pub enum CreateArtifactInput {
    S3 {
        #[serde(rename = "contentType")]
        content_type: Option<String>,
        expires: DateTime<Utc>,
    },
    Azure {
        #[serde(rename = "contentType")]
        content_type: Option<String>,
        expires: DateTime<Utc>,
    },
    Reference {
        #[serde(rename = "contentType")]
        content_type: Option<String>,
        expires: DateTime<Utc>,
        url: String,
    },
    Error {
        expires: DateTime<Utc>,
        message: String,
        reason: String,
    },
}

impl CreateArtifactInput {
    pub fn expires(&self) -> DateTime<Utc> {
        match self {
            CreateArtifactInput::S3 { expires, .. }
            | CreateArtifactInput::Azure { expires, .. }
            | CreateArtifactInput::Reference { expires, .. }
            | CreateArtifactInput::Error { expires, .. } => *expires,
        }
    }

    pub fn content_type(&self) -> String {
        match self {
            CreateArtifactInput::S3 { content_type, .. }
            | CreateArtifactInput::Azure { content_type, .. }
            | CreateArtifactInput::Reference { content_type, .. } => content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            CreateArtifactInput::Error { .. } => DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// Create-response body, same discriminator as the request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "storageType", rename_all = "lowercase")]
pub enum CreateArtifactReply {
    S3 {
        #[serde(rename = "contentType")]
        content_type: String,
        expires: DateTime<Utc>,
        #[serde(rename = "putUrl")]
        put_url: String,
    },
    Azure {
        #[serde(rename = "contentType")]
        content_type: String,
        expires: DateTime<Utc>,
        #[serde(rename = "putUrl")]
        put_url: String,
    },
    Reference {},
    Error {},
}
