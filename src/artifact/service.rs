//! Orchestrates create/get/list; owns the state machine, invariants,
//! idempotency, and backend dispatch. See SPEC_FULL.md §4.1–4.3.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::authorize::{Authorizer, ClaimBag};
use crate::backend::{BlobContainer, S3Bucket};
use crate::error::{ServiceError, ServiceResult};
use crate::publish::{ArtifactCreatedPayload, Publisher};
use crate::region::RegionResolver;
use crate::task::{RunState, TaskReader};

use super::store::{ArtifactStore, CreateOutcome};
use super::{Artifact, ArtifactDetails, ArtifactJson, ArtifactKey, CreateArtifactInput, CreateArtifactReply};

const CLOCK_DRIFT_GRACE_MINUTES: i64 = 15;
const EXCEPTION_GRACE_MINUTES: i64 = 25;
const CREDENTIAL_TTL_MINUTES: i64 = 30;
const S3_PUT_SLACK_SECONDS: i64 = 10;
const MAX_LIST_LIMIT: usize = 1000;
const DEFAULT_LIST_LIMIT: usize = 1000;

/// Ambient request context the Request Adaptor extracts from the transport
/// layer; only the artifact-relevant slice of an HTTP request reaches here.
#[derive(Debug, Clone, Default)]
pub struct GetRequestContext {
    pub forwarded_for: Option<String>,
    pub remote_ip: Option<IpAddr>,
    pub skip_cache: bool,
}

pub enum GetArtifactReply {
    Redirect(String),
    Error { message: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct ListArtifactsReply {
    pub artifacts: Vec<ArtifactJson>,
    pub continuation_token: Option<String>,
}

pub struct ArtifactService {
    pub task_reader: Arc<dyn TaskReader>,
    pub store: Arc<dyn ArtifactStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub publisher: Arc<dyn Publisher>,
    pub region_resolver: Arc<dyn RegionResolver>,
    pub public_bucket: S3Bucket,
    pub private_bucket: S3Bucket,
    pub azure_container: BlobContainer,
    pub cloud_mirror_host: String,
    pub artifact_region: String,
}

impl ArtifactService {
    pub async fn create_artifact(
        &self,
        task_id: &str,
        run_id: u32,
        name: &str,
        input: CreateArtifactInput,
    ) -> ServiceResult<CreateArtifactReply> {
        let now = Utc::now();
        let expires = input.expires();

        if expires < now - Duration::minutes(CLOCK_DRIFT_GRACE_MINUTES) {
            return Err(ServiceError::InputError(
                "Expires must be in the future".to_string(),
            ));
        }

        let task = self
            .task_reader
            .load(task_id)
            .await
            .ok_or_else(|| ServiceError::InputError("Task not found".to_string()))?;

        let run = task
            .runs
            .get(run_id as usize)
            .cloned()
            .ok_or_else(|| ServiceError::InputError("Run not found".to_string()))?;

        let claims = ClaimBag {
            task_id: Some(task_id.to_string()),
            run_id: Some(run_id),
            worker_group: Some(run.worker_group.clone()),
            worker_id: Some(run.worker_id.clone()),
            name: name.to_string(),
        };
        if !self.authorizer.satisfies(&claims).await {
            return Err(ServiceError::AuthorizationError);
        }

        if expires > task.expires {
            return Err(ServiceError::InputError(format!(
                "Artifact expires ({expires}) after task expires ({task_expires})",
                task_expires = task.expires
            )));
        }

        match run.state {
            RunState::Running => {}
            RunState::Exception => {
                if now - run.resolved > Duration::minutes(EXCEPTION_GRACE_MINUTES) {
                    return Err(ServiceError::RequestConflict(
                        "run is no longer accepting artifact uploads".to_string(),
                    ));
                }
            }
            RunState::Completed | RunState::Failed => {
                return Err(ServiceError::RequestConflict(format!(
                    "run is not accepting artifact uploads (status: {:?})",
                    task.status()
                )));
            }
        }

        let content_type = input.content_type();
        let details = self.build_details(task_id, run_id, name, &input)?;

        let candidate = Artifact {
            task_id: task_id.to_string(),
            run_id,
            name: name.to_string(),
            content_type,
            expires,
            details,
        };

        let final_artifact = match self.store.create(candidate.clone()).await {
            CreateOutcome::Created(artifact) => artifact,
            CreateOutcome::Conflict(existing) => self.reconcile(existing, candidate).await?,
        };

        self.publish(&task, run_id, &run.worker_group, &run.worker_id, &final_artifact)
            .await?;

        Ok(self.build_create_reply(&final_artifact, now))
    }

    fn build_details(
        &self,
        task_id: &str,
        run_id: u32,
        name: &str,
        input: &CreateArtifactInput,
    ) -> ServiceResult<ArtifactDetails> {
        let object_key = format!("{task_id}/{run_id}/{name}");
        Ok(match input {
            CreateArtifactInput::S3 { .. } => {
                let bucket = if name.starts_with("public/") {
                    self.public_bucket.bucket.clone()
                } else {
                    self.private_bucket.bucket.clone()
                };
                ArtifactDetails::S3 {
                    bucket,
                    prefix: object_key,
                }
            }
            CreateArtifactInput::Azure { .. } => ArtifactDetails::Azure {
                container: self.azure_container.container.clone(),
                path: object_key,
            },
            CreateArtifactInput::Reference { url, .. } => ArtifactDetails::Reference {
                url: url.clone(),
            },
            CreateArtifactInput::Error { message, reason, .. } => ArtifactDetails::Error {
                message: message.clone(),
                reason: reason.clone(),
            },
        })
    }

    /// Idempotency reconciliation: an existing record occupies this key.
    /// Immutable fields must match exactly; `expires` may only be extended,
    /// never shortened; `reference` URLs may change freely.
    async fn reconcile(&self, existing: Artifact, candidate: Artifact) -> ServiceResult<Artifact> {
        if existing.storage_type() != candidate.storage_type() {
            return Err(ServiceError::RequestConflict(
                "artifact already exists with a different storageType".to_string(),
            ));
        }
        if existing.content_type != candidate.content_type {
            return Err(ServiceError::RequestConflict(
                "artifact already exists with a different contentType".to_string(),
            ));
        }

        let details_match = match (&existing.details, &candidate.details) {
            (ArtifactDetails::Reference { .. }, ArtifactDetails::Reference { .. }) => true,
            (a, b) => a == b,
        };
        if !details_match {
            return Err(ServiceError::RequestConflict(
                "artifact already exists with different storage details".to_string(),
            ));
        }

        let final_expires = existing.expires.max(candidate.expires);
        let final_details = candidate.details.clone();
        let key = existing.key();

        let updated = self
            .store
            .modify(
                &key,
                Box::new(move |artifact: &mut Artifact| {
                    artifact.expires = final_expires;
                    artifact.details = final_details;
                }),
            )
            .await
            .ok_or_else(|| {
                ServiceError::InternalError("artifact vanished during reconciliation".to_string())
            })?;

        Ok(updated)
    }

    async fn publish(
        &self,
        task: &crate::task::Task,
        run_id: u32,
        worker_group: &str,
        worker_id: &str,
        artifact: &Artifact,
    ) -> ServiceResult<()> {
        let payload = ArtifactCreatedPayload {
            status: task.status().into(),
            artifact: artifact.to_json(),
            worker_group: worker_group.to_string(),
            worker_id: worker_id.to_string(),
            run_id,
        };
        self.publisher
            .artifact_created(payload, &task.routes)
            .await
            .map_err(|e| {
                tracing::error!(task_id = %task.task_id, "failed to publish artifactCreated: {e}");
                ServiceError::InternalError(e.to_string())
            })
    }

    fn build_create_reply(&self, artifact: &Artifact, now: DateTime<Utc>) -> CreateArtifactReply {
        let credential_expires = now + Duration::minutes(CREDENTIAL_TTL_MINUTES);
        match &artifact.details {
            ArtifactDetails::S3 { bucket, prefix } => {
                let adapter = if *bucket == self.public_bucket.bucket {
                    &self.public_bucket
                } else {
                    &self.private_bucket
                };
                let put_url = adapter.create_put_url(
                    prefix,
                    &artifact.content_type,
                    Duration::minutes(CREDENTIAL_TTL_MINUTES)
                        + Duration::seconds(S3_PUT_SLACK_SECONDS),
                );
                CreateArtifactReply::S3 {
                    content_type: artifact.content_type.clone(),
                    expires: credential_expires,
                    put_url,
                }
            }
            ArtifactDetails::Azure { path, .. } => {
                let put_url = self
                    .azure_container
                    .generate_write_sas(path, Duration::minutes(CREDENTIAL_TTL_MINUTES));
                CreateArtifactReply::Azure {
                    content_type: artifact.content_type.clone(),
                    expires: credential_expires,
                    put_url,
                }
            }
            ArtifactDetails::Reference { .. } => CreateArtifactReply::Reference {},
            ArtifactDetails::Error { .. } => CreateArtifactReply::Error {},
        }
    }

    pub async fn get_artifact(
        &self,
        task_id: &str,
        run_id: Option<u32>,
        name: &str,
        ctx: &GetRequestContext,
    ) -> ServiceResult<GetArtifactReply> {
        let task = self
            .task_reader
            .load(task_id)
            .await
            .ok_or_else(|| ServiceError::ResourceNotFound("Task not found".to_string()))?;

        let resolved_run_id = self.resolve_run_id(&task, run_id)?;

        if !name.starts_with("public/") {
            let claims = ClaimBag {
                name: name.to_string(),
                ..Default::default()
            };
            if !self.authorizer.satisfies(&claims).await {
                return Err(ServiceError::AuthorizationError);
            }
        }

        let key = ArtifactKey::new(task_id, resolved_run_id, name);
        let artifact = self
            .store
            .load(&key)
            .await
            .ok_or_else(|| ServiceError::ResourceNotFound("Artifact not found".to_string()))?;

        match &artifact.details {
            ArtifactDetails::S3 { bucket, prefix } if *bucket == self.public_bucket.bucket => {
                Ok(GetArtifactReply::Redirect(self.public_get_url(prefix, ctx)))
            }
            ArtifactDetails::S3 { prefix, .. } => Ok(GetArtifactReply::Redirect(
                self.private_bucket
                    .create_signed_get_url(prefix, Duration::minutes(CREDENTIAL_TTL_MINUTES)),
            )),
            ArtifactDetails::Azure { container, path } => {
                if *container != self.azure_container.container {
                    tracing::error!(
                        task_id = %task_id,
                        stored_container = %container,
                        configured_container = %self.azure_container.container,
                        "artifact's stored container does not match configured container; \
                         signing against the configured container anyway"
                    );
                }
                Ok(GetArtifactReply::Redirect(
                    self.azure_container
                        .create_signed_get_url(path, Duration::minutes(CREDENTIAL_TTL_MINUTES)),
                ))
            }
            ArtifactDetails::Reference { url } => Ok(GetArtifactReply::Redirect(url.clone())),
            ArtifactDetails::Error { message, reason } => Ok(GetArtifactReply::Error {
                message: message.clone(),
                reason: reason.clone(),
            }),
        }
    }

    fn public_get_url(&self, prefix: &str, ctx: &GetRequestContext) -> String {
        let region = self
            .region_resolver
            .region_of(ctx.forwarded_for.as_deref(), ctx.remote_ip);

        match region {
            None => self.public_bucket.create_get_url(prefix, false),
            Some(_) if ctx.skip_cache => self.public_bucket.create_get_url(prefix, false),
            Some(region) if region == self.artifact_region => {
                self.public_bucket.create_get_url(prefix, true)
            }
            Some(region) => {
                let canonical = self.public_bucket.create_get_url(prefix, true);
                format!(
                    "https://{host}/v1/redirect/s3/{region}/{encoded}",
                    host = self.cloud_mirror_host,
                    region = region,
                    encoded = urlencoding::encode(&canonical),
                )
            }
        }
    }

    pub async fn list_artifacts(
        &self,
        task_id: &str,
        run_id: Option<u32>,
        continuation_token: Option<String>,
        limit: Option<usize>,
    ) -> ServiceResult<ListArtifactsReply> {
        let task = self
            .task_reader
            .load(task_id)
            .await
            .ok_or_else(|| ServiceError::ResourceNotFound("Task not found".to_string()))?;

        let resolved_run_id = self.resolve_run_id(&task, run_id)?;
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

        let page = self
            .store
            .query(task_id, resolved_run_id, continuation_token, limit)
            .await;

        Ok(ListArtifactsReply {
            artifacts: page.entries.iter().map(Artifact::to_json).collect(),
            continuation_token: page.continuation,
        })
    }

    /// Resolves an explicit `runId`, or the implicit "latest" (`runs.len() - 1`)
    /// when `run_id` is `None`. Either path requires the run to exist.
    fn resolve_run_id(&self, task: &crate::task::Task, run_id: Option<u32>) -> ServiceResult<u32> {
        match run_id {
            Some(r) => {
                if task.runs.get(r as usize).is_none() {
                    return Err(ServiceError::ResourceNotFound("Run not found".to_string()));
                }
                Ok(r)
            }
            None => {
                if task.runs.is_empty() {
                    return Err(ServiceError::ResourceNotFound(
                        "task has no runs".to_string(),
                    ));
                }
                Ok((task.runs.len() - 1) as u32)
            }
        }
    }
}
