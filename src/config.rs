//! Process-wide configuration, loaded from a YAML file at startup.
//!
//! Mirrors the teacher's `EvalConfig::load`/`save` pair: `serde_yaml` plus
//! `anyhow::Context` for load-time diagnostics.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    pub public_bucket: BucketConfig,
    pub private_bucket: BucketConfig,
    pub azure: AzureConfig,

    /// Host for the cloud-mirror redirector used on cross-region public
    /// S3 gets.
    pub cloud_mirror_host: String,

    /// Region this deployment's buckets live in.
    pub artifact_region: String,

    /// IP-prefix → region tag pairs, pre-built into a `RegionTable` at
    /// startup.
    #[serde(default)]
    pub region_table: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    pub name: String,
    pub direct_host: String,
    #[serde(default)]
    pub cloudfront_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub container: String,
    pub host: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {:?}", path.as_ref()))?;
        let config: ServiceConfig =
            serde_yaml::from_str(&content).context("failed to parse config file")?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("failed to serialize config")?;
        std::fs::write(path, content).context("failed to write config file")?;
        Ok(())
    }

    /// A config usable out of the box for local development.
    pub fn sample() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_bucket: BucketConfig {
                name: "public-artifacts".to_string(),
                direct_host: "public-artifacts.s3.us-east-1.amazonaws.com".to_string(),
                cloudfront_host: Some("artifacts.cdn.example.com".to_string()),
            },
            private_bucket: BucketConfig {
                name: "private-artifacts".to_string(),
                direct_host: "private-artifacts.s3.us-east-1.amazonaws.com".to_string(),
                cloudfront_host: None,
            },
            azure: AzureConfig {
                container: "artifacts".to_string(),
                host: "example.blob.core.windows.net".to_string(),
            },
            cloud_mirror_host: "cloud-mirror.example.com".to_string(),
            artifact_region: "us-east-1".to_string(),
            region_table: vec![
                ("10.0.1.".to_string(), "us-east-1".to_string()),
                ("10.0.2.".to_string(), "us-west-2".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_yaml() {
        let config = ServiceConfig::sample();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: ServiceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.public_bucket.name, config.public_bucket.name);
    }
}
