//! Azure blob-container adapter.
//!
//! As with [`super::s3`], real SAS generation is out of scope; this builds
//! SAS-shaped URLs deterministically so the TTL/dispatch logic above it is
//! testable without network access.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct BlobContainer {
    pub container: String,
    pub host: String,
}

impl BlobContainer {
    pub fn new(container: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            host: host.into(),
        }
    }

    /// Write SAS for `path`, valid for `expiry`.
    pub fn generate_write_sas(&self, path: &str, expiry: Duration) -> String {
        format!(
            "https://{host}/{container}/{path}?sv=write&se={exp}&sig=placeholder",
            host = self.host,
            container = self.container,
            path = path,
            exp = expiry.num_seconds(),
        )
    }

    /// Signed GET URL for `path`, valid for `expiry`.
    pub fn create_signed_get_url(&self, path: &str, expiry: Duration) -> String {
        format!(
            "https://{host}/{container}/{path}?sv=read&se={exp}&sig=placeholder",
            host = self.host,
            container = self.container,
            path = path,
            exp = expiry.num_seconds(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sas_urls_are_scoped_to_container_and_path() {
        let container = BlobContainer::new("artifacts", "account.blob.core.windows.net");
        let url = container.generate_write_sas("T1/0/log.txt", Duration::minutes(30));
        assert!(url.starts_with(
            "https://account.blob.core.windows.net/artifacts/T1/0/log.txt?sv=write"
        ));
    }
}
