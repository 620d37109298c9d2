//! S3-compatible bucket adapter.
//!
//! Real credential signing (AWS SigV4) is explicitly out of scope for this
//! core (see spec §1); these builders shape URLs the way a signer would —
//! host, path, expiry — with a `sign` placeholder query parameter standing
//! in for the omitted signature. The seam is deliberate: swap this module
//! for real AWS SDK presigning without touching the dispatch logic above it.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct S3Bucket {
    /// Bucket identifier, e.g. `"public-artifacts"`.
    pub bucket: String,
    /// Direct bucket host, bypassing any CDN, e.g.
    /// `"public-artifacts.s3.us-east-1.amazonaws.com"`.
    pub direct_host: String,
    /// CDN host fronting this bucket, if any (public buckets only).
    pub cloudfront_host: Option<String>,
}

impl S3Bucket {
    pub fn new(bucket: impl Into<String>, direct_host: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            direct_host: direct_host.into(),
            cloudfront_host: None,
        }
    }

    pub fn with_cloudfront_host(mut self, host: impl Into<String>) -> Self {
        self.cloudfront_host = Some(host.into());
        self
    }

    /// Upload URL, bound to `content_type`, valid for `ttl`.
    pub fn create_put_url(&self, key: &str, content_type: &str, ttl: Duration) -> String {
        format!(
            "https://{host}/{key}?method=PUT&content-type={ct}&expires={ttl}&sign=placeholder",
            host = self.direct_host,
            key = key,
            ct = urlencoding::encode(content_type),
            ttl = ttl.num_seconds(),
        )
    }

    /// Un-signed, public GET URL. `force_same_region` bypasses the CDN and
    /// addresses the bucket host directly.
    pub fn create_get_url(&self, key: &str, force_same_region: bool) -> String {
        let host = if force_same_region {
            &self.direct_host
        } else {
            self.cloudfront_host.as_ref().unwrap_or(&self.direct_host)
        };
        format!("https://{host}/{key}")
    }

    /// Signed GET URL, valid for `ttl`. Used for private buckets.
    pub fn create_signed_get_url(&self, key: &str, ttl: Duration) -> String {
        format!(
            "https://{host}/{key}?method=GET&expires={ttl}&sign=placeholder",
            host = self.direct_host,
            key = key,
            ttl = ttl.num_seconds(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_url_binds_content_type() {
        let bucket = S3Bucket::new("private-artifacts", "private-artifacts.s3.example.com");
        let url = bucket.create_put_url("T1/0/log.txt", "text/plain", Duration::minutes(30));
        assert!(url.starts_with("https://private-artifacts.s3.example.com/T1/0/log.txt"));
        assert!(url.contains("content-type=text%2Fplain"));
    }

    #[test]
    fn get_url_prefers_cloudfront_unless_same_region_forced() {
        let bucket = S3Bucket::new("public-artifacts", "public-artifacts.s3.example.com")
            .with_cloudfront_host("cdn.example.com");
        assert_eq!(
            bucket.create_get_url("T1/0/log.txt", false),
            "https://cdn.example.com/T1/0/log.txt"
        );
        assert_eq!(
            bucket.create_get_url("T1/0/log.txt", true),
            "https://public-artifacts.s3.example.com/T1/0/log.txt"
        );
    }
}
