//! Uniform capability surface over the storage backends an artifact can
//! live in. `reference` and `error` carry no adapter — they are pure
//! metadata and are short-circuited by the dispatcher before reaching here.

pub mod azure;
pub mod s3;

pub use azure::BlobContainer;
pub use s3::S3Bucket;
