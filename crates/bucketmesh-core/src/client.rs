//! Control-plane client abstraction.
//!
//! The reconciler only needs one remote operation: replace a bucket's
//! replication configuration. [`ReplicationClient`] is that seam; the
//! production implementation lives in [`crate::s3`].
//!
//! # Object safety
//!
//! The trait uses `#[async_trait]` so it can be held as
//! `Arc<dyn ReplicationClient>` by the reconciler.

use bucketmesh_model::ReplicationRule;

use crate::error::ClientError;

/// One "set replication configuration" call.
#[derive(Debug, Clone, Copy)]
pub struct ReplicationRequest<'a> {
    /// Bucket whose configuration is replaced.
    pub bucket: &'a str,
    /// Region of the bucket; the call is sent there.
    pub region: &'a str,
    /// IAM role S3 assumes to replicate.
    pub role_arn: &'a str,
    /// Full rule list. Empty clears replication on the bucket.
    pub rules: &'a [ReplicationRule],
}

impl ReplicationRequest<'_> {
    /// Whether this request clears the bucket's replication configuration.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Storage provider control plane for bucket replication.
#[async_trait::async_trait]
pub trait ReplicationClient: Send + Sync {
    /// Replace the bucket's replication configuration with `request.rules`.
    ///
    /// This is a full replace, not a merge: applying the same request twice
    /// leaves the bucket in the same state.
    async fn put_replication(&self, request: &ReplicationRequest<'_>) -> Result<(), ClientError>;
}
