//! Diagnostic hooks for reconciliation.
//!
//! The reconciler reports progress and failures through an injected
//! [`ReconcileObserver`] rather than a process-wide logger, so tests can
//! assert on exactly what was reported. [`TracingObserver`] is the production
//! implementation and emits `tracing` events.

use bucketmesh_model::BucketDescriptor;
use tracing::{error, info};

use crate::error::ClientError;

/// Receives reconciliation events.
pub trait ReconcileObserver: Send + Sync {
    /// Create/Update found fewer than two buckets and did nothing.
    fn mesh_skipped(&self, _bucket_count: usize) {}

    /// A bucket's configuration was written. `rules == 0` means cleared.
    fn bucket_applied(&self, _bucket: &BucketDescriptor, _rules: usize) {}

    /// The call for a bucket failed. Processing stops after this.
    fn call_failed(&self, bucket: &BucketDescriptor, clearing: bool, error: &ClientError);
}

/// Observer that emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn mesh_skipped(&self, bucket_count: usize) {
        info!(
            bucket_count,
            "fewer than two buckets provided, skipping replication configuration"
        );
    }

    fn bucket_applied(&self, bucket: &BucketDescriptor, rules: usize) {
        if rules == 0 {
            info!(bucket = %bucket.name, region = %bucket.region, "cleared bucket replication configuration");
        } else {
            info!(bucket = %bucket.name, region = %bucket.region, rules, "put bucket replication configuration");
        }
    }

    fn call_failed(&self, bucket: &BucketDescriptor, clearing: bool, err: &ClientError) {
        let message = if clearing {
            "failed to clear bucket replication configuration"
        } else {
            "failed to put bucket replication configuration"
        };
        error!(
            bucket = %bucket.name,
            region = %bucket.region,
            code = err.code().unwrap_or_default(),
            error = %err,
            "{message}"
        );
    }
}
