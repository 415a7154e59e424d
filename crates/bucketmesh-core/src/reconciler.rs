//! Lifecycle reconciliation of a bucket mesh.
//!
//! [`Reconciler`] turns a custom resource lifecycle event into control-plane
//! calls, one bucket at a time, in input order:
//!
//! ```text
//! Create / Update ──> synthesize ──> put rules on each source  (EmptyRulePolicy::Skip)
//! Delete          ──────────────────> put [] on every bucket   (EmptyRulePolicy::Clear)
//! anything else   ──> UnsupportedRequest, no calls
//! ```
//!
//! Processing is fail-fast: the first failed call is reported to the
//! observer, stops the run, and becomes the outcome's error. Buckets already
//! processed keep their new configuration; re-sending the same event is the
//! recovery path and is safe because rule derivation is deterministic.

use std::sync::Arc;

use bucketmesh_model::{MeshInput, RequestKind, ResponseStatus, RuleSet};

use crate::client::{ReplicationClient, ReplicationRequest};
use crate::error::{MeshError, MeshResult};
use crate::observer::{ReconcileObserver, TracingObserver};
use crate::synth::synthesize;

/// What to do with buckets whose computed rule list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRulePolicy {
    /// Leave the buckets untouched. Used by Create and Update, where empty
    /// lists only happen for meshes of fewer than two buckets.
    Skip,
    /// Send the empty list, clearing replication. Used by Delete for every
    /// bucket regardless of mesh size.
    Clear,
}

impl EmptyRulePolicy {
    /// Policy for a lifecycle request, or `None` if the request is unsupported.
    #[must_use]
    pub fn for_request(kind: &RequestKind) -> Option<Self> {
        match kind {
            RequestKind::Create | RequestKind::Update => Some(Self::Skip),
            RequestKind::Delete => Some(Self::Clear),
            RequestKind::Other(_) => None,
        }
    }
}

/// Result of one reconciliation, as reported to the orchestration system.
#[derive(Debug)]
pub struct ReconciliationOutcome {
    /// Overall status.
    pub status: ResponseStatus,
    /// Physical resource id to report.
    pub physical_resource_id: String,
    /// The failure, when `status` is `Failed`.
    pub error: Option<MeshError>,
}

impl ReconciliationOutcome {
    /// A successful outcome.
    pub fn success(physical_resource_id: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            physical_resource_id: physical_resource_id.into(),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn failed(physical_resource_id: impl Into<String>, error: MeshError) -> Self {
        Self {
            status: ResponseStatus::Failed,
            physical_resource_id: physical_resource_id.into(),
            error: Some(error),
        }
    }

    /// Whether the reconciliation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Drives mesh rule sets against a [`ReplicationClient`].
#[derive(Clone)]
pub struct Reconciler {
    client: Arc<dyn ReplicationClient>,
    observer: Arc<dyn ReconcileObserver>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler that reports through [`TracingObserver`].
    #[must_use]
    pub fn new(client: Arc<dyn ReplicationClient>) -> Self {
        Self {
            client,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Reconcile `mesh` for a lifecycle event and wrap the result as an outcome.
    pub async fn reconcile(
        &self,
        kind: &RequestKind,
        mesh: &MeshInput,
        physical_resource_id: &str,
    ) -> ReconciliationOutcome {
        match self.apply(kind, mesh).await {
            Ok(()) => ReconciliationOutcome::success(physical_resource_id),
            Err(e) => ReconciliationOutcome::failed(physical_resource_id, e),
        }
    }

    /// Reconcile `mesh` for a lifecycle event.
    pub async fn apply(&self, kind: &RequestKind, mesh: &MeshInput) -> MeshResult<()> {
        let policy = EmptyRulePolicy::for_request(kind)
            .ok_or_else(|| MeshError::UnsupportedRequest(kind.to_string()))?;

        // With two or more distinct buckets every source has at least one
        // rule, so Skip only ever applies to the mesh as a whole.
        let rule_set = match policy {
            EmptyRulePolicy::Skip => {
                let rule_set = synthesize(mesh);
                if rule_set.is_empty() {
                    self.observer.mesh_skipped(mesh.len());
                    return Ok(());
                }
                rule_set
            }
            EmptyRulePolicy::Clear => RuleSet::new(),
        };

        self.apply_rule_set(mesh, &rule_set).await
    }

    /// Apply `rule_set` bucket by bucket, stopping at the first failure.
    async fn apply_rule_set(&self, mesh: &MeshInput, rule_set: &RuleSet) -> MeshResult<()> {
        for bucket in &mesh.buckets {
            let rules = rule_set.rules_for(&bucket.name);
            let request = ReplicationRequest {
                bucket: &bucket.name,
                region: &bucket.region,
                role_arn: &mesh.replication_role_arn,
                rules,
            };
            if let Err(source) = self.client.put_replication(&request).await {
                self.observer
                    .call_failed(bucket, request.is_clear(), &source);
                return Err(MeshError::RemoteCall {
                    bucket: bucket.name.clone(),
                    region: bucket.region.clone(),
                    source,
                });
            }
            self.observer.bucket_applied(bucket, rules.len());
        }

        Ok(())
    }
}
