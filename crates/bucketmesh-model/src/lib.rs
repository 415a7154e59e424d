//! Data model for full-mesh S3 bucket replication.
//!
//! This crate holds the plain data shared by the rule synthesizer, the
//! lifecycle reconciler and the Lambda handler:
//!
//! - [`types`]: buckets, mesh input, replication rules and rule sets.
//! - [`event`]: CloudFormation custom resource request and response shapes.

pub mod event;
pub mod types;

pub use event::{CustomResourceRequest, CustomResourceResponse, RequestKind, ResponseStatus};
pub use types::{
    BucketDescriptor, MeshInput, OwnerOverride, ReplicationRule, RuleSet, RuleStatus, SourceRules,
};
