//! Full-mesh S3 replication: rule synthesis and lifecycle reconciliation.
//!
//! Every bucket in the mesh replicates to every other bucket. This crate
//! validates the declared bucket list, derives the pairwise replication rules
//! with deterministic ids and priorities, and applies them per source bucket
//! through the S3 control plane.
//!
//! # Architecture
//!
//! ```text
//! resource properties
//!        |
//!        v
//!   validation::parse ──> MeshInput
//!        |
//!        v
//!   Reconciler ──> synth::synthesize ──> RuleSet
//!        |
//!        v
//!   ReplicationClient (S3ReplicationClient: one regional client per bucket)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod observer;
pub mod reconciler;
pub mod s3;
pub mod synth;
pub mod validation;

pub use client::{ReplicationClient, ReplicationRequest};
pub use config::MeshConfig;
pub use error::{ClientError, MeshError, MeshResult, ValidationError, ValidationErrorKind};
pub use observer::{ReconcileObserver, TracingObserver};
pub use reconciler::{EmptyRulePolicy, ReconciliationOutcome, Reconciler};
pub use s3::S3ReplicationClient;
