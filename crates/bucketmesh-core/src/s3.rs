//! [`ReplicationClient`] backed by `aws-sdk-s3`.
//!
//! Each call is sent with a client configured for the bucket's own region.
//! Clients are built lazily from a shared [`SdkConfig`] and cached per region
//! for the life of the process.
//!
//! A non-empty rule list maps to `PutBucketReplication`. An empty rule list
//! maps to `DeleteBucketReplication`, because S3 rejects a replication
//! configuration without rules.

use aws_config::{Region, SdkConfig};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{
    AccessControlTranslation, DeleteMarkerReplication, DeleteMarkerReplicationStatus, Destination,
    OwnerOverride as SdkOwnerOverride, ReplicationConfiguration,
    ReplicationRule as SdkReplicationRule, ReplicationRuleFilter, ReplicationRuleStatus,
};
use bucketmesh_model::{OwnerOverride, ReplicationRule, RuleStatus};
use dashmap::DashMap;
use tracing::debug;

use crate::client::{ReplicationClient, ReplicationRequest};
use crate::config::MeshConfig;
use crate::error::ClientError;

/// S3 control-plane client with one SDK client per region.
#[derive(Debug)]
pub struct S3ReplicationClient {
    sdk_config: SdkConfig,
    endpoint_url: Option<String>,
    force_path_style: bool,
    clients: DashMap<String, aws_sdk_s3::Client>,
}

impl S3ReplicationClient {
    /// Create a client from a loaded SDK configuration.
    ///
    /// `config` supplies the optional endpoint override and addressing style.
    #[must_use]
    pub fn new(sdk_config: SdkConfig, config: &MeshConfig) -> Self {
        Self {
            sdk_config,
            endpoint_url: config.endpoint_url.clone(),
            force_path_style: config.force_path_style,
            clients: DashMap::new(),
        }
    }

    /// The S3 client for `region`, built on first use.
    #[must_use]
    pub fn client_for(&self, region: &str) -> aws_sdk_s3::Client {
        self.clients
            .entry(region.to_owned())
            .or_insert_with(|| self.build_client(region))
            .clone()
    }

    fn build_client(&self, region: &str) -> aws_sdk_s3::Client {
        let mut builder = aws_sdk_s3::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_owned()))
            .force_path_style(self.force_path_style);
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        debug!(region, endpoint_url = ?self.endpoint_url, "built regional S3 client");
        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[async_trait::async_trait]
impl ReplicationClient for S3ReplicationClient {
    async fn put_replication(&self, request: &ReplicationRequest<'_>) -> Result<(), ClientError> {
        let client = self.client_for(request.region);

        if request.is_clear() {
            client
                .delete_bucket_replication()
                .bucket(request.bucket)
                .send()
                .await
                .map_err(sdk_error)?;
            debug!(bucket = request.bucket, "delete_bucket_replication completed");
            return Ok(());
        }

        let rules = request
            .rules
            .iter()
            .map(to_sdk_rule)
            .collect::<Result<Vec<_>, _>>()?;
        let configuration = ReplicationConfiguration::builder()
            .role(request.role_arn)
            .set_rules(Some(rules))
            .build()
            .map_err(|e| ClientError::new(format!("invalid replication configuration: {e}")))?;

        client
            .put_bucket_replication()
            .bucket(request.bucket)
            .replication_configuration(configuration)
            .send()
            .await
            .map_err(sdk_error)?;

        debug!(
            bucket = request.bucket,
            rules = request.rules.len(),
            "put_bucket_replication completed"
        );
        Ok(())
    }
}

/// Convert a mesh rule into the SDK's replication rule.
fn to_sdk_rule(rule: &ReplicationRule) -> Result<SdkReplicationRule, ClientError> {
    let invalid = |e: aws_sdk_s3::error::BuildError| {
        ClientError::new(format!("invalid replication rule {}: {e}", rule.id))
    };

    let priority = i32::try_from(rule.priority).map_err(|_| {
        ClientError::new(format!(
            "replication rule {} priority {} is out of range",
            rule.id, rule.priority
        ))
    })?;

    let destination = Destination::builder()
        .bucket(rule.destination_arn())
        .access_control_translation(
            AccessControlTranslation::builder()
                .owner(owner_override(rule.owner_override))
                .build()
                .map_err(invalid)?,
        )
        .build()
        .map_err(invalid)?;

    SdkReplicationRule::builder()
        .id(&rule.id)
        .priority(priority)
        .status(rule_status(rule.status))
        .filter(ReplicationRuleFilter::builder().prefix(&rule.prefix).build())
        .destination(destination)
        .delete_marker_replication(
            DeleteMarkerReplication::builder()
                .status(delete_marker_status(rule.delete_marker_replication))
                .build(),
        )
        .build()
        .map_err(invalid)
}

fn rule_status(status: RuleStatus) -> ReplicationRuleStatus {
    match status {
        RuleStatus::Enabled => ReplicationRuleStatus::Enabled,
        RuleStatus::Disabled => ReplicationRuleStatus::Disabled,
    }
}

fn delete_marker_status(status: RuleStatus) -> DeleteMarkerReplicationStatus {
    match status {
        RuleStatus::Enabled => DeleteMarkerReplicationStatus::Enabled,
        RuleStatus::Disabled => DeleteMarkerReplicationStatus::Disabled,
    }
}

fn owner_override(owner: OwnerOverride) -> SdkOwnerOverride {
    match owner {
        OwnerOverride::Destination => SdkOwnerOverride::Destination,
    }
}

/// Flatten an SDK error into a [`ClientError`], keeping the S3 error code.
fn sdk_error<E, R>(err: SdkError<E, R>) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some(code) => ClientError::with_code(code, message),
        None => ClientError::new(message),
    }
}
