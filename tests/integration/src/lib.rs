//! Integration tests for the bucket mesh reconciler.
//!
//! These tests require an S3-compatible server with replication support at
//! `localhost:4566` (override with `S3_ENDPOINT_URL`). They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p bucketmesh-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::types::{BucketVersioningStatus, VersioningConfiguration};
use bucketmesh_core::{MeshConfig, Reconciler, S3ReplicationClient};
use bucketmesh_model::{BucketDescriptor, MeshInput};

static INIT: Once = Once::new();

/// Region used for every test bucket.
pub const TEST_REGION: &str = "us-east-1";

/// Role ARN passed through to the replication configuration.
pub const TEST_ROLE_ARN: &str = "arn:aws:iam::000000000000:role/bucketmesh-replication";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

fn test_credentials() -> Credentials {
    Credentials::new("test", "test", None, None, "integration-test")
}

/// Create a configured S3 client pointing at the local server.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(test_credentials())
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Create a reconciler whose S3 calls go to the local server.
#[must_use]
pub fn mesh_reconciler() -> Reconciler {
    init_tracing();

    let sdk_config = SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(SharedCredentialsProvider::new(test_credentials()))
        .build();
    let config = MeshConfig::builder()
        .endpoint_url(Some(endpoint_url()))
        .force_path_style(true)
        .build();

    Reconciler::new(Arc::new(S3ReplicationClient::new(sdk_config, &config)))
}

/// Build a mesh over `buckets`, all in [`TEST_REGION`].
#[must_use]
pub fn mesh_of(buckets: &[String]) -> MeshInput {
    MeshInput::new(
        buckets
            .iter()
            .map(|name| BucketDescriptor::new(name.clone(), TEST_REGION))
            .collect(),
        TEST_ROLE_ARN,
    )
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a versioned bucket and return its name. Caller is responsible for cleanup.
///
/// Replication requires versioning on both source and destination.
pub async fn create_versioned_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    client
        .put_bucket_versioning()
        .bucket(&name)
        .versioning_configuration(
            VersioningConfiguration::builder()
                .status(BucketVersioningStatus::Enabled)
                .build(),
        )
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to enable versioning on {name}: {e}"));
    name
}

/// Remove replication from a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let _ = client.delete_bucket_replication().bucket(bucket).send().await;
    let _ = client.delete_bucket().bucket(bucket).send().await;
}

mod test_mesh;
