//! BucketMesh handler - CloudFormation custom resource for full-mesh S3 replication.
//!
//! This binary is a Lambda custom runtime (`bootstrap`). It polls the Lambda
//! Runtime API for custom resource lifecycle events, reconciles the replication
//! configuration of every declared bucket, and reports the result.
//!
//! # Usage
//!
//! ```text
//! AWS_LAMBDA_RUNTIME_API=127.0.0.1:9001 bootstrap
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AWS_LAMBDA_RUNTIME_API` | *(set by Lambda)* | Runtime API host and port |
//! | `BUCKETMESH_PHYSICAL_RESOURCE_ID` | `BucketMeshReplication` | Physical id reported on Create |
//! | `BUCKETMESH_ENDPOINT_URL` | *(unset)* | S3 endpoint override |
//! | `BUCKETMESH_FORCE_PATH_STYLE` | `false` | Use path-style addressing |
//! | `BUCKETMESH_SEND_RESPONSE` | `false` | PUT the response to `ResponseURL` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;
mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use bucketmesh_core::config::LogFormat;
use bucketmesh_core::{MeshConfig, Reconciler, S3ReplicationClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::handler::MeshHandler;
use crate::runtime::RuntimeClient;

/// Handler version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        // CloudWatch does not render ANSI escapes.
        LogFormat::Text => builder.with_ansi(false).init(),
    }

    Ok(())
}

/// Wire the S3 client, reconciler and request handler together.
fn build_handler(sdk_config: aws_config::SdkConfig, config: &MeshConfig) -> MeshHandler {
    let client = Arc::new(S3ReplicationClient::new(sdk_config, config));
    MeshHandler::new(Reconciler::new(client), config.physical_resource_id.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = MeshConfig::from_env();
    init_tracing(&config.log_level, config.log_format)?;

    let runtime_api = config
        .runtime_api
        .as_deref()
        .context("AWS_LAMBDA_RUNTIME_API is not set; the handler must run inside Lambda")?;

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let handler = build_handler(sdk_config, &config);
    let runtime = RuntimeClient::new(runtime_api);

    info!(
        version = VERSION,
        runtime_api,
        endpoint_url = ?config.endpoint_url,
        send_response = config.send_response,
        "starting bucketmesh handler"
    );

    runtime::run(&runtime, &handler, config.send_response).await
}

#[cfg(test)]
mod tests {
    use aws_config::SdkConfig;
    use bucketmesh_model::{CustomResourceRequest, ResponseStatus};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_should_build_handler_from_config() {
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let config = MeshConfig::builder()
            .physical_resource_id("mesh-from-env".into())
            .build();
        let handler = build_handler(sdk_config, &config);

        // A single bucket needs no remote calls, so this never reaches S3.
        let request: CustomResourceRequest = serde_json::from_value(json!({
            "RequestType": "Create",
            "StackId": "stack",
            "RequestId": "req",
            "LogicalResourceId": "Mesh",
            "ResourceProperties": {
                "buckets": [{ "name": "solo", "region": "us-east-1" }],
                "replicationRoleArn": "arn:aws:iam::123456789012:role/replication"
            }
        }))
        .expect("valid event");
        let response = handler.handle(&request).await;

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.physical_resource_id, "mesh-from-env");
    }
}
