//! Handler configuration.
//!
//! Provides [`MeshConfig`], loaded from environment variables. AWS
//! credentials and the default region come from the standard `aws-config`
//! provider chain and are not part of this struct.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default physical resource id reported when the request carries none.
pub const DEFAULT_PHYSICAL_RESOURCE_ID: &str = "BucketMeshReplication";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

impl LogFormat {
    /// Parse a format name, falling back to JSON for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("text") || value.eq_ignore_ascii_case("pretty") {
            Self::Text
        } else {
            Self::Json
        }
    }
}

/// Bucket mesh handler configuration.
///
/// # Examples
///
/// ```
/// use bucketmesh_core::config::MeshConfig;
///
/// let config = MeshConfig::default();
/// assert_eq!(config.physical_resource_id, "BucketMeshReplication");
/// assert!(config.endpoint_url.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct MeshConfig {
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format.
    #[builder(default)]
    pub log_format: LogFormat,

    /// Physical resource id used when the request has none.
    #[builder(default = String::from(DEFAULT_PHYSICAL_RESOURCE_ID))]
    pub physical_resource_id: String,

    /// S3 endpoint override, e.g. a local S3-compatible server.
    #[builder(default)]
    pub endpoint_url: Option<String>,

    /// Whether to use path-style bucket addressing.
    #[builder(default = false)]
    pub force_path_style: bool,

    /// Whether to upload the response to the request's `ResponseURL`.
    #[builder(default = false)]
    pub send_response: bool,

    /// Lambda Runtime API host and port.
    #[builder(default)]
    pub runtime_api: Option<String>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            log_format: LogFormat::Json,
            physical_resource_id: String::from(DEFAULT_PHYSICAL_RESOURCE_ID),
            endpoint_url: None,
            force_path_style: false,
            send_response: false,
            runtime_api: None,
        }
    }
}

impl MeshConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `json` |
    /// | `BUCKETMESH_PHYSICAL_RESOURCE_ID` | `BucketMeshReplication` |
    /// | `BUCKETMESH_ENDPOINT_URL` | *(unset)* |
    /// | `BUCKETMESH_FORCE_PATH_STYLE` | `false` |
    /// | `BUCKETMESH_SEND_RESPONSE` | `false` |
    /// | `AWS_LAMBDA_RUNTIME_API` | *(unset)* |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            config.log_format = LogFormat::parse(&v);
        }
        if let Ok(v) = std::env::var("BUCKETMESH_PHYSICAL_RESOURCE_ID") {
            if !v.is_empty() {
                config.physical_resource_id = v;
            }
        }
        if let Ok(v) = std::env::var("BUCKETMESH_ENDPOINT_URL") {
            if !v.is_empty() {
                config.endpoint_url = Some(v);
            }
        }
        if let Ok(v) = std::env::var("BUCKETMESH_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("BUCKETMESH_SEND_RESPONSE") {
            config.send_response = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("AWS_LAMBDA_RUNTIME_API") {
            config.runtime_api = Some(v);
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
