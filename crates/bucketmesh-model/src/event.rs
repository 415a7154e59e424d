//! CloudFormation custom resource request and response shapes.
//!
//! CloudFormation (or the CDK provider framework in front of it) delivers a
//! PascalCase JSON document per lifecycle event and expects a PascalCase
//! response carrying the outcome and the physical resource id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle event kind of a custom resource request.
///
/// Unknown request types are kept as [`RequestKind::Other`] so they can be
/// rejected explicitly instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestKind {
    /// The resource is being created.
    Create,
    /// The resource properties changed.
    Update,
    /// The resource is being deleted.
    Delete,
    /// Anything else.
    Other(String),
}

impl RequestKind {
    /// Returns the wire value of this request kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RequestKind {
    fn from(s: &str) -> Self {
        match s {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for RequestKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RequestKind> for String {
    fn from(kind: RequestKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// A custom resource lifecycle request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    /// Lifecycle event kind.
    pub request_type: RequestKind,
    /// Physical id assigned on a previous Create. Absent on Create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Stack ARN.
    #[serde(default)]
    pub stack_id: String,
    /// Unique id of this request.
    #[serde(default)]
    pub request_id: String,
    /// Logical id of the resource in the template.
    #[serde(default)]
    pub logical_resource_id: String,
    /// Resource type, e.g. `Custom::BucketMesh`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Pre-signed URL the response must be uploaded to.
    #[serde(
        rename = "ResponseURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_url: Option<String>,
    /// ARN of the function or topic backing the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    /// Current resource properties.
    #[serde(default)]
    pub resource_properties: Value,
    /// Previous resource properties, present on Update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,
}

impl CustomResourceRequest {
    /// The physical id carried by the request, treating an empty string as absent.
    #[must_use]
    pub fn physical_resource_id(&self) -> Option<&str> {
        self.physical_resource_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

/// Outcome status reported back to CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Failed,
}

impl ResponseStatus {
    /// Returns the wire value of this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response document for a custom resource request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    /// Outcome status.
    pub status: ResponseStatus,
    /// Failure reason, shown in the stack events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Physical id of the resource.
    pub physical_resource_id: String,
    /// Echoed from the request.
    pub stack_id: String,
    /// Echoed from the request.
    pub request_id: String,
    /// Echoed from the request.
    pub logical_resource_id: String,
    /// Output attributes. The mesh resource publishes none.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl CustomResourceResponse {
    /// Build a successful response for `request`.
    #[must_use]
    pub fn success(request: &CustomResourceRequest, physical_resource_id: impl Into<String>) -> Self {
        Self::new(request, ResponseStatus::Success, physical_resource_id, None)
    }

    /// Build a failed response for `request`.
    #[must_use]
    pub fn failed(
        request: &CustomResourceRequest,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            request,
            ResponseStatus::Failed,
            physical_resource_id,
            Some(reason.into()),
        )
    }

    fn new(
        request: &CustomResourceRequest,
        status: ResponseStatus,
        physical_resource_id: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            status,
            reason,
            physical_resource_id: physical_resource_id.into(),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data: Map::new(),
        }
    }
}
