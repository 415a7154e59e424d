//! Error types for mesh validation and reconciliation.
//!
//! [`MeshError`] is what a reconciliation reports to the orchestration
//! boundary. It wraps the three failure kinds: malformed resource properties
//! ([`ValidationError`]), an unsupported request type, and a failed
//! control-plane call ([`ClientError`]) on a specific bucket.

/// What was wrong with a resource property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// A required field is absent or null.
    MissingField,
    /// A field has the wrong JSON type.
    WrongType,
    /// A string field is empty.
    EmptyValue,
    /// A bucket name repeats an earlier entry.
    DuplicateBucket,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MissingField => "is missing",
            Self::WrongType => "has the wrong type",
            Self::EmptyValue => "must not be empty",
            Self::DuplicateBucket => "duplicates an earlier bucket name",
        })
    }
}

/// Malformed or missing resource properties.
///
/// Identifies the offending field and, for fields inside `buckets`, the
/// element index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path} {kind}")]
pub struct ValidationError {
    /// Failure kind.
    pub kind: ValidationErrorKind,
    /// Field name, e.g. `region`.
    pub field: &'static str,
    /// Index into `buckets`, when the field belongs to a bucket entry.
    pub index: Option<usize>,
    path: String,
}

impl ValidationError {
    /// Create an error for a top-level field.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, field: &'static str) -> Self {
        Self {
            kind,
            field,
            index: None,
            path: field.to_owned(),
        }
    }

    /// Create an error for a field of the bucket entry at `index`.
    #[must_use]
    pub fn at(kind: ValidationErrorKind, index: usize, field: &'static str) -> Self {
        Self {
            kind,
            field,
            index: Some(index),
            path: format!("buckets[{index}].{field}"),
        }
    }

    /// Create an error for the bucket entry at `index` itself.
    #[must_use]
    pub fn element(kind: ValidationErrorKind, index: usize) -> Self {
        Self {
            kind,
            field: "buckets",
            index: Some(index),
            path: format!("buckets[{index}]"),
        }
    }

    /// Dotted path of the offending field, e.g. `buckets[1].region`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A failed call to the storage provider's control plane.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    code: Option<String>,
    message: String,
}

impl ClientError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Create an error carrying the provider's error code.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Provider error code, e.g. `NoSuchBucket`, when known.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reconciliation error reported to the orchestration system.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Resource properties failed validation.
    #[error("invalid resource properties: {0}")]
    Validation(#[from] ValidationError),

    /// The request type is not Create, Update or Delete.
    #[error("unsupported request type: {0}")]
    UnsupportedRequest(String),

    /// The control-plane call for a bucket failed.
    #[error("failed to configure replication on bucket {bucket} in {region}: {source}")]
    RemoteCall {
        /// Bucket whose call failed.
        bucket: String,
        /// Region the call was sent to.
        region: String,
        /// Underlying provider error.
        #[source]
        source: ClientError,
    },
}

impl MeshError {
    /// Bucket the error refers to, for remote call failures.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        match self {
            Self::RemoteCall { bucket, .. } => Some(bucket.as_str()),
            Self::Validation(_) | Self::UnsupportedRequest(_) => None,
        }
    }
}

/// Convenience result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
