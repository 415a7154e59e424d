//! Decoding of custom resource properties into a typed [`MeshInput`].
//!
//! CloudFormation hands resource properties over as an untyped JSON object.
//! [`parse`] checks the shape up front and fails on the first problem, in
//! document order: `buckets`, each bucket's `name` then `region`, then
//! `replicationRoleArn`. Nothing is synthesized or applied for input that
//! does not pass.
//!
//! The `Value` tree is walked by hand instead of going through
//! `#[derive(Deserialize)]` so errors can name the exact offending field,
//! e.g. `buckets[2].region`, which serde's messages do not.

use std::collections::HashSet;

use bucketmesh_model::{BucketDescriptor, MeshInput};
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationErrorKind};

const BUCKETS: &str = "buckets";
const NAME: &str = "name";
const REGION: &str = "region";
const REPLICATION_ROLE_ARN: &str = "replicationRoleArn";

/// Parse and validate resource properties.
///
/// Unknown keys (such as `ServiceToken`) are ignored. Bucket names must be
/// unique; a repeated name is reported at the index of its second occurrence.
///
/// # Examples
///
/// ```
/// use bucketmesh_core::validation::parse;
///
/// let props = serde_json::json!({
///     "buckets": [
///         { "name": "logs-us", "region": "us-east-1" },
///         { "name": "logs-eu", "region": "eu-west-1" }
///     ],
///     "replicationRoleArn": "arn:aws:iam::123456789012:role/replication"
/// });
/// let mesh = parse(&props).unwrap();
/// assert_eq!(mesh.buckets.len(), 2);
/// ```
pub fn parse(properties: &Value) -> Result<MeshInput, ValidationError> {
    let props = properties
        .as_object()
        .ok_or_else(|| ValidationError::new(ValidationErrorKind::WrongType, "ResourceProperties"))?;

    let raw_buckets = match props.get(BUCKETS) {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(ValidationErrorKind::MissingField, BUCKETS));
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::new(ValidationErrorKind::WrongType, BUCKETS)),
    };

    let mut buckets = Vec::with_capacity(raw_buckets.len());
    let mut seen = HashSet::with_capacity(raw_buckets.len());
    for (index, raw) in raw_buckets.iter().enumerate() {
        let entry = raw
            .as_object()
            .ok_or_else(|| ValidationError::element(ValidationErrorKind::WrongType, index))?;

        let name = required_str(entry, NAME)
            .map_err(|kind| ValidationError::at(kind, index, NAME))?;
        let region = required_str(entry, REGION)
            .map_err(|kind| ValidationError::at(kind, index, REGION))?;

        if !seen.insert(name) {
            return Err(ValidationError::at(
                ValidationErrorKind::DuplicateBucket,
                index,
                NAME,
            ));
        }
        buckets.push(BucketDescriptor::new(name, region));
    }

    let role = required_str(props, REPLICATION_ROLE_ARN)
        .map_err(|kind| ValidationError::new(kind, REPLICATION_ROLE_ARN))?;

    Ok(MeshInput::new(buckets, role))
}

/// Look up a required, non-empty string field.
fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationErrorKind> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationErrorKind::MissingField),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationErrorKind::EmptyValue),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationErrorKind::WrongType),
    }
}
