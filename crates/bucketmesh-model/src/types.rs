//! Mesh topology and replication rule types.

use serde::{Deserialize, Serialize};

/// ARN prefix for S3 buckets in the standard partition.
const BUCKET_ARN_PREFIX: &str = "arn:aws:s3:::";

/// A bucket taking part in the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketDescriptor {
    /// Bucket name.
    pub name: String,
    /// Region the bucket lives in.
    pub region: String,
}

impl BucketDescriptor {
    /// Create a new bucket descriptor.
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    /// The bucket ARN, e.g. `arn:aws:s3:::my-bucket`.
    #[must_use]
    pub fn arn(&self) -> String {
        format!("{BUCKET_ARN_PREFIX}{}", self.name)
    }
}

/// Validated input for one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshInput {
    /// Buckets in declaration order.
    pub buckets: Vec<BucketDescriptor>,
    /// IAM role S3 assumes to replicate objects.
    pub replication_role_arn: String,
}

impl MeshInput {
    /// Create a new mesh input.
    pub fn new(buckets: Vec<BucketDescriptor>, replication_role_arn: impl Into<String>) -> Self {
        Self {
            buckets,
            replication_role_arn: replication_role_arn.into(),
        }
    }

    /// Number of buckets in the mesh.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the mesh has no buckets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Status of a replication rule or rule feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleStatus {
    /// Enabled.
    #[default]
    Enabled,
    /// Disabled.
    Disabled,
}

impl RuleStatus {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which account owns replicas in the destination bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OwnerOverride {
    /// Replicas are owned by the destination bucket owner.
    #[default]
    Destination,
}

/// A directional replication rule from one mesh bucket to another.
///
/// Rules are always derived from a `(source, destination)` pair; the id and
/// priority are stable for the same bucket ordering, so re-applying a rule set
/// is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationRule {
    /// Rule identifier, unique per `(source, destination)` pair.
    pub id: String,
    /// Bucket the rule is installed on.
    pub source_bucket: String,
    /// Bucket objects are copied to.
    pub destination_bucket: String,
    /// 1-based priority within the source bucket's rule list.
    pub priority: u32,
    /// Rule status. Mesh rules are always enabled.
    pub status: RuleStatus,
    /// Key prefix filter. Empty matches every object.
    pub prefix: String,
    /// Whether delete markers are replicated.
    pub delete_marker_replication: RuleStatus,
    /// Replica ownership translation.
    pub owner_override: OwnerOverride,
}

impl ReplicationRule {
    /// Build the mesh rule replicating `source` into `destination`.
    #[must_use]
    pub fn between(source: &str, destination: &str, priority: u32) -> Self {
        Self {
            id: Self::rule_id(source, destination),
            source_bucket: source.to_owned(),
            destination_bucket: destination.to_owned(),
            priority,
            status: RuleStatus::Enabled,
            prefix: String::new(),
            delete_marker_replication: RuleStatus::Enabled,
            owner_override: OwnerOverride::Destination,
        }
    }

    /// Deterministic rule id for a `(source, destination)` pair.
    #[must_use]
    pub fn rule_id(source: &str, destination: &str) -> String {
        format!("replicate-{source}-to-{destination}")
    }

    /// ARN of the destination bucket.
    #[must_use]
    pub fn destination_arn(&self) -> String {
        format!("{BUCKET_ARN_PREFIX}{}", self.destination_bucket)
    }
}

/// The ordered rule list for one source bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRules {
    /// The source bucket.
    pub source: BucketDescriptor,
    /// Rules in destination encounter order.
    pub rules: Vec<ReplicationRule>,
}

/// Per-source replication rules for a whole mesh.
///
/// Entries keep the order of the input bucket list, which makes the output
/// deterministic and diffable. Only sources with at least one rule have an
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    entries: Vec<SourceRules>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the rules for a source bucket. Empty rule lists are dropped.
    pub fn push(&mut self, source: BucketDescriptor, rules: Vec<ReplicationRule>) {
        if !rules.is_empty() {
            self.entries.push(SourceRules { source, rules });
        }
    }

    /// Rules for the given source bucket, or an empty slice if it has none.
    #[must_use]
    pub fn rules_for(&self, source: &str) -> &[ReplicationRule] {
        self.entries
            .iter()
            .find(|e| e.source.name == source)
            .map(|e| e.rules.as_slice())
            .unwrap_or_default()
    }

    /// Iterate entries in input order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceRules> {
        self.entries.iter()
    }

    /// Number of source buckets with rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source bucket has rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of rules across all sources.
    #[must_use]
    pub fn total_rules(&self) -> usize {
        self.entries.iter().map(|e| e.rules.len()).sum()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a SourceRules;
    type IntoIter = std::slice::Iter<'a, SourceRules>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_rule_between_buckets() {
        let rule = ReplicationRule::between("alpha", "beta", 3);
        assert_eq!(rule.id, "replicate-alpha-to-beta");
        assert_eq!(rule.priority, 3);
        assert_eq!(rule.status, RuleStatus::Enabled);
        assert_eq!(rule.delete_marker_replication, RuleStatus::Enabled);
        assert_eq!(rule.owner_override, OwnerOverride::Destination);
        assert!(rule.prefix.is_empty());
        assert_eq!(rule.destination_arn(), "arn:aws:s3:::beta");
    }

    #[test]
    fn test_should_drop_empty_rule_lists() {
        let mut set = RuleSet::new();
        set.push(BucketDescriptor::new("a", "us-east-1"), vec![]);
        assert!(set.is_empty());
        assert!(set.rules_for("a").is_empty());
    }

    #[test]
    fn test_should_keep_insertion_order() {
        let mut set = RuleSet::new();
        set.push(
            BucketDescriptor::new("b", "r1"),
            vec![ReplicationRule::between("b", "a", 1)],
        );
        set.push(
            BucketDescriptor::new("a", "r1"),
            vec![ReplicationRule::between("a", "b", 1)],
        );

        let sources: Vec<&str> = set.iter().map(|e| e.source.name.as_str()).collect();
        assert_eq!(sources, ["b", "a"]);
        assert_eq!(set.total_rules(), 2);
        assert_eq!(set.rules_for("a")[0].destination_bucket, "b");
    }

    #[test]
    fn test_should_serialize_mesh_input_to_camel_case_json() {
        let mesh = MeshInput::new(
            vec![BucketDescriptor::new("a", "us-east-1")],
            "arn:aws:iam::123456789012:role/replication",
        );
        let json = serde_json::to_string(&mesh).expect("test serialization");
        assert!(json.contains("replicationRoleArn"));
        assert_eq!(mesh.len(), 1);
    }
}
