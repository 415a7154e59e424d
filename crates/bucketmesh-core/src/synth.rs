//! Full-mesh replication rule synthesis.

use bucketmesh_model::{MeshInput, ReplicationRule, RuleSet};

/// Derive the replication rules for every ordered pair of distinct buckets.
///
/// For each source bucket, destinations are visited in input order with the
/// source itself skipped; a destination's priority is its 1-based position in
/// that filtered sequence. The result is deterministic for a given bucket
/// order, and empty when the mesh has fewer than two buckets.
///
/// # Examples
///
/// ```
/// use bucketmesh_core::synth::synthesize;
/// use bucketmesh_model::{BucketDescriptor, MeshInput};
///
/// let mesh = MeshInput::new(
///     vec![
///         BucketDescriptor::new("a", "us-east-1"),
///         BucketDescriptor::new("b", "eu-west-1"),
///     ],
///     "arn:aws:iam::123456789012:role/replication",
/// );
/// let rules = synthesize(&mesh);
/// assert_eq!(rules.rules_for("a")[0].id, "replicate-a-to-b");
/// ```
#[must_use]
pub fn synthesize(mesh: &MeshInput) -> RuleSet {
    let mut rule_set = RuleSet::new();
    if mesh.len() < 2 {
        return rule_set;
    }

    for source in &mesh.buckets {
        let rules = mesh
            .buckets
            .iter()
            .filter(|dst| dst.name != source.name)
            .zip(1u32..)
            .map(|(dst, priority)| ReplicationRule::between(&source.name, &dst.name, priority))
            .collect();
        rule_set.push(source.clone(), rules);
    }

    rule_set
}
