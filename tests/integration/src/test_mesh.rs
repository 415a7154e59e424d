//! Mesh reconciliation integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::ReplicationRuleStatus;
    use bucketmesh_model::{RequestKind, ResponseStatus};

    use crate::{
        TEST_ROLE_ARN, cleanup_bucket, create_versioned_bucket, mesh_of, mesh_reconciler,
        s3_client,
    };

    /// Rule ids and priorities currently configured on `bucket`, sorted by priority.
    async fn replication_rules(client: &aws_sdk_s3::Client, bucket: &str) -> Vec<(String, i32)> {
        let resp = client
            .get_bucket_replication()
            .bucket(bucket)
            .send()
            .await
            .expect("get replication");
        let configuration = resp.replication_configuration().expect("configuration");
        assert_eq!(configuration.role(), TEST_ROLE_ARN);

        let mut rules: Vec<_> = configuration
            .rules()
            .iter()
            .map(|r| {
                assert_eq!(r.status(), &ReplicationRuleStatus::Enabled);
                (
                    r.id().unwrap_or_default().to_owned(),
                    r.priority().unwrap_or_default(),
                )
            })
            .collect();
        rules.sort_by_key(|(_, priority)| *priority);
        rules
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_configure_full_mesh_on_create() {
        let client = s3_client();
        let mut buckets = Vec::new();
        for prefix in ["mesh-a", "mesh-b", "mesh-c"] {
            buckets.push(create_versioned_bucket(&client, prefix).await);
        }
        let (a, b, c) = (&buckets[0], &buckets[1], &buckets[2]);

        let outcome = mesh_reconciler()
            .reconcile(&RequestKind::Create, &mesh_of(&buckets), "mesh-it")
            .await;
        assert_eq!(outcome.status, ResponseStatus::Success, "{:?}", outcome.error);

        assert_eq!(
            replication_rules(&client, a).await,
            [
                (format!("replicate-{a}-to-{b}"), 1),
                (format!("replicate-{a}-to-{c}"), 2),
            ]
        );
        assert_eq!(
            replication_rules(&client, b).await,
            [
                (format!("replicate-{b}-to-{a}"), 1),
                (format!("replicate-{b}-to-{c}"), 2),
            ]
        );
        assert_eq!(
            replication_rules(&client, c).await,
            [
                (format!("replicate-{c}-to-{a}"), 1),
                (format!("replicate-{c}-to-{b}"), 2),
            ]
        );

        for bucket in &buckets {
            cleanup_bucket(&client, bucket).await;
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_replace_rules_on_update() {
        let client = s3_client();
        let mut buckets = Vec::new();
        for prefix in ["upd-a", "upd-b", "upd-c"] {
            buckets.push(create_versioned_bucket(&client, prefix).await);
        }
        let reconciler = mesh_reconciler();

        let outcome = reconciler
            .reconcile(&RequestKind::Create, &mesh_of(&buckets), "mesh-it")
            .await;
        assert!(outcome.is_success(), "{:?}", outcome.error);

        // Shrink the mesh to two buckets; the survivors keep only one rule each.
        let outcome = reconciler
            .reconcile(&RequestKind::Update, &mesh_of(&buckets[..2]), "mesh-it")
            .await;
        assert!(outcome.is_success(), "{:?}", outcome.error);

        let (a, b) = (&buckets[0], &buckets[1]);
        assert_eq!(
            replication_rules(&client, a).await,
            [(format!("replicate-{a}-to-{b}"), 1)]
        );
        assert_eq!(
            replication_rules(&client, b).await,
            [(format!("replicate-{b}-to-{a}"), 1)]
        );

        for bucket in &buckets {
            cleanup_bucket(&client, bucket).await;
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_replication_on_delete() {
        let client = s3_client();
        let mut buckets = Vec::new();
        for prefix in ["del-a", "del-b"] {
            buckets.push(create_versioned_bucket(&client, prefix).await);
        }
        let reconciler = mesh_reconciler();
        let mesh = mesh_of(&buckets);

        let outcome = reconciler
            .reconcile(&RequestKind::Create, &mesh, "mesh-it")
            .await;
        assert!(outcome.is_success(), "{:?}", outcome.error);

        let outcome = reconciler
            .reconcile(&RequestKind::Delete, &mesh, "mesh-it")
            .await;
        assert!(outcome.is_success(), "{:?}", outcome.error);

        for bucket in &buckets {
            let result = client.get_bucket_replication().bucket(bucket).send().await;
            assert!(result.is_err(), "replication still configured on {bucket}");
        }

        for bucket in &buckets {
            cleanup_bucket(&client, bucket).await;
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_fast_on_missing_bucket() {
        let client = s3_client();
        let existing = create_versioned_bucket(&client, "ff-a").await;
        let missing = crate::test_bucket_name("ff-missing");
        let buckets = vec![missing.clone(), existing.clone()];

        let outcome = mesh_reconciler()
            .reconcile(&RequestKind::Create, &mesh_of(&buckets), "mesh-it")
            .await;

        assert_eq!(outcome.status, ResponseStatus::Failed);
        let error = outcome.error.expect("error");
        assert_eq!(error.bucket(), Some(missing.as_str()));
        // The second bucket is never touched.
        assert!(
            client
                .get_bucket_replication()
                .bucket(&existing)
                .send()
                .await
                .is_err()
        );

        cleanup_bucket(&client, &existing).await;
    }
}
