//! Custom resource request handling.
//!
//! [`MeshHandler`] decodes the resource properties, runs the reconciler for
//! the request's lifecycle event and turns the outcome into the response
//! document CloudFormation expects.

use bucketmesh_core::reconciler::{ReconciliationOutcome, Reconciler};
use bucketmesh_core::validation;
use bucketmesh_model::{CustomResourceRequest, CustomResourceResponse};
use tracing::{info, warn};

/// Handles one custom resource request at a time.
#[derive(Debug, Clone)]
pub struct MeshHandler {
    reconciler: Reconciler,
    default_physical_resource_id: String,
}

impl MeshHandler {
    /// Create a handler.
    ///
    /// `default_physical_resource_id` is reported when the request carries no
    /// physical id (i.e. on Create).
    pub fn new(reconciler: Reconciler, default_physical_resource_id: impl Into<String>) -> Self {
        Self {
            reconciler,
            default_physical_resource_id: default_physical_resource_id.into(),
        }
    }

    /// Handle a request and build its response.
    pub async fn handle(&self, request: &CustomResourceRequest) -> CustomResourceResponse {
        let physical_resource_id = request
            .physical_resource_id()
            .unwrap_or(self.default_physical_resource_id.as_str());

        info!(
            request_type = %request.request_type,
            logical_resource_id = %request.logical_resource_id,
            physical_resource_id,
            "handling custom resource request"
        );

        let outcome = match validation::parse(&request.resource_properties) {
            Ok(mesh) => {
                self.reconciler
                    .reconcile(&request.request_type, &mesh, physical_resource_id)
                    .await
            }
            Err(e) => {
                warn!(error = %e, "rejected resource properties");
                ReconciliationOutcome::failed(physical_resource_id, e.into())
            }
        };

        into_response(request, outcome)
    }
}

fn into_response(
    request: &CustomResourceRequest,
    outcome: ReconciliationOutcome,
) -> CustomResourceResponse {
    match outcome.error {
        None => CustomResourceResponse::success(request, outcome.physical_resource_id),
        Some(e) => {
            CustomResourceResponse::failed(request, outcome.physical_resource_id, e.to_string())
        }
    }
}
