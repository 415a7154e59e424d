//! Minimal client for the Lambda Runtime API.
//!
//! The handler ships as a custom runtime (`bootstrap`), so it polls
//! `/runtime/invocation/next` itself and posts each result back:
//!
//! - SUCCESS responses go to `/invocation/{id}/response`.
//! - FAILED responses go to `/invocation/{id}/error`, which is how the CDK
//!   provider framework learns that the resource operation failed.
//!
//! When response upload is enabled, the CloudFormation response is also PUT
//! to the request's pre-signed `ResponseURL`, and the invocation itself is
//! reported as successful. If that upload fails, the invocation is reported
//! as an error instead.

use anyhow::{Context, Result};
use bucketmesh_model::{CustomResourceRequest, CustomResourceResponse, ResponseStatus};
use serde::Serialize;
use tracing::{Instrument, error, info_span, warn};

use crate::handler::MeshHandler;

/// Runtime API version prefix.
const RUNTIME_API_VERSION: &str = "2018-06-01";

/// Header carrying the invocation's request id.
const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";

/// Error type reported for events that are not custom resource requests.
const INVALID_EVENT_ERROR: &str = "InvalidEvent";

/// Error type reported for failed reconciliations.
const RECONCILE_ERROR: &str = "BucketMeshError";

/// One invocation fetched from the Runtime API.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Lambda request id.
    pub request_id: String,
    /// Raw event payload.
    pub payload: Vec<u8>,
}

/// Error body accepted by the Runtime API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvocationError<'a> {
    error_type: &'a str,
    error_message: &'a str,
}

/// HTTP client for the Lambda Runtime API.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base_url: String,
}

impl RuntimeClient {
    /// Create a client for the Runtime API at `host` (`AWS_LAMBDA_RUNTIME_API`).
    #[must_use]
    pub fn new(host: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("http://{host}/{RUNTIME_API_VERSION}/runtime"),
        }
    }

    /// Block until the next invocation is available.
    pub async fn next_invocation(&self) -> Result<Invocation> {
        let url = format!("{}/invocation/next", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to poll {url}"))?
            .error_for_status()
            .context("runtime API rejected next invocation request")?;

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .context("next invocation response has no request id")?
            .to_owned();
        let payload = response
            .bytes()
            .await
            .context("failed to read invocation payload")?
            .to_vec();

        Ok(Invocation {
            request_id,
            payload,
        })
    }

    /// Report a successful invocation result.
    pub async fn send_response<T: Serialize + Sync>(&self, request_id: &str, body: &T) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/response", self.base_url);
        self.http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to post response to {url}"))?
            .error_for_status()
            .context("runtime API rejected invocation response")?;
        Ok(())
    }

    /// Report a failed invocation.
    pub async fn send_error(&self, request_id: &str, error_type: &str, message: &str) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/error", self.base_url);
        self.http
            .post(&url)
            .header("Lambda-Runtime-Function-Error-Type", error_type)
            .json(&InvocationError {
                error_type,
                error_message: message,
            })
            .send()
            .await
            .with_context(|| format!("failed to post error to {url}"))?
            .error_for_status()
            .context("runtime API rejected invocation error")?;
        Ok(())
    }

    /// Upload a CloudFormation response to the request's pre-signed URL.
    pub async fn upload_response(&self, url: &str, response: &CustomResourceResponse) -> Result<()> {
        let body = serde_json::to_vec(response).context("failed to encode response")?;
        // The pre-signed URL is signed with an empty content type.
        self.http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .context("failed to upload response to ResponseURL")?
            .error_for_status()
            .context("ResponseURL rejected the response")?;
        Ok(())
    }
}

/// Serve invocations until the Runtime API becomes unreachable.
pub async fn run(runtime: &RuntimeClient, handler: &MeshHandler, upload_responses: bool) -> Result<()> {
    loop {
        let invocation = runtime.next_invocation().await?;
        let span = info_span!("invocation", request_id = %invocation.request_id);

        if let Err(e) = process(runtime, handler, upload_responses, &invocation)
            .instrument(span)
            .await
        {
            error!(request_id = %invocation.request_id, error = %e, "failed to complete invocation");
        }
    }
}

/// Handle one invocation and report its result.
async fn process(
    runtime: &RuntimeClient,
    handler: &MeshHandler,
    upload_responses: bool,
    invocation: &Invocation,
) -> Result<()> {
    let request: CustomResourceRequest = match serde_json::from_slice(&invocation.payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "event is not a custom resource request");
            return runtime
                .send_error(&invocation.request_id, INVALID_EVENT_ERROR, &e.to_string())
                .await;
        }
    };

    let response = handler.handle(&request).await;

    if upload_responses {
        if let Some(url) = request.response_url.as_deref() {
            // A failed upload still concludes the invocation.
            if let Err(e) = runtime.upload_response(url, &response).await {
                runtime
                    .send_error(&invocation.request_id, RECONCILE_ERROR, &format!("{e:#}"))
                    .await?;
                return Err(e);
            }
            return runtime
                .send_response(&invocation.request_id, &response)
                .await;
        }
    }

    match response.status {
        ResponseStatus::Success => {
            runtime
                .send_response(&invocation.request_id, &response)
                .await
        }
        ResponseStatus::Failed => {
            let reason = response.reason.as_deref().unwrap_or("reconciliation failed");
            runtime
                .send_error(&invocation.request_id, RECONCILE_ERROR, reason)
                .await
        }
    }
}
