//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use foundry_common::{
    detail_message, ApprovalRequest, ApprovalResponse, GenerateRequest, HealthStatus,
    ProtocolList, ProtocolRecord, ProtocolState,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{TransportError, TransportResult, WorkflowTransport};

/// HTTP transport for the workflow server
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `base_url`
    ///
    /// `timeout` of `None` waits on the server indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> TransportResult<Self> {
        let mut parsed = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        // Joining relative paths replaces the last segment unless the path ends in '/'
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(concat!("foundry/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint under the base URL, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> TransportResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        decode(response).await
    }

    async fn get_json<T>(&self, segments: &[&str], query: &[(&str, String)]) -> TransportResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        decode(response).await
    }
}

/// Read the body once, then either decode it or turn it into a status error
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> TransportResult<T> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;

    if !status.is_success() {
        let detail = detail_message(&body);
        tracing::debug!("server returned {} (detail: {:?})", status, detail);
        return Err(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl WorkflowTransport for HttpTransport {
    async fn generate(&self, request: &GenerateRequest) -> TransportResult<ProtocolState> {
        self.post_json(&["generate"], request).await
    }

    async fn approve(&self, request: &ApprovalRequest) -> TransportResult<ApprovalResponse> {
        self.post_json(&["approve"], request).await
    }

    async fn health(&self) -> TransportResult<HealthStatus> {
        self.get_json(&["health"], &[]).await
    }

    async fn fetch_protocol(&self, thread_id: &str) -> TransportResult<ProtocolRecord> {
        self.get_json(&["protocol", thread_id], &[]).await
    }

    async fn list_protocols(&self, limit: usize) -> TransportResult<ProtocolList> {
        self.get_json(&["protocols"], &[("limit", limit.to_string())])
            .await
    }
}
