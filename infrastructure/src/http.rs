//! Shared HTTP plumbing for the backend and remote tool adapters
//!
//! Timeouts and retries belong to the gateway; this client only carries
//! credentials and turns transport outcomes into [`ToolError`]s.

use crew_domain::{ToolError, ToolErrorKind};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest` client with an optional bearer token.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("diagnostic-crew/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.post(url))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Classify a transport error.
pub fn transport_error(tool: &str, err: &reqwest::Error) -> ToolError {
    let kind = if err.is_timeout() {
        ToolErrorKind::Timeout
    } else if err.is_decode() {
        ToolErrorKind::MalformedOutput
    } else if err.is_builder() {
        ToolErrorKind::InvalidInput
    } else {
        ToolErrorKind::Network
    };
    ToolError::new(tool, kind, err.to_string())
}

/// Send `request` and read a successful response body.
///
/// A JSON body is returned as-is; any other body comes back as a string so
/// the gateway can look for a fenced JSON block inside it.
pub async fn send_json(tool: &str, request: RequestBuilder) -> Result<Value, ToolError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(tool, &e))?;
    read_json(tool, response).await
}

async fn read_json(tool: &str, response: Response) -> Result<Value, ToolError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(tool, &e))?;

    if !status.is_success() {
        debug!(tool, status = status.as_u16(), "Remote call refused");
        return Err(ToolError::new(
            tool,
            ToolErrorKind::from_http_status(status.as_u16()),
            format!("HTTP {}: {}", status, excerpt(&body)),
        ));
    }

    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
