//! HTTP bootstrap adapter
//!
//! `GET {backend}/patients/{id}` answers with the modality references and
//! clinical notes the backend holds for a subject:
//!
//! ```json
//! { "intake_urls": { "audio": "...", "image": "..." }, "clinical_notes": "..." }
//! ```

use crate::http::{HttpClient, transport_error};
use async_trait::async_trait;
use crew_application::{BootstrapError, ContextBootstrapPort, InitialContext};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntakeUrls {
    audio: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PatientRecord {
    intake_urls: IntakeUrls,
    clinical_notes: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fetches the initial context from the patient backend.
pub struct HttpBootstrap {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl HttpBootstrap {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on the whole request, body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base}/patients/{subject_id}`, with the id as one encoded segment.
    fn patient_url(&self, subject_id: &str) -> Result<Url, BootstrapError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            BootstrapError::Unavailable(format!("invalid backend url '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BootstrapError::Unavailable(format!(
                    "backend url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("patients")
            .push(subject_id);
        Ok(url)
    }
}

#[async_trait]
impl ContextBootstrapPort for HttpBootstrap {
    async fn fetch_initial_context(
        &self,
        subject_id: &str,
    ) -> Result<InitialContext, BootstrapError> {
        let url = self.patient_url(subject_id)?;
        debug!(url = %url, "Fetching initial context");

        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BootstrapError::Unavailable(transport_error("bootstrap", &e).message))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("GET {} returned {}", url, status);
            return Err(match status.as_u16() {
                404 => BootstrapError::NotFound(subject_id.to_string()),
                401 | 403 => BootstrapError::Unauthorized(message),
                _ => BootstrapError::Unavailable(message),
            });
        }

        let record: PatientRecord = response
            .json()
            .await
            .map_err(|e| BootstrapError::Malformed(e.to_string()))?;

        let context = InitialContext {
            audio_ref: present(record.intake_urls.audio),
            image_ref: present(record.intake_urls.image),
            clinical_notes: present(record.clinical_notes),
        };
        info!(
            subject_id,
            audio = context.audio_ref.is_some(),
            image = context.image_ref.is_some(),
            notes = context.clinical_notes.is_some(),
            "Initial context fetched"
        );
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_server::{accept_silently, serve_once};

    #[tokio::test]
    async fn test_fetch_maps_intake_urls() {
        let (url, captured) = serve_once(
            200,
            r#"{"intake_urls":{"audio":"https://cdn/a.wav","image":""},"clinical_notes":"Fever"}"#,
        )
        .await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), format!("{}/", url));

        let context = bootstrap.fetch_initial_context("pt-42").await.unwrap();

        assert_eq!(context.audio_ref.as_deref(), Some("https://cdn/a.wav"));
        assert!(context.image_ref.is_none());
        assert_eq!(context.clinical_notes.as_deref(), Some("Fever"));
        assert!(captured.await.unwrap().head.starts_with("GET /patients/pt-42"));
    }

    #[tokio::test]
    async fn test_subject_id_is_one_path_segment() {
        let (url, captured) = serve_once(200, "{}").await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), url);

        bootstrap
            .fetch_initial_context("pt-42?admin=1#x/y")
            .await
            .unwrap();

        let head = captured.await.unwrap().head;
        assert!(
            head.starts_with("GET /patients/pt-42%3Fadmin=1%23x%2Fy HTTP/1.1"),
            "unexpected request line: {}",
            head.lines().next().unwrap_or_default()
        );
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let (url, captured) = serve_once(200, "{}").await;
        let bootstrap =
            HttpBootstrap::new(HttpClient::new(None).unwrap(), format!("{}/api/v1/", url));

        bootstrap.fetch_initial_context("pt-7").await.unwrap();

        assert!(captured.await.unwrap().head.starts_with("GET /api/v1/patients/pt-7 "));
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        let url = accept_silently().await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), url)
            .with_timeout(Duration::from_millis(200));

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            bootstrap.fetch_initial_context("pt-42"),
        )
        .await
        .expect("bootstrap must give up on its own");

        assert!(matches!(outcome, Err(BootstrapError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (url, _captured) = serve_once(404, "{}").await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), url);

        let err = bootstrap.fetch_initial_context("pt-0").await.unwrap_err();

        assert_eq!(err, BootstrapError::NotFound("pt-0".to_string()));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (url, _captured) = serve_once(401, "{}").await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), url);

        let err = bootstrap.fetch_initial_context("pt-1").await.unwrap_err();

        assert!(matches!(err, BootstrapError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (url, _captured) = serve_once(200, "not json").await;
        let bootstrap = HttpBootstrap::new(HttpClient::new(None).unwrap(), url);

        let err = bootstrap.fetch_initial_context("pt-1").await.unwrap_err();

        assert!(matches!(err, BootstrapError::Malformed(_)));
    }
}
