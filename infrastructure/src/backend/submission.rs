//! `submit_decision` over HTTP
//!
//! Posts the decision to `{backend}/diagnoses`; the backend answers with
//! `{ "diagnosis_id": ..., "timestamp": ... }`.

use crate::http::{HttpClient, send_json};
use async_trait::async_trait;
use crew_application::ToolAdapter;
use crew_domain::ToolError;
use crew_domain::tool::entities::SUBMIT_DECISION;
use crew_domain::tool::payloads::SubmitArgs;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct DiagnosisBody<'a> {
    patient_id: &'a str,
    icd_codes: &'a [String],
    clinical_summary: &'a str,
    decision: &'a Value,
}

pub struct HttpSubmissionTool {
    client: HttpClient,
    base_url: String,
}

impl HttpSubmissionTool {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ToolAdapter for HttpSubmissionTool {
    fn name(&self) -> &str {
        SUBMIT_DECISION
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: SubmitArgs = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_input(SUBMIT_DECISION, e.to_string()))?;
        if args.subject_id.trim().is_empty() {
            return Err(ToolError::invalid_input(
                SUBMIT_DECISION,
                "no subject id to file the decision under",
            ));
        }

        let body = DiagnosisBody {
            patient_id: &args.subject_id,
            icd_codes: &args.icd_codes,
            clinical_summary: &args.clinical_summary,
            decision: &args.decision,
        };
        let url = format!("{}/diagnoses", self.base_url);
        send_json(SUBMIT_DECISION, self.client.post(&url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_server::serve_once;
    use crew_domain::ToolErrorKind;
    use serde_json::json;

    fn args(subject: &str) -> Value {
        json!({
            "subject_id": subject,
            "icd_codes": ["CA40"],
            "clinical_summary": "PRELIMINARY ASSESSMENT: ...",
            "decision": { "hypothesis": "Findings consistent with Pneumonia" }
        })
    }

    #[tokio::test]
    async fn test_posts_diagnosis() {
        let (url, captured) = serve_once(
            201,
            r#"{"diagnosis_id":"dx-1","timestamp":"2026-05-01T12:00:00Z"}"#,
        )
        .await;
        let tool = HttpSubmissionTool::new(HttpClient::new(None).unwrap(), url);

        let ack = tool.invoke(&args("pt-42")).await.unwrap();

        assert_eq!(ack["diagnosis_id"], "dx-1");
        let request = captured.await.unwrap();
        assert!(request.head.starts_with("POST /diagnoses"));
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["patient_id"], "pt-42");
        assert_eq!(body["icd_codes"], json!(["CA40"]));
    }

    #[tokio::test]
    async fn test_blank_subject_is_invalid_input() {
        let tool = HttpSubmissionTool::new(HttpClient::new(None).unwrap(), "http://127.0.0.1:9");

        let err = tool.invoke(&args("")).await.unwrap_err();

        assert_eq!(err.kind, ToolErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let (url, _captured) = serve_once(502, "bad gateway").await;
        let tool = HttpSubmissionTool::new(HttpClient::new(None).unwrap(), url);

        let err = tool.invoke(&args("pt-42")).await.unwrap_err();

        assert!(err.is_transient());
    }
}
