//! Remote inference tool
//!
//! Each tool is an endpoint on the tool service: the arguments are posted
//! as the JSON body of `POST {endpoint}/tools/{name}` and the response body
//! is the tool output.

use crate::http::{HttpClient, send_json};
use async_trait::async_trait;
use crew_application::ToolAdapter;
use crew_domain::ToolError;
use serde_json::Value;

pub struct RemoteTool {
    name: String,
    url: String,
    client: HttpClient,
}

impl RemoteTool {
    pub fn new(client: HttpClient, endpoint: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("{}/tools/{}", endpoint.trim_end_matches('/'), name);
        Self { name, url, client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ToolAdapter for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, ToolError> {
        send_json(&self.name, self.client.post(&self.url).json(arguments)).await
    }
}
