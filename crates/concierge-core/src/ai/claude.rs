use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, status_failure, CompletionRequest};
use crate::error::RemoteCallFailed;

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeTool {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    max_uses: u32,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ClaudeTool>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &CompletionRequest) -> ClaudeRequest {
        let tools = if request.enable_web_search {
            vec![ClaudeTool {
                kind: "web_search_20250305".to_string(),
                name: "web_search".to_string(),
                max_uses: 3,
            }]
        } else {
            Vec::new()
        };

        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: request.system_prompt.clone(),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: request.user_text.clone(),
            }],
            tools,
        }
    }

    /// Search results arrive as extra content blocks; only text blocks
    /// make up the answer.
    fn extract_text(response: ClaudeResponse) -> String {
        response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect()
    }

    pub async fn query(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
        let body = self.build_request(request);

        let response = self.client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_failure("Claude", response).await);
        }

        let claude_response: ClaudeResponse = response.json().await?;
        non_empty("Claude", Self::extract_text(claude_response))
    }
}
