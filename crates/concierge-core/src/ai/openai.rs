use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, status_failure, CompletionRequest};
use crate::error::RemoteCallFailed;

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAIClient {
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

    fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        if request.enable_web_search {
            tracing::debug!("web search is not available for chat completions; ignoring");
        }

        OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: request.user_text.clone(),
                },
            ],
        }
    }

    pub async fn query(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
        let body = self.build_request(request);

        let response = self.client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_failure("OpenAI", response).await);
        }

        let openai_response: OpenAIResponse = response.json().await?;
        let text = openai_response.choices.into_iter().next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty("OpenAI", text)
    }
}
