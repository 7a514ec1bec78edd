use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, status_failure, CompletionRequest};
use crate::error::RemoteCallFailed;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    system: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &CompletionRequest) -> OllamaRequest {
        if request.enable_web_search {
            tracing::debug!("web search is not available for local models; ignoring");
        }

        OllamaRequest {
            model: self.model.clone(),
            prompt: request.user_text.clone(),
            system: request.system_prompt.clone(),
            stream: false,
        }
    }

    pub async fn query(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
        let url = format!("{}/api/generate", self.base_url);
        let body = self.build_request(request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_failure("Ollama", response).await);
        }

        let ollama_response: OllamaResponse = response.json().await?;
        non_empty("Ollama", ollama_response.response)
    }
}
