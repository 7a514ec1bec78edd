use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, status_failure, CompletionRequest};
use crate::error::RemoteCallFailed;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
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

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", DEFAULT_BASE_URL, self.model)
    }

    fn build_request(request: &CompletionRequest) -> GeminiRequest {
        let tools = if request.enable_web_search {
            vec![GeminiTool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.user_text.clone()),
                }],
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system_prompt.clone()),
                }],
            },
            tools,
        }
    }

    /// Concatenate the text parts of the first candidate. Grounded answers
    /// come back split across several parts.
    fn extract_text(response: GeminiResponse) -> String {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub async fn query(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
        let body = Self::build_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_failure("Gemini", response).await);
        }

        let gemini_response: GeminiResponse = response.json().await?;
        non_empty("Gemini", Self::extract_text(gemini_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(web: bool) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are a concierge".to_string(),
            user_text: "I want adventure".to_string(),
            enable_web_search: web,
        }
    }

    #[test]
    fn test_request_shape_with_search() {
        let value = serde_json::to_value(GeminiClient::build_request(&request(true))).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "I want adventure"}]}],
                "systemInstruction": {"parts": [{"text": "You are a concierge"}]},
                "tools": [{"googleSearch": {}}]
            })
        );
    }

    #[test]
    fn test_request_without_search_omits_tools() {
        let value = serde_json::to_value(GeminiClient::build_request(&request(false))).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_extract_joins_parts_of_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "The **Squalo** "}, {"text": "awaits."}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10}
        }))
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response), "The **Squalo** awaits.");
    }

    #[test]
    fn test_extract_handles_blocked_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response), "");

        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(GeminiClient::extract_text(empty), "");
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("k", "gemini-2.5-pro");
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
