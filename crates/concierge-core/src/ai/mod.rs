pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use std::future::Future;

use crate::error::RemoteCallFailed;
use crate::provider::Provider;

/// Everything one remote completion call carries. Only the latest user
/// text is sent; the model sees no earlier turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_text: String,
    pub enable_web_search: bool,
}

/// A single-attempt remote completion
pub trait Completion {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, RemoteCallFailed>> + Send;
}

/// The process-wide client, built once from config and cloned into each
/// background call.
#[derive(Clone)]
pub enum ConciergeClient {
    Gemini(GeminiClient),
    Claude(ClaudeClient),
    OpenAI(OpenAIClient),
    Ollama(OllamaClient),
    /// Selected provider has no API key; every call fails
    Unconfigured(Provider),
}

impl ConciergeClient {
    pub fn provider(&self) -> Provider {
        match self {
            ConciergeClient::Gemini(_) => Provider::Gemini,
            ConciergeClient::Claude(_) => Provider::Claude,
            ConciergeClient::OpenAI(_) => Provider::OpenAI,
            ConciergeClient::Ollama(_) => Provider::Ollama,
            ConciergeClient::Unconfigured(provider) => *provider,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ConciergeClient::Gemini(c) => c.model(),
            ConciergeClient::Claude(c) => c.model(),
            ConciergeClient::OpenAI(c) => c.model(),
            ConciergeClient::Ollama(c) => c.model(),
            ConciergeClient::Unconfigured(provider) => provider.default_model(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, ConciergeClient::Unconfigured(_))
    }
}

impl Completion for ConciergeClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
        tracing::debug!(
            provider = self.provider().as_str(),
            model = self.model(),
            web_search = request.enable_web_search,
            chars = request.user_text.chars().count(),
            "sending completion request"
        );
        match self {
            ConciergeClient::Gemini(c) => c.query(request).await,
            ConciergeClient::Claude(c) => c.query(request).await,
            ConciergeClient::OpenAI(c) => c.query(request).await,
            ConciergeClient::Ollama(c) => c.query(request).await,
            ConciergeClient::Unconfigured(provider) => {
                Err(RemoteCallFailed::missing_credentials(provider.display_name()))
            }
        }
    }
}

/// Turn a non-2xx response into a failure, keeping the body for the log
pub(crate) async fn status_failure(provider: &str, response: reqwest::Response) -> RemoteCallFailed {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    RemoteCallFailed::status(
        status.as_u16(),
        format!("{} API error {}: {}", provider, status, text),
    )
}

/// Empty answers are a failure, not an empty turn
pub(crate) fn non_empty(provider: &str, text: String) -> Result<String, RemoteCallFailed> {
    if text.trim().is_empty() {
        Err(RemoteCallFailed::payload(format!(
            "{} returned no text",
            provider
        )))
    } else {
        Ok(text)
    }
}
