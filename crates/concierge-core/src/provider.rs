#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Claude,
    OpenAI,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
            Provider::Ollama => "ollama",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "claude" | "anthropic" => Some(Provider::Claude),
            "openai" => Some(Provider::OpenAI),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Gemini, Provider::Claude, Provider::OpenAI, Provider::Ollama]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini (Google)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::OpenAI => "ChatGPT (OpenAI)",
            Provider::Ollama => "Ollama (Local)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-pro",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-4o",
            Provider::Ollama => "llama3.2:latest",
        }
    }

    /// Environment variables checked for an API key, in order
    pub fn key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            Provider::Claude => &["ANTHROPIC_API_KEY"],
            Provider::OpenAI => &["OPENAI_API_KEY"],
            Provider::Ollama => &[],
        }
    }

    pub fn supports_web_search(&self) -> bool {
        matches!(self, Provider::Gemini | Provider::Claude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(Provider::from_str(" Google "), Some(Provider::Gemini));
        assert_eq!(Provider::from_str("bard"), None);
    }

    #[test]
    fn test_only_local_provider_needs_no_key() {
        assert!(Provider::Ollama.key_env_vars().is_empty());
        assert!(Provider::Gemini.key_env_vars().contains(&"GEMINI_API_KEY"));
    }

    #[test]
    fn test_web_search_only_on_hosted_search_providers() {
        assert!(Provider::Gemini.supports_web_search());
        assert!(Provider::Claude.supports_web_search());
        assert!(!Provider::OpenAI.supports_web_search());
        assert!(!Provider::Ollama.supports_web_search());
    }
}
