use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::{ClaudeClient, ConciergeClient, GeminiClient, OllamaClient, OpenAIClient};
use crate::ai::ollama::DEFAULT_OLLAMA_URL;
use crate::persona::{CallToAction, Persona, DEFAULT_PHONE_NUMBER};
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub default_model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub enable_web_search: Option<bool>,
    pub phone_number: Option<String>,
    /// `"always"` or the phrase that turns on "Get in Touch"
    pub call_to_action: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gemini.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// A missing file is not an error; it yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("waves-concierge"))
    }

    /// `config.json` inside [`Config::config_dir`]
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or(Provider::Gemini)
    }

    pub fn web_search_enabled(&self) -> bool {
        self.enable_web_search.unwrap_or(true)
    }

    pub fn phone_number(&self) -> &str {
        self.phone_number.as_deref().unwrap_or(DEFAULT_PHONE_NUMBER)
    }

    pub fn persona(&self) -> Persona {
        let persona = Persona::waves_n_wishes();
        match self.call_to_action.as_deref() {
            Some(setting) if !setting.trim().is_empty() => {
                persona.with_call_to_action(CallToAction::from_setting(setting))
            }
            _ => persona,
        }
    }

    /// API key for a provider: environment first, then this file
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        provider
            .key_env_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| self.file_key(provider))
    }

    /// Key stored in the config file. Blank values count as unset.
    fn file_key(&self, provider: Provider) -> Option<String> {
        let key = match provider {
            Provider::Gemini => self.gemini_api_key.as_ref(),
            Provider::Claude => self.claude_api_key.as_ref(),
            Provider::OpenAI => self.openai_api_key.as_ref(),
            Provider::Ollama => None,
        };
        key.filter(|k| !k.trim().is_empty()).cloned()
    }

    /// Where the key came from: "env", "config", "local", or None
    pub fn key_source(&self, provider: Provider) -> Option<&'static str> {
        if provider == Provider::Ollama {
            return Some("local");
        }
        if provider
            .key_env_vars()
            .iter()
            .any(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()))
        {
            Some("env")
        } else if self.file_key(provider).is_some() {
            Some("config")
        } else {
            None
        }
    }

    fn ollama_url(&self) -> String {
        std::env::var("OLLAMA_HOST")
            .ok()
            .or_else(|| self.ollama_url.clone())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
    }

    /// Build the one client used for the whole session
    pub fn build_client(&self, provider: Option<Provider>, model: Option<&str>) -> ConciergeClient {
        let provider = provider.unwrap_or_else(|| self.provider());
        // The configured default model only applies to the configured provider
        let model = model
            .map(str::to_string)
            .or_else(|| self.default_model.clone().filter(|_| provider == self.provider()))
            .unwrap_or_else(|| provider.default_model().to_string());

        let key = self.api_key(provider);
        match (provider, key) {
            (Provider::Ollama, _) => {
                ConciergeClient::Ollama(OllamaClient::new(&self.ollama_url(), &model))
            }
            (Provider::Gemini, Some(key)) => ConciergeClient::Gemini(GeminiClient::new(&key, &model)),
            (Provider::Claude, Some(key)) => ConciergeClient::Claude(ClaudeClient::new(&key, &model)),
            (Provider::OpenAI, Some(key)) => ConciergeClient::OpenAI(OpenAIClient::new(&key, &model)),
            (provider, None) => {
                tracing::warn!(provider = provider.as_str(), "no API key configured");
                ConciergeClient::Unconfigured(provider)
            }
        }
    }
}
