use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use summarize::{
    CompletionSettings, OllamaClient, OpenAiClient, RetryPolicy, RetryingCompletion,
    SummaryLimits, TextCompletion,
};

/// Names a JSON config file to load instead of the defaults.
pub const CONFIG_PATH_ENV: &str = "STUDY_ASSISTANT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub limits: SummaryLimits,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: None,
            model: None,
            temperature: summarize::llm::DEFAULT_TEMPERATURE,
            request_timeout_secs: 120,
            api_key: None,
        }
    }
}

impl Default for RetryConfig {
    // No retries unless configured.
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.as_str(),
            (None, LlmProvider::OpenAi) => summarize::openai::OPENAI_API_BASE,
            (None, LlmProvider::Ollama) => "http://localhost:11434",
        }
    }

    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model.as_str(),
            (None, LlmProvider::OpenAi) => "gpt-4-turbo",
            (None, LlmProvider::Ollama) => "llama3",
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Ollama => "ollama",
        }
    }
}

impl AppConfig {
    /// Defaults, or the file named by `STUDY_ASSISTANT_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("STUDY_ASSISTANT_BIND") {
            self.server.bind_addr = bind;
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = match provider.to_lowercase().as_str() {
                "openai" => LlmProvider::OpenAi,
                "ollama" => LlmProvider::Ollama,
                other => anyhow::bail!("Unsupported LLM_PROVIDER: {}", other),
            };
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        Ok(())
    }

    /// Build the configured completion client, wrapped in the retry policy.
    pub fn completion_service(&self) -> Result<Arc<dyn TextCompletion>> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.llm.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let settings = CompletionSettings::new(self.llm.model()).with_temperature(self.llm.temperature);
        let base_url = self.llm.base_url().to_string();

        let policy = RetryPolicy::new(
            self.retry.max_retries,
            self.retry.initial_backoff_ms,
            self.retry.max_backoff_ms,
        );

        let service: Arc<dyn TextCompletion> = match self.llm.provider {
            LlmProvider::OpenAi => {
                if self.llm.api_key.is_none() {
                    tracing::warn!("OPENAI_API_KEY is not set; requests will be unauthenticated");
                }
                let client = OpenAiClient::new(base_url, self.llm.api_key.clone(), settings)
                    .with_http_client(http);
                Arc::new(RetryingCompletion::new(client, policy))
            }
            LlmProvider::Ollama => {
                let client = OllamaClient::new(base_url, settings).with_http_client(http);
                Arc::new(RetryingCompletion::new(client, policy))
            }
        };

        Ok(service)
    }
}
