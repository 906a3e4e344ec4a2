use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{CompletionError, CompletionSettings, TextCompletion, check_status};

const PROVIDER: &str = "Ollama";

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    settings: CompletionSettings,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: String, settings: CompletionSettings) -> Self {
        Self {
            base_url,
            settings,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let request = OllamaRequest {
            model: &self.settings.model,
            prompt,
            system: &self.settings.system_prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.settings.temperature,
            },
        };

        debug!(model = %self.settings.model, prompt_chars = prompt.len(), "Sending Ollama request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| CompletionError::Request {
                provider: PROVIDER,
                source,
            })?;

        let response = check_status(PROVIDER, response).await?;

        let ollama_response: OllamaResponse =
            response
                .json()
                .await
                .map_err(|source| CompletionError::Decode {
                    provider: PROVIDER,
                    source,
                })?;

        Ok(ollama_response.response)
    }
}

#[async_trait]
impl TextCompletion for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_sends_fixed_settings() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "prompt": "Summarize this",
                "system": "You are a helpful AI assistant.",
                "stream": false,
                "options": { "temperature": 0.8 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "**Introduction**: ...",
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(mock_server.uri(), CompletionSettings::new("llama3"));
        let output = client.complete("Summarize this").await.unwrap();

        assert_eq!(output, "**Introduction**: ...");
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(mock_server.uri(), CompletionSettings::new("llama3"));
        let err = client.complete("prompt").await.unwrap_err();

        assert!(matches!(err, CompletionError::Status { .. }));
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = OllamaClient::new(mock_server.uri(), CompletionSettings::new("llama3"));
        let err = client.complete("prompt").await.unwrap_err();

        assert!(matches!(err, CompletionError::Decode { .. }));
    }
}
