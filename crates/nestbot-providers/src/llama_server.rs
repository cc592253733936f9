//! llama.cpp server backend.
//!
//! Sends text-completion requests to `{endpoint}/v1/completions`, the
//! OpenAI-compatible route exposed by `llama-server`. The model is loaded
//! and kept on the server; this side only formats requests and parses
//! `choices[].text`.

use nestbot_core::config::BrainConfig;
use nestbot_core::error::{NestBotError, Result};
use nestbot_core::traits::CompletionBackend;
use nestbot_core::types::{CompletionChoice, CompletionRequest, CompletionResponse};
use serde_json::{Value, json};
use tokio::runtime::Handle;

pub struct LlamaServerBackend {
    /// Base URL including `/v1`.
    base_url: String,
    model: String,
    client: reqwest::Client,
    /// Runtime used to drive the async client from blocking worker threads.
    runtime: Handle,
}

impl LlamaServerBackend {
    /// Create from brain config. Requires a current Tokio runtime.
    pub fn new(config: &BrainConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| NestBotError::Provider(format!("no Tokio runtime: {e}")))?;
        Ok(Self {
            base_url: normalize_base_url(&config.endpoint),
            model: config.model.clone(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/completions", self.base_url);
        let body = request_body(&self.model, request);

        tracing::debug!(
            "llama-server completion: prompt_len={}, max_tokens={}",
            request.prompt.len(),
            request.max_tokens
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NestBotError::Http(format!("llama-server connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NestBotError::Provider(format!(
                "llama-server error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| NestBotError::Http(e.to_string()))?;
        parse_response(&json)
    }

    async fn probe(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                tracing::debug!("llama-server health probe failed: {e}");
                false
            }
        }
    }
}

impl CompletionBackend for LlamaServerBackend {
    fn name(&self) -> &str {
        "llama-server"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.runtime.block_on(self.post_completion(request))
    }

    fn health_check(&self) -> Result<bool> {
        Ok(self.runtime.block_on(self.probe()))
    }
}

/// `http://host:8080/` → `http://host:8080/v1`.
fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

fn request_body(model: &str, request: &CompletionRequest) -> Value {
    json!({
        "model": model,
        "prompt": request.prompt,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "stop": request.stop,
        "echo": request.echo,
        "stream": false,
    })
}

fn parse_response(json: &Value) -> Result<CompletionResponse> {
    let choices = json["choices"]
        .as_array()
        .ok_or_else(|| NestBotError::Provider("No choices in response".into()))?;

    Ok(CompletionResponse {
        choices: choices
            .iter()
            .map(|c| CompletionChoice {
                text: c["text"].as_str().unwrap_or_default().to_string(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://127.0.0.1:8080"), "http://127.0.0.1:8080/v1");
        assert_eq!(normalize_base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080/v1");
        assert_eq!(normalize_base_url("http://gpu-box/v1/"), "http://gpu-box/v1");
    }

    #[test]
    fn test_request_body_carries_sampling_params() {
        let req = CompletionRequest {
            prompt: "Question: hi".into(),
            max_tokens: 200,
            temperature: 0.3,
            stop: vec!["Question:".into(), "\n\n".into()],
            echo: false,
        };
        let body = request_body("llama", &req);
        assert_eq!(body["prompt"], "Question: hi");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["stop"][1], "\n\n");
        assert_eq!(body["echo"], false);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "id": "cmpl-1",
            "choices": [{"text": " Use the dev menu. ", "index": 0, "finish_reason": "stop"}]
        });
        let resp = parse_response(&json).unwrap();
        assert_eq!(resp.first_text(), Some(" Use the dev menu. "));
    }

    #[test]
    fn test_parse_response_without_choices_fails() {
        assert!(parse_response(&json!({"error": "loading model"})).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_server_is_unhealthy() {
        let cfg = BrainConfig {
            endpoint: "http://127.0.0.1:9".into(),
            ..BrainConfig::default()
        };
        let backend = LlamaServerBackend::new(&cfg).unwrap();
        let healthy = tokio::task::spawn_blocking(move || backend.health_check())
            .await
            .unwrap()
            .unwrap();
        assert!(!healthy);
    }
}
