//! HTTP backends for the hosted completion service and a local Ollama server.
//!
//! Both map transport and status failures onto [`LLMError`]: timeouts,
//! unreachable hosts, 408, 429 and 5xx are transient; every other failure is
//! permanent and carries the server's own message.

use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ModelId;
use crate::traits::{GenerationParams, LLMError, TextGenerator};

pub(crate) fn transport_error(err: reqwest::Error) -> LLMError {
    if err.is_builder() || err.is_redirect() || err.is_decode() {
        LLMError::Permanent(err.to_string())
    } else {
        LLMError::Transient(err.to_string())
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Pull a human readable message out of an error body.
fn service_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.pointer("/error/message"))
            .or_else(|| v.get("error"))
            .or_else(|| v.get("detail"))
            .and_then(Value::as_str)
    });
    match message {
        Some(m) => m.to_string(),
        None => body.trim().to_string(),
    }
}

/// Turn a non-success response into an error, keeping the body text.
async fn status_error(resp: Response) -> LLMError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = service_message(&body);
    let text = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {message}")
    };
    if is_transient(status) {
        LLMError::Transient(text)
    } else {
        LLMError::Permanent(text)
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone, Debug)]
pub struct HostedClient {
    pub base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HostedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[async_trait]
impl TextGenerator for HostedClient {
    async fn complete(
        &self,
        model: &ModelId,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LLMError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("POST {} model={}", url, model);
        let body = ChatRequest {
            model: model.as_str(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature(),
            max_tokens: params.max_tokens(),
        };
        let mut req = self.client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LLMError::Permanent(format!("unexpected response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LLMError::Permanent("response contained no choices".into()))
    }
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama server's `/api/generate` endpoint.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    pub base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn complete(
        &self,
        model: &ModelId,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LLMError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} model={}", url, model);
        let body = GenerateRequest {
            model: model.as_str(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature(),
                num_predict: params.max_tokens(),
            },
        };
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LLMError::Permanent(format!("unexpected response: {e}")))?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::REQUEST_TIMEOUT));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn service_message_prefers_json_fields() {
        assert_eq!(service_message(r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(
            service_message(r#"{"error":{"message":"model not found"}}"#),
            "model not found"
        );
        assert_eq!(service_message(r#"{"error":"no such model"}"#), "no such model");
        assert_eq!(service_message(" plain text \n"), "plain text");
    }
}
