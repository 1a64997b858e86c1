//! OpenAI Chat Completions adapter
//!
//! Also works against any server exposing the same `/v1/chat/completions`
//! endpoint (set `providers.openai.base_url`).

use super::{ProviderAdapter, ProviderKind, http_client, status_error, transport_error};
use async_trait::async_trait;
use crew_application::ports::llm_gateway::{GatewayError, LlmSession};
use crew_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, GatewayError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}

pub struct OpenAiProviderAdapter {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
}

impl OpenAiProviderAdapter {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        max_tokens: u32,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            max_tokens,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProviderAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn supports_model(&self, model: &Model) -> bool {
        model.is_gpt()
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            max_tokens: self.max_tokens,
            model: model.clone(),
            system_prompt: system_prompt.to_string(),
        }))
    }
}

/// One system prompt plus a single user turn per `send`.
pub struct OpenAiSession {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
    model: Model,
    system_prompt: String,
}

#[async_trait]
impl LlmSession for OpenAiSession {
    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &self.system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content,
        });

        let request = ChatCompletionRequest {
            model: self.model.as_str(),
            messages,
            max_completion_tokens: self.max_tokens,
        };

        debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::RequestFailed(format!("invalid response body: {}", e)))?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    #[test]
    fn test_response_text_from_first_choice() {
        let body = r#"{"id":"c1","choices":[
            {"index":0,"message":{"role":"assistant","content":"first"}},
            {"index":1,"message":{"role":"assistant","content":"second"}}
        ]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "first");
    }

    #[test]
    fn test_response_without_choices_is_empty() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(parsed.into_text(), Err(GatewayError::EmptyResponse)));

        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(parsed.into_text(), Err(GatewayError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_send_posts_system_and_user_messages() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-5-nano");
                assert_eq!(body["max_completion_tokens"], 512);
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "You are a reviewer.");
                assert_eq!(body["messages"][1]["role"], "user");
                let echoed = body["messages"][1]["content"].as_str().unwrap().to_uppercase();
                Json(json!({"choices":[{"message":{"role":"assistant","content": echoed}}]}))
            }),
        );
        let base = test_server::spawn(router).await;

        let adapter = OpenAiProviderAdapter::new("sk-test", &format!("{}/", base), 512, None);
        let session = adapter
            .create_session_with_system_prompt(&Model::Gpt5Nano, "You are a reviewer.")
            .await
            .unwrap();
        assert_eq!(session.send("review this").await.unwrap(), "REVIEW THIS");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error":{"message":"Incorrect API key provided"}})),
                )
            }),
        );
        let base = test_server::spawn(router).await;

        let adapter = OpenAiProviderAdapter::new("bad", &base, 128, None);
        let session = adapter
            .create_session_with_system_prompt(&Model::Gpt4o, "")
            .await
            .unwrap();
        let err = session.send("hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::Authentication(m) if m.contains("Incorrect API key")));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 9 (discard) is closed on test machines
        let adapter = OpenAiProviderAdapter::new("k", "http://127.0.0.1:9", 128, None);
        let session = adapter
            .create_session_with_system_prompt(&Model::Gpt4o, "")
            .await
            .unwrap();
        let err = session.send("hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }

    #[test]
    fn test_supports_gpt_family_only() {
        let adapter = OpenAiProviderAdapter::new("k", "https://api.openai.com", 128, None);
        assert!(adapter.supports_model(&Model::Gpt5));
        assert!(adapter.supports_model(&Model::Custom("o3-mini".to_string())));
        assert!(!adapter.supports_model(&Model::ClaudeHaiku45));
    }
}
