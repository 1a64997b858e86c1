//! Anthropic Messages API adapter

use super::{ProviderAdapter, ProviderKind, http_client, status_error, transport_error};
use async_trait::async_trait;
use crew_application::ports::llm_gateway::{GatewayError, LlmSession};
use crew_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    fn into_text(self) -> Result<String, GatewayError> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            Err(GatewayError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

pub struct AnthropicProviderAdapter {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    api_version: String,
    max_tokens: u32,
}

impl AnthropicProviderAdapter {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        max_tokens: u32,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens,
        }
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        if !version.trim().is_empty() {
            self.api_version = version.trim().to_string();
        }
        self
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProviderAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn supports_model(&self, model: &Model) -> bool {
        model.is_claude()
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(AnthropicSession {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            api_version: self.api_version.clone(),
            max_tokens: self.max_tokens,
            model: model.clone(),
            system_prompt: system_prompt.to_string(),
        }))
    }
}

pub struct AnthropicSession {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    api_version: String,
    max_tokens: u32,
    model: Model,
    system_prompt: String,
}

#[async_trait]
impl LlmSession for AnthropicSession {
    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let request = MessagesRequest {
            model: self.model.as_str(),
            max_tokens: self.max_tokens,
            system: (!self.system_prompt.is_empty()).then_some(self.system_prompt.as_str()),
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
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
    fn test_text_blocks_are_concatenated() {
        let body = r###"{"id":"msg_1","type":"message","content":[
            {"type":"text","text":"## Findings\n"},
            {"type":"thinking","thinking":"..."},
            {"type":"text","text":"- HIGH: line 4"}
        ]}"###;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "## Findings\n- HIGH: line 4");
    }

    #[test]
    fn test_no_text_blocks_is_empty_response() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(parsed.into_text(), Err(GatewayError::EmptyResponse)));
    }

    #[test]
    fn test_system_prompt_omitted_when_blank() {
        let request = MessagesRequest {
            model: "claude-haiku-4-5",
            max_tokens: 10,
            system: None,
            messages: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
    }

    #[tokio::test]
    async fn test_send_uses_anthropic_headers() {
        let router = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if headers["x-api-key"] != "sk-ant" || headers["anthropic-version"] != "2024-01-01" {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error":{"message":"bad headers"}})));
                }
                assert_eq!(body["system"], "Be terse.");
                assert_eq!(body["max_tokens"], 64);
                (
                    StatusCode::OK,
                    Json(json!({"content":[{"type":"text","text":"ok"}]})),
                )
            }),
        );
        let base = test_server::spawn(router).await;

        let adapter =
            AnthropicProviderAdapter::new("sk-ant", &base, 64, None).with_api_version("2024-01-01");
        let session = adapter
            .create_session_with_system_prompt(&Model::ClaudeHaiku45, "Be terse.")
            .await
            .unwrap();
        assert_eq!(session.send("hello").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_server_error_is_request_failed() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }),
        );
        let base = test_server::spawn(router).await;

        let adapter = AnthropicProviderAdapter::new("k", &base, 64, None);
        let session = adapter
            .create_session_with_system_prompt(&Model::ClaudeSonnet45, "")
            .await
            .unwrap();
        let err = session.send("hello").await.unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed(m) if m == "HTTP 500: overloaded"));
    }
}
