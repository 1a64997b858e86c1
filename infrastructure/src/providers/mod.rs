//! LLM provider adapters
//!
//! Each adapter talks to one vendor API; [`routing::RoutingGateway`] picks
//! the adapter for a model and implements the application's `LlmGateway`.

pub mod anthropic;
pub mod openai;
pub mod routing;

use crate::config::FileConfig;
use async_trait::async_trait;
use crew_application::ports::llm_gateway::{GatewayError, LlmSession};
use crew_domain::Model;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use anthropic::AnthropicProviderAdapter;
pub use openai::OpenAiProviderAdapter;
pub use routing::RoutingGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "anthropic" => Some(ProviderKind::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    /// Whether the model belongs to this provider's family
    fn supports_model(&self, model: &Model) -> bool;
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// Build the routing gateway from configuration.
///
/// Only providers with a resolvable API key are registered. `timeout`
/// bounds each HTTP request.
pub fn gateway_from_config(
    config: &FileConfig,
    env: impl Fn(&str) -> Option<String>,
    timeout: Option<Duration>,
) -> RoutingGateway {
    let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    let max_tokens = config.llm.max_tokens;

    if let Some(key) = config.providers.api_key_for("openai", &env) {
        let openai = &config.providers.openai;
        providers.push(Arc::new(OpenAiProviderAdapter::new(
            key,
            &openai.base_url,
            max_tokens.unwrap_or(openai.max_tokens),
            timeout,
        )));
    } else {
        debug!("OpenAI provider not registered: no API key");
    }

    if let Some(key) = config.providers.api_key_for("anthropic", &env) {
        let anthropic = &config.providers.anthropic;
        providers.push(Arc::new(
            AnthropicProviderAdapter::new(
                key,
                &anthropic.base_url,
                max_tokens.unwrap_or(anthropic.max_tokens),
                timeout,
            )
            .with_api_version(&anthropic.api_version),
        ));
    } else {
        debug!("Anthropic provider not registered: no API key");
    }

    if providers.is_empty() {
        warn!("No LLM providers configured; reviews will fail until an API key is set");
    }

    RoutingGateway::new(
        providers,
        &config.providers.routing,
        &config.llm.provider_name(),
    )
}

pub(crate) fn http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_default()
}

/// Map a transport-level failure to a gateway error.
pub(crate) fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_connect() {
        GatewayError::ConnectionError(err.to_string())
    } else {
        GatewayError::RequestFailed(err.to_string())
    }
}

/// Map a non-success HTTP status and body to a gateway error.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| crew_domain::core::string::truncate(body.trim(), 300));

    match status.as_u16() {
        401 | 403 => GatewayError::Authentication(message),
        404 => GatewayError::ModelNotAvailable(message),
        408 | 504 => GatewayError::Timeout,
        code => GatewayError::RequestFailed(format!("HTTP {}: {}", code, message)),
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Local HTTP server standing in for a provider API.

    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral port and return its base URL.
    pub async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_provider_kind_from_name() {
        assert_eq!(ProviderKind::from_name(" OpenAI "), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_name("anthropic"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::from_name("bedrock"), None);
    }

    #[test]
    fn test_status_error_mapping() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, body),
            GatewayError::Authentication(m) if m == "Incorrect API key provided"
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "nope"),
            GatewayError::ModelNotAvailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            GatewayError::RequestFailed(m) if m == "HTTP 429: slow down"
        ));
    }

    #[test]
    fn test_gateway_registers_only_keyed_providers() {
        let config = FileConfig::default();
        let gateway = gateway_from_config(
            &config,
            |name| (name == "ANTHROPIC_API_KEY").then(|| "k".to_string()),
            None,
        );
        assert_eq!(gateway.provider_kinds(), vec![ProviderKind::Anthropic]);
    }
}
