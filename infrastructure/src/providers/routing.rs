use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use crew_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use crew_domain::Model;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    /// Model name to provider index, from `[providers.routing]`
    explicit_model_routing: HashMap<String, usize>,
    default_kind: ProviderKind,
}

impl RoutingGateway {
    pub fn new(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        routing: &HashMap<String, String>,
        default_provider: &str,
    ) -> Self {
        let mut explicit_model_routing = HashMap::new();

        for (model_name, provider_name) in routing {
            let Some(target_kind) = ProviderKind::from_name(provider_name) else {
                warn!(
                    "Ignoring route {} -> {}: unknown provider",
                    model_name, provider_name
                );
                continue;
            };

            if let Some(idx) = providers.iter().position(|p| p.kind() == target_kind) {
                explicit_model_routing.insert(model_name.clone(), idx);
            }
        }

        Self {
            providers,
            explicit_model_routing,
            default_kind: ProviderKind::from_name(default_provider).unwrap_or_default(),
        }
    }

    /// Kinds of the registered providers, in registration order
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Pick the provider for a model.
    ///
    /// Priority:
    ///  1. explicit `[providers.routing]` entry for the model name
    ///  2. the first provider whose family supports the model (claude / gpt)
    ///  3. the configured default provider
    ///  4. the first registered provider
    ///
    /// With no providers at all this is `GatewayError::ModelNotAvailable`.
    fn resolve_provider(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        if let Some(&idx) = self.explicit_model_routing.get(model.as_str()) {
            return Ok(self.providers[idx].as_ref());
        }

        if let Some(p) = self.providers.iter().find(|p| p.supports_model(model)) {
            return Ok(p.as_ref());
        }

        if let Some(p) = self
            .providers
            .iter()
            .find(|p| p.kind() == self.default_kind)
        {
            return Ok(p.as_ref());
        }

        self.providers
            .first()
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                GatewayError::ModelNotAvailable(format!(
                    "no provider configured for {} (set OPENAI_API_KEY or ANTHROPIC_API_KEY)",
                    model
                ))
            })
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.resolve_provider(model)?
            .create_session_with_system_prompt(model, system_prompt)
            .await
    }
}
