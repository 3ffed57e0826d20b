use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use crate::clients::openai::{CompletionClient, ModelParams, OpenAiClient};
use crate::config::Settings;
use crate::error::Result;
use crate::hooks::{build_prompt, fallback_hooks, parse_hooks, HookSource, PromptStyle};
use crate::models::{GenerationRequest, GenerationResult};

/// Prompt builder, completion client and parser wired together.
pub struct HookGenerator {
    client: Option<Arc<dyn CompletionClient>>,
    style: PromptStyle,
    model_override: Option<String>,
}

impl HookGenerator {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, style: PromptStyle) -> Self {
        Self { client, style, model_override: None }
    }

    /// A missing credential is not an error here: generation degrades to
    /// stock hooks without touching the network.
    pub fn from_settings(settings: &Settings) -> Self {
        let client: Option<Arc<dyn CompletionClient>> = match OpenAiClient::from_settings(settings) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                warn!(error = %e, "LLM client not configured, serving fallback hooks");
                None
            }
        };
        Self { client, style: settings.prompt_style, model_override: settings.openai_model.clone() }
    }

    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    fn model_params(&self) -> ModelParams {
        let mut params = self.style.model_params();
        if let Some(model) = &self.model_override {
            params.model = model.clone();
        }
        params
    }

    /// Validation errors propagate; upstream failures fall back to stock
    /// hooks and mark the result degraded.
    pub async fn generate<R: Rng + Send>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<GenerationResult> {
        let prompt = build_prompt(request, self.style)?;
        let max_count = self.style.hook_count();

        let raw = match &self.client {
            None => None,
            Some(client) => match client.complete(&prompt, &self.model_params()).await {
                Ok(text) => Some(text),
                Err(e) if e.is_recoverable_upstream() => {
                    warn!(method = %request.method, error = %e, "completion failed, using fallback hooks");
                    None
                }
                Err(e) => return Err(e),
            },
        };

        let (hooks, degraded) = match raw {
            Some(text) => {
                let parsed = parse_hooks(&text, max_count, &self.style.parse_rules(), || {
                    fallback_hooks(request, rng)
                });
                (parsed.hooks, parsed.source == HookSource::Fallback)
            }
            None => (fallback_hooks(request, rng).truncate(max_count), true),
        };

        info!(method = %request.method, hooks = hooks.len(), degraded, "hooks generated");
        Ok(GenerationResult {
            success: true,
            hooks,
            method: request.method,
            timestamp: Utc::now(),
            degraded,
            framework: self.style.framework(),
        })
    }
}
