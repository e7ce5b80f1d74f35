//! Aleph Alpha client

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;

use super::config::AlephAlphaConfig;
use super::models::registry;
use super::transformers::{
    build_complete_request, build_embed_request, parse_complete_response, parse_embed_response,
};
use super::types::{CompleteResponse, SemanticEmbedResponse};
use crate::core::AdapterCore;
use crate::error::LlmError;
use crate::execution::http::HttpHeaderBuilder;
use crate::observability::Operation;
use crate::traits::{AiService, ChatOutput, Features};
use crate::types::{
    ChatOptions, ChatRequest, EmbedOptions, EmbedRequest, EmbedResponse, ModelConfig, ModelInfo,
    ModelInfoWithProvider, ProviderType, ServiceOptions,
};

#[derive(Debug)]
pub struct AlephAlphaClient {
    core: AdapterCore,
    config: AlephAlphaConfig,
}

impl AlephAlphaClient {
    /// Fails with [`LlmError::ConfigurationError`] on an empty key or unknown model.
    pub fn new(config: AlephAlphaConfig) -> Result<Self, LlmError> {
        Self::with_options(config, ServiceOptions::default())
    }

    pub fn with_options(
        config: AlephAlphaConfig,
        options: ServiceOptions,
    ) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "AlephAlpha API key not set".to_string(),
            ));
        }
        let core = AdapterCore::new(
            ProviderType::AlephAlpha,
            registry(),
            &config.model,
            Some(&config.embed_model),
            options,
        )?;
        Ok(Self { core, config })
    }

    /// Build a client from `ALEPH_ALPHA_API_KEY` with default settings.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(AlephAlphaConfig::from_env()?)
    }

    pub fn config(&self) -> &AlephAlphaConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        Ok(HttpHeaderBuilder::new()
            .with_bearer_auth(self.config.api_key.expose_secret())?
            .with_json_content_type()
            .build())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AiService for AlephAlphaClient {
    fn name(&self) -> &str {
        ProviderType::AlephAlpha.display_name()
    }

    fn model_info(&self) -> ModelInfoWithProvider {
        self.core.model_info()
    }

    fn embed_model_info(&self) -> Option<ModelInfo> {
        self.core.embed_model_info()
    }

    fn model_config(&self) -> ModelConfig {
        self.core.default_model_config(&self.config.model_config())
    }

    fn features(&self) -> Features {
        Features::new()
    }

    async fn chat(
        &self,
        request: ChatRequest,
        options: ChatOptions,
    ) -> Result<ChatOutput, LlmError> {
        request.validate()?;
        let model = self.core.select_model(request.model_info.as_ref())?;
        let mut model_config = self.core.effective_config(
            model,
            &self.config.model_config(),
            request.model_config.as_ref(),
        );
        if let Some(stream) = options.stream {
            model_config.stream = Some(stream);
        }
        let body = build_complete_request(&request, &model.name, &model_config, &self.config)?;
        let headers = self.headers()?;
        let url = self.endpoint("complete");

        let service_options = self.core.options();
        let span = self
            .core
            .span(Operation::Chat, model, options.trace_id.clone())
            .with_session_id(options.session_id.clone());
        self.core
            .run(&service_options, span, async {
                let raw: CompleteResponse = self
                    .core
                    .post_json(&service_options, &url, headers, &body)
                    .await?;
                let mut response = parse_complete_response(raw)?;
                response.session_id = options.session_id.clone();
                Ok(ChatOutput::Response(response))
            })
            .await
    }

    async fn embed(
        &self,
        request: EmbedRequest,
        options: EmbedOptions,
    ) -> Result<EmbedResponse, LlmError> {
        let model = self
            .core
            .select_embed_model(request.embed_model_info.as_ref())?;
        let body = build_embed_request(&request, &model.name, &self.config)?;
        let headers = self.headers()?;
        let url = self.endpoint("semantic_embed");

        let service_options = self.core.options();
        let span = self
            .core
            .span(Operation::Embed, model, options.trace_id.clone())
            .with_session_id(options.session_id.clone());
        self.core
            .run(&service_options, span, async {
                let raw: SemanticEmbedResponse = self
                    .core
                    .post_json(&service_options, &url, headers, &body)
                    .await?;
                let mut response = parse_embed_response(raw);
                response.session_id = options.session_id.clone();
                Ok(response)
            })
            .await
    }

    fn set_options(&self, options: ServiceOptions) {
        self.core.set_options(options);
    }
}
