//! Anthropic client

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;

use super::config::AnthropicConfig;
use super::models::registry;
use super::streaming::AnthropicEventConverter;
use super::transformers::{build_messages_request, parse_messages_response};
use super::types::MessagesResponse;
use crate::core::AdapterCore;
use crate::error::LlmError;
use crate::execution::http::HttpHeaderBuilder;
use crate::observability::Operation;
use crate::streaming::StreamFactory;
use crate::traits::{AiService, ChatOutput, Features};
use crate::types::{
    ChatOptions, ChatRequest, EmbedOptions, EmbedRequest, EmbedResponse, ModelConfig, ModelInfo,
    ModelInfoWithProvider, ProviderType, ServiceOptions,
};

const MESSAGES_PATH: &str = "/v1/messages";

#[derive(Debug)]
pub struct AnthropicClient {
    core: AdapterCore,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Fails with [`LlmError::ConfigurationError`] on an empty key or unknown model.
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        Self::with_options(config, ServiceOptions::default())
    }

    pub fn with_options(config: AnthropicConfig, options: ServiceOptions) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "Anthropic API key not set".to_string(),
            ));
        }
        let core = AdapterCore::new(ProviderType::Anthropic, registry(), &config.model, None, options)?;
        Ok(Self { core, config })
    }

    /// Build a client from `ANTHROPIC_API_KEY` with default settings.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(AnthropicConfig::from_env()?)
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        Ok(HttpHeaderBuilder::new()
            .with_custom_auth("x-api-key", self.config.api_key.expose_secret())?
            .with_json_content_type()
            .with_header("anthropic-version", &self.config.api_version)?
            .with_optional_header("anthropic-beta", self.config.beta.as_deref())?
            .build())
    }

    fn endpoint(&self) -> String {
        format!("{}{MESSAGES_PATH}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AiService for AnthropicClient {
    fn name(&self) -> &str {
        ProviderType::Anthropic.display_name()
    }

    fn model_info(&self) -> ModelInfoWithProvider {
        self.core.model_info()
    }

    fn embed_model_info(&self) -> Option<ModelInfo> {
        None
    }

    fn model_config(&self) -> ModelConfig {
        self.core.default_model_config(&self.config.model_config())
    }

    fn features(&self) -> Features {
        Features::new().with_functions().with_streaming()
    }

    async fn chat(
        &self,
        request: ChatRequest,
        options: ChatOptions,
    ) -> Result<ChatOutput, LlmError> {
        request.validate()?;
        let model = self.core.select_model(request.model_info.as_ref())?;
        let model_config = self.core.effective_config(
            model,
            &self.config.model_config(),
            request.model_config.as_ref(),
        );
        let stream = options.stream.or(model_config.stream).unwrap_or(false);
        let body = build_messages_request(&request, &model.name, &model_config, &self.config, stream)?;
        let headers = self.headers()?;
        let url = self.endpoint();

        let service_options = self.core.options();
        let span = self
            .core
            .span(Operation::Chat, model, options.trace_id.clone())
            .with_session_id(options.session_id.clone())
            .with_stream(stream);
        self.core
            .run(&service_options, span, async {
                if stream {
                    let bytes = self
                        .core
                        .post_stream(&service_options, &url, headers, &body)
                        .await?;
                    let converter = AnthropicEventConverter::new(options.session_id.clone());
                    Ok(ChatOutput::Stream(StreamFactory::from_sse(bytes, converter)))
                } else {
                    let raw: MessagesResponse = self
                        .core
                        .post_json(&service_options, &url, headers, &body)
                        .await?;
                    let mut response = parse_messages_response(raw);
                    response.session_id = options.session_id.clone();
                    Ok(ChatOutput::Response(response))
                }
            })
            .await
    }

    async fn embed(
        &self,
        _request: EmbedRequest,
        _options: EmbedOptions,
    ) -> Result<EmbedResponse, LlmError> {
        Err(LlmError::UnsupportedOperation(
            "Anthropic does not offer embeddings".to_string(),
        ))
    }

    fn set_options(&self, options: ServiceOptions) {
        self.core.set_options(options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::models::MODELS;

    #[test]
    fn empty_key_is_a_configuration_error() {
        assert!(matches!(
            AnthropicClient::new(AnthropicConfig::new("  ")),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn model_info_matches_every_catalog_entry_and_alias() {
        for info in MODELS.iter() {
            let client =
                AnthropicClient::new(AnthropicConfig::new("k").with_model(info.name.clone()))
                    .unwrap();
            assert_eq!(client.model_info().name, info.name);
            for alias in &info.aliases {
                let client =
                    AnthropicClient::new(AnthropicConfig::new("k").with_model(alias.clone()))
                        .unwrap();
                assert_eq!(client.model_info().name, info.name);
            }
        }
    }

    #[test]
    fn headers_carry_key_and_version() {
        let client = AnthropicClient::new(AnthropicConfig::new("sk-ant").with_beta("tools-2024"))
            .unwrap();
        let headers = client.headers().unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "sk-ant");
        assert_eq!(headers.get("anthropic-version").unwrap(), "2023-06-01");
        assert_eq!(headers.get("anthropic-beta").unwrap(), "tools-2024");
        assert!(headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn embed_is_unsupported() {
        let client = AnthropicClient::new(AnthropicConfig::new("k")).unwrap();
        assert!(client.embed_model_info().is_none());
        let err = client
            .embed(EmbedRequest::new(["x"]), EmbedOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedOperation(_)));
    }
}
