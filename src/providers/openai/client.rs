//! OpenAI client

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;

use super::config::OpenAiConfig;
use super::models::registry;
use super::streaming::OpenAiEventConverter;
use super::transformers::{
    build_chat_request, build_embed_request, parse_chat_response, parse_embed_response,
};
use super::types::{ChatCompletionResponse, EmbeddingResponse};
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

#[derive(Debug)]
pub struct OpenAiClient {
    core: AdapterCore,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Fails with [`LlmError::ConfigurationError`] on an empty key or unknown model.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        Self::with_options(config, ServiceOptions::default())
    }

    pub fn with_options(config: OpenAiConfig, options: ServiceOptions) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "OpenAI API key not set".to_string(),
            ));
        }
        let core = AdapterCore::new(
            ProviderType::OpenAi,
            registry(),
            &config.model,
            Some(&config.embed_model),
            options,
        )?;
        Ok(Self { core, config })
    }

    /// Build a client from `OPENAI_API_KEY` with default settings.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        Ok(HttpHeaderBuilder::new()
            .with_bearer_auth(self.config.api_key.expose_secret())?
            .with_json_content_type()
            .with_optional_header("OpenAI-Organization", self.config.organization.as_deref())?
            .build())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AiService for OpenAiClient {
    fn name(&self) -> &str {
        ProviderType::OpenAi.display_name()
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
        let choices = model_config.n.unwrap_or(1) as usize;
        let body = build_chat_request(&request, &model.name, &model_config, &self.config, stream)?;
        let headers = self.headers()?;
        let url = self.endpoint("chat/completions");

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
                    let converter = OpenAiEventConverter::new(options.session_id.clone())
                        .with_choices(choices);
                    Ok(ChatOutput::Stream(StreamFactory::from_sse(bytes, converter)))
                } else {
                    let raw: ChatCompletionResponse = self
                        .core
                        .post_json(&service_options, &url, headers, &body)
                        .await?;
                    let mut response = parse_chat_response(raw)?;
                    response.session_id = options.session_id.clone();
                    Ok(ChatOutput::Response(response))
                }
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
        let url = self.endpoint("embeddings");
        let expected = request.texts.len();

        let service_options = self.core.options();
        let span = self
            .core
            .span(Operation::Embed, model, options.trace_id.clone())
            .with_session_id(options.session_id.clone());
        self.core
            .run(&service_options, span, async {
                let raw: EmbeddingResponse = self
                    .core
                    .post_json(&service_options, &url, headers, &body)
                    .await?;
                let mut response = parse_embed_response(raw, expected)?;
                response.session_id = options.session_id.clone();
                Ok(response)
            })
            .await
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
            OpenAiClient::new(OpenAiConfig::new("")),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn unknown_model_is_a_configuration_error() {
        assert!(matches!(
            OpenAiClient::new(OpenAiConfig::new("k").with_model("gpt-0")),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        for info in MODELS.iter().filter(|m| !m.is_embedding()) {
            for alias in &info.aliases {
                let client =
                    OpenAiClient::new(OpenAiConfig::new("k").with_model(alias.clone())).unwrap();
                assert_eq!(client.model_info().name, info.name);
            }
        }
    }

    #[test]
    fn headers_include_organization_when_set() {
        let client =
            OpenAiClient::new(OpenAiConfig::new("sk-1").with_organization("org-9")).unwrap();
        let headers = client.headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer sk-1");
        assert_eq!(headers.get("openai-organization").unwrap(), "org-9");

        let plain = OpenAiClient::new(OpenAiConfig::new("sk-1")).unwrap();
        assert!(plain.headers().unwrap().get("openai-organization").is_none());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = OpenAiClient::new(
            OpenAiConfig::new("k").with_base_url("http://localhost:8080/v1/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("embeddings"),
            "http://localhost:8080/v1/embeddings"
        );
    }

    #[test]
    fn features_and_embed_model() {
        let client = OpenAiClient::new(OpenAiConfig::new("k")).unwrap();
        assert!(client.features().supports("functions"));
        assert!(client.features().supports("streaming"));
        assert_eq!(client.embed_model_info().unwrap().name, "text-embedding-3-small");
    }
}
