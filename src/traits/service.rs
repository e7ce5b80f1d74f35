//! The service contract every backend adapter implements

use async_trait::async_trait;

use super::capabilities::Features;
use crate::error::LlmError;
use crate::streaming::{ChatStream, collect_stream};
use crate::types::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, EmbedOptions, EmbedRequest,
    EmbedResponse, ModelConfig, ModelInfo, ModelInfoWithProvider, ServiceOptions,
};

/// Result of a chat call: one response, or a lazy sequence of partial responses.
pub enum ChatOutput {
    Response(ChatResponse),
    Stream(ChatStream),
}

impl ChatOutput {
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// The single response; fails when the call was streamed.
    pub fn into_response(self) -> Result<ChatResponse, LlmError> {
        match self {
            Self::Response(r) => Ok(r),
            Self::Stream(_) => Err(LlmError::UnsupportedOperation(
                "chat returned a stream; use into_stream or collect".to_string(),
            )),
        }
    }

    /// The stream; fails when the call was not streamed.
    pub fn into_stream(self) -> Result<ChatStream, LlmError> {
        match self {
            Self::Stream(s) => Ok(s),
            Self::Response(_) => Err(LlmError::UnsupportedOperation(
                "chat returned a single response; use into_response".to_string(),
            )),
        }
    }

    /// Fold either variant into one response.
    pub async fn collect(self) -> Result<ChatResponse, LlmError> {
        match self {
            Self::Response(r) => Ok(r),
            Self::Stream(s) => collect_stream(s).await,
        }
    }
}

impl std::fmt::Debug for ChatOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response(r) => f.debug_tuple("Response").field(r).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[async_trait]
pub trait AiService: Send + Sync {
    /// Stable backend identifier.
    fn name(&self) -> &str;

    /// The selected generation model, tagged with the provider.
    fn model_info(&self) -> ModelInfoWithProvider;

    /// The selected embedding model; `None` when the backend cannot embed.
    fn embed_model_info(&self) -> Option<ModelInfo>;

    /// Effective default tunables for the selected model.
    fn model_config(&self) -> ModelConfig;

    fn features(&self) -> Features;

    async fn chat(
        &self,
        request: ChatRequest,
        options: ChatOptions,
    ) -> Result<ChatOutput, LlmError>;

    async fn embed(
        &self,
        request: EmbedRequest,
        options: EmbedOptions,
    ) -> Result<EmbedResponse, LlmError>;

    /// Replace the options bundle. Calls already in flight keep their snapshot.
    fn set_options(&self, options: ServiceOptions);
}

#[async_trait]
pub trait AiServiceExt: AiService {
    /// Chat and always hand back a single response, folding a stream if needed.
    async fn chat_collect(
        &self,
        request: ChatRequest,
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        self.chat(request, options).await?.collect().await
    }

    /// One user turn in, text out.
    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let response = self
            .chat(
                request,
                ChatOptions {
                    stream: Some(false),
                    ..Default::default()
                },
            )
            .await?
            .collect()
            .await?;
        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| LlmError::ParseError("No text in response".to_string()))
    }
}

impl<T: AiService + ?Sized> AiServiceExt for T {}
