//! Shared adapter machinery
//!
//! Every backend adapter holds an [`AdapterCore`] and delegates to it for model
//! selection, default config handling, hook plumbing (rate limiter, tracer) and
//! transport access. Backend-specific behavior stays in the adapter.

use std::future::Future;
use std::sync::{Arc, RwLock};

use futures::StreamExt;
use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::execution::http::{
    ByteStream, HttpTransport, HttpTransportRequest, ReqwestTransport, classify_status,
};
use crate::observability::{CallSpan, Operation, TraceEvent};
use crate::registry::ModelRegistry;
use crate::traits::ChatOutput;
use crate::types::{
    ChatResponse, EmbedResponse, ModelConfig, ModelInfo, ModelInfoWithProvider, ModelKind,
    ProviderType, ServiceOptions, TokenUsage,
};

static DEFAULT_TRANSPORT: Lazy<Arc<ReqwestTransport>> =
    Lazy::new(|| Arc::new(ReqwestTransport::new()));

/// Call results that can report token usage to a tracer.
pub trait Traced {
    fn usage(&self) -> Option<TokenUsage>;
}

impl Traced for ChatResponse {
    fn usage(&self) -> Option<TokenUsage> {
        self.model_usage
    }
}

impl Traced for EmbedResponse {
    fn usage(&self) -> Option<TokenUsage> {
        self.model_usage
    }
}

impl Traced for ChatOutput {
    fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::Response(r) => r.model_usage,
            Self::Stream(_) => None,
        }
    }
}

/// State shared by every call of one adapter.
///
/// The selected models are resolved once at construction and never change.
/// Options sit behind a lock so `set_options` can swap them while calls are
/// in flight; each call works on the snapshot it took at its start.
pub struct AdapterCore {
    provider: ProviderType,
    registry: ModelRegistry,
    model: &'static ModelInfo,
    embed_model: Option<&'static ModelInfo>,
    options: RwLock<Arc<ServiceOptions>>,
}

impl AdapterCore {
    /// Resolve the selected models against `registry`.
    ///
    /// Fails with [`LlmError::ConfigurationError`] when either id is unknown,
    /// or names a model of the wrong kind.
    pub fn new(
        provider: ProviderType,
        registry: ModelRegistry,
        model: &str,
        embed_model: Option<&str>,
        options: ServiceOptions,
    ) -> Result<Self, LlmError> {
        let model = registry.require_kind(provider.as_str(), model, ModelKind::Chat)?;
        let embed_model = embed_model
            .map(|id| registry.require_kind(provider.as_str(), id, ModelKind::Embedding))
            .transpose()?;
        Ok(Self {
            provider,
            registry,
            model,
            embed_model,
            options: RwLock::new(Arc::new(options)),
        })
    }

    /// Backend this core serves; used as the `provider` tag on spans and errors.
    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    /// The backend's static catalog.
    pub fn registry(&self) -> ModelRegistry {
        self.registry
    }

    /// Generation model selected at construction.
    pub fn model(&self) -> &'static ModelInfo {
        self.model
    }

    pub fn embed_model(&self) -> Option<&'static ModelInfo> {
        self.embed_model
    }

    pub fn model_info(&self) -> ModelInfoWithProvider {
        self.model.clone().with_provider(self.provider.as_str())
    }

    pub fn embed_model_info(&self) -> Option<ModelInfo> {
        self.embed_model.cloned()
    }

    /// Model for one call: the request's override if given, else the selected one.
    pub fn select_model(
        &self,
        requested: Option<&ModelInfoWithProvider>,
    ) -> Result<&'static ModelInfo, LlmError> {
        match requested {
            None => Ok(self.model),
            Some(info) => self.resolve_override(&info.name, ModelKind::Chat),
        }
    }

    /// Embedding model for one call, or `UnsupportedOperation` if the backend has none.
    pub fn select_embed_model(
        &self,
        requested: Option<&ModelInfoWithProvider>,
    ) -> Result<&'static ModelInfo, LlmError> {
        let default = self.embed_model.ok_or_else(|| {
            LlmError::UnsupportedOperation(format!("{} does not offer embeddings", self.provider))
        })?;
        match requested {
            None => Ok(default),
            Some(info) => self.resolve_override(&info.name, ModelKind::Embedding),
        }
    }

    fn resolve_override(&self, id: &str, kind: ModelKind) -> Result<&'static ModelInfo, LlmError> {
        let info = self.registry.resolve(id).ok_or_else(|| {
            LlmError::InvalidInput(format!(
                "{}: requested model '{id}' is not in the catalog",
                self.provider
            ))
        })?;
        if info.kind != kind {
            return Err(LlmError::InvalidInput(format!(
                "{}: requested model '{id}' is a {} model, expected {kind}",
                self.provider, info.kind
            )));
        }
        Ok(info)
    }

    /// Backend defaults with `max_tokens` capped at the selected model's context.
    pub fn default_model_config(&self, base: &ModelConfig) -> ModelConfig {
        base.clone().clamped_to_context(self.model.max_context_tokens)
    }

    /// Defaults (clamped to `model`) overlaid with caller values, which are not clamped.
    pub fn effective_config(
        &self,
        model: &ModelInfo,
        defaults: &ModelConfig,
        overrides: Option<&ModelConfig>,
    ) -> ModelConfig {
        let base = defaults.clone().clamped_to_context(model.max_context_tokens);
        match overrides {
            Some(o) => base.merge(o),
            None => base,
        }
    }

    /// Snapshot of the current options; later `set_options` calls do not affect it.
    pub fn options(&self) -> Arc<ServiceOptions> {
        match self.options.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_options(&self, options: ServiceOptions) {
        let mut guard = match self.options.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(options);
    }

    /// Start a trace span for one call against `model`.
    pub fn span(
        &self,
        operation: Operation,
        model: &ModelInfo,
        trace_id: Option<String>,
    ) -> CallSpan {
        CallSpan::new(self.provider.as_str(), operation, model.name.clone(), trace_id)
    }

    /// Run one call through the rate limiter and tracer hooks.
    pub async fn run<T, F>(
        &self,
        options: &ServiceOptions,
        span: CallSpan,
        call: F,
    ) -> Result<T, LlmError>
    where
        T: Traced,
        F: Future<Output = Result<T, LlmError>>,
    {
        if let Some(limiter) = &options.rate_limiter {
            limiter.acquire().await?;
        }
        let tracer = options.tracer.as_deref();
        if let Some(tracer) = tracer {
            tracer.record(&TraceEvent::CallStart { span: span.clone() });
        }
        let result = call.await;
        if let Some(tracer) = tracer {
            let elapsed_ms = span.elapsed_ms();
            let event = match &result {
                Ok(value) => TraceEvent::CallEnd {
                    span,
                    elapsed_ms,
                    usage: value.usage(),
                },
                Err(e) => TraceEvent::CallError {
                    span,
                    elapsed_ms,
                    error: e.to_string(),
                },
            };
            tracer.record(&event);
        }
        result
    }

    fn transport(options: &ServiceOptions) -> Arc<dyn HttpTransport> {
        match &options.transport {
            Some(t) => t.clone(),
            None => DEFAULT_TRANSPORT.clone() as Arc<dyn HttpTransport>,
        }
    }

    fn request<B: Serialize>(
        &self,
        options: &ServiceOptions,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<HttpTransportRequest, LlmError> {
        let body = serde_json::to_value(body)?;
        if options.debug {
            tracing::debug!(target: "unillm::debug", provider = %self.provider, url, body = %body, "request body");
        }
        Ok(HttpTransportRequest {
            provider: self.provider.as_str().to_string(),
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// POST a JSON body and decode the JSON response into `T`.
    ///
    /// A body that is not JSON is a transport failure; JSON of the wrong shape
    /// is a [`LlmError::ParseError`].
    pub async fn post_json<B, T>(
        &self,
        options: &ServiceOptions,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<T, LlmError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self.request(options, url, headers, body)?;
        let response = Self::transport(options).execute_json(request).await?;
        if options.debug {
            tracing::debug!(
                target: "unillm::debug",
                provider = %self.provider,
                url,
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "response body"
            );
        }
        classify_status(self.provider.as_str(), url, response.status, &response.body)?;
        let value: serde_json::Value = serde_json::from_slice(&response.body).map_err(|e| {
            LlmError::http(
                self.provider.as_str(),
                url,
                format!("response body is not JSON: {e}"),
            )
        })?;
        serde_json::from_value(value).map_err(|e| {
            LlmError::ParseError(format!("{} response from {url}: {e}", self.provider))
        })
    }

    /// POST a JSON body and return the raw SSE body of a 2xx response.
    pub async fn post_stream<B: Serialize>(
        &self,
        options: &ServiceOptions,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<ByteStream, LlmError> {
        let request = self.request(options, url, headers, body)?;
        let mut response = Self::transport(options).execute_stream(request).await?;
        if !(200..300).contains(&response.status) {
            let mut raw = Vec::new();
            while let Some(chunk) = response.body.next().await {
                raw.extend_from_slice(&chunk?);
            }
            classify_status(self.provider.as_str(), url, response.status, &raw)?;
        }
        Ok(response.body)
    }
}

impl std::fmt::Debug for AdapterCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterCore")
            .field("provider", &self.provider)
            .field("model", &self.model.name)
            .field("embed_model", &self.embed_model.map(|m| m.name.as_str()))
            .finish()
    }
}
