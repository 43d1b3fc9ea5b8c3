//! Task dispatcher: validates a request, routes it to the selected provider
//! and model, and renders the outcome as user-facing text.
//!
//! This is the only boundary that converts internal faults into strings; no
//! error crosses [`TaskDispatcher::execute`] unformatted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::image;
use crate::llm::{
    ChatRequest, CompletionClient, ContentPart, ImageUrl, LlmError, Message, MessageContent,
    OpenAiCompatibleClient,
};
use crate::prompts::{self, TASK_VQA};
use crate::registry::ProviderRegistry;

/// Sampling temperature for every completion request.
const TEMPERATURE: f32 = 0.7;

/// Placeholder shown when the endpoint returns no usable content.
const EMPTY_RESPONSE: &str = "(respuesta vacía)";

/// Default bound on the outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration failures while acquiring a connection handle.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Proveedor desconocido: {0}")]
    UnknownProvider(String),

    #[error("Falta API key para el proveedor: {0}")]
    MissingApiKey(String),

    #[error("Falta base_url para el proveedor: {0}")]
    MissingBaseUrl(String),
}

/// One dispatch request, as collected by the front end.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub provider: String,
    pub model: String,
    pub task: String,
    pub input_text: String,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub image_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for TaskRequest {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: String::new(),
            task: String::new(),
            input_text: String::new(),
            source_lang: None,
            target_lang: None,
            image_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds connection handles for a provider endpoint.
pub trait ClientFactory: Send + Sync {
    fn build(&self, base_url: &str, api_key: &str) -> Arc<dyn CompletionClient>;
}

/// Default factory producing [`OpenAiCompatibleClient`] handles.
struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, base_url: &str, api_key: &str) -> Arc<dyn CompletionClient> {
        Arc::new(OpenAiCompatibleClient::new(base_url, api_key))
    }
}

/// The single cached handle, tagged with the provider it was built for.
#[derive(Clone)]
struct CachedClient {
    provider: String,
    client: Arc<dyn CompletionClient>,
}

/// Routes chat tasks to provider endpoints and formats every outcome.
pub struct TaskDispatcher {
    registry: ProviderRegistry,
    factory: Box<dyn ClientFactory>,
    cache: RwLock<Option<CachedClient>>,
}

impl TaskDispatcher {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::with_factory(registry, Box::new(HttpClientFactory))
    }

    pub fn with_factory(registry: ProviderRegistry, factory: Box<dyn ClientFactory>) -> Self {
        Self {
            registry,
            factory,
            cache: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run one task end to end and render the result or failure as text.
    pub async fn execute(&self, request: &TaskRequest) -> String {
        if request.task.is_empty() {
            return "Error: no se especificó la tarea.".to_string();
        }
        if request.input_text.trim().is_empty() {
            return "Por favor, ingresa un texto para procesar.".to_string();
        }

        let available = self.registry.get_available_models(&request.provider);
        if !available.iter().any(|model| model == &request.model) {
            let listing = if available.is_empty() {
                "ninguno".to_string()
            } else {
                available.join(", ")
            };
            return format!(
                "Error: el modelo '{}' no está disponible para el proveedor {}. \
                 Modelos disponibles: {}.",
                request.model, request.provider, listing
            );
        }

        let client = match self.client_for(&request.provider).await {
            Ok(client) => client,
            Err(e) => return format!("Error: {e}"),
        };

        let mut messages = match prompts::resolve(
            &request.task,
            &request.input_text,
            request.source_lang.as_deref(),
            request.target_lang.as_deref(),
        ) {
            Ok(messages) => messages,
            Err(e) => return format!("Error: {e}"),
        };

        if request.task == TASK_VQA
            && let Some(path) = &request.image_path
        {
            attach_image(&mut messages, path).await;
        }

        let chat_request = ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
            max_tokens: None,
        };

        let start = Instant::now();
        let result = client.chat(chat_request, Some(request.timeout)).await;
        let elapsed_ms = start.elapsed().as_millis();

        match result {
            Ok(response) => {
                debug!(elapsed_ms, provider = %request.provider, model = %request.model,
                    "Completion finished");
                let content = response
                    .choices
                    .first()
                    .map(|choice| choice.message.content.text())
                    .unwrap_or_default();
                let content = if content.is_empty() {
                    EMPTY_RESPONSE.to_string()
                } else {
                    content
                };
                format!("{content}\n\n⏱️ Tiempo de inferencia: {elapsed_ms} ms")
            }
            Err(e) => classify_error(&e),
        }
    }

    /// UI-facing entry point.
    ///
    /// `history` is accepted for interface parity with chat front ends but
    /// not consumed; each call is stateless.
    #[allow(clippy::too_many_arguments)]
    pub async fn chat_reply(
        &self,
        message: &str,
        _history: &[Message],
        provider: &str,
        model: &str,
        task: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
        image_path: Option<&Path>,
    ) -> String {
        let request = TaskRequest {
            provider: provider.to_string(),
            model: model.to_string(),
            task: task.to_string(),
            input_text: message.to_string(),
            source_lang: source_lang.map(str::to_string),
            target_lang: target_lang.map(str::to_string),
            image_path: image_path.map(Path::to_path_buf),
            timeout: DEFAULT_TIMEOUT,
        };
        self.execute(&request).await
    }

    /// Fetch the cached handle for `provider`, rebuilding when the tag differs.
    ///
    /// Concurrent calls for different providers may race on the slot; last
    /// write wins, and each caller keeps the handle it fetched.
    async fn client_for(
        &self,
        provider: &str,
    ) -> Result<Arc<dyn CompletionClient>, DispatchError> {
        if let Some(cached) = self.cache.read().await.as_ref()
            && cached.provider == provider
        {
            return Ok(cached.client.clone());
        }

        let settings = self
            .registry
            .get_provider_config(provider)
            .ok_or_else(|| DispatchError::UnknownProvider(provider.to_string()))?;
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DispatchError::MissingApiKey(provider.to_string()))?;
        let base_url = settings
            .base_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| DispatchError::MissingBaseUrl(provider.to_string()))?;

        let client = self.factory.build(&base_url, &api_key);
        info!(provider, "Built completion client");
        *self.cache.write().await = Some(CachedClient {
            provider: provider.to_string(),
            client: client.clone(),
        });
        Ok(client)
    }
}

/// Append the encoded image to the last message, converting plain text
/// content into a part sequence first. Encoding failures degrade to a
/// text-only request.
async fn attach_image(messages: &mut [Message], path: &Path) {
    let data_url = match image::encode_as_data_url(path).await {
        Ok(url) => url,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Image encoding failed; sending text only");
            return;
        }
    };

    if let Some(last) = messages.last_mut() {
        let mut parts = match std::mem::take(&mut last.content) {
            MessageContent::Text(text) => vec![ContentPart::Text { text }],
            MessageContent::Parts(parts) => parts,
        };
        parts.push(ContentPart::InputImage {
            image_url: ImageUrl { url: data_url },
        });
        last.content = MessageContent::Parts(parts);
    }
}

/// Map a completion failure to its fixed user-facing rendering.
///
/// Beyond the timeout case this matches on the upstream message text, which
/// is as much structure as OpenAI-compatible endpoints reliably expose.
fn classify_error(error: &LlmError) -> String {
    if matches!(error, LlmError::Timeout) {
        return "Error: la solicitud excedió el tiempo máximo de espera.".to_string();
    }
    let message = error.to_string();
    if message.contains("model_not_found") || message.contains("does not exist") {
        return "Error: el modelo solicitado no está disponible ahora mismo.".to_string();
    }
    if message.to_lowercase().contains("rate limit") {
        return "Error: límite de peticiones alcanzado. Intenta de nuevo en unos segundos."
            .to_string();
    }
    format!("Error al procesar la solicitud: {message}")
}
