use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::prompt::{MetaPrompt, PromptRequest};
use crate::transport::{HttpResponse, HttpTransport, Transport};

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gemma2:9b";

const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";

/// Where to send a request and which model should answer it.
///
/// Passed explicitly into every call; nothing reads it from shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub address: String,
    pub selected_model: String,
}

impl ServerEndpoint {
    pub fn new(address: impl Into<String>, selected_model: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            selected_model: selected_model.into(),
        }
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_MODEL)
    }
}

fn join_url(address: &str, path: &str) -> String {
    format!("{}{}", address.trim().trim_end_matches('/'), path)
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

fn decode<T: for<'de> Deserialize<'de>>(response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| ForgeError::bad_response(e.to_string()))
}

/// Blocking client for the two Ollama endpoints this tool uses.
///
/// Holds no mutable state, so independent calls may run concurrently from
/// any number of threads.
pub struct OllamaClient<T: Transport = HttpTransport> {
    transport: T,
    template: MetaPrompt,
}

impl OllamaClient<HttpTransport> {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(timeout)?))
    }
}

impl<T: Transport> OllamaClient<T> {
    pub fn with_transport(transport: T) -> Self {
        OllamaClient {
            transport,
            template: MetaPrompt::default(),
        }
    }

    pub fn with_template(mut self, template: MetaPrompt) -> Self {
        self.template = template;
        self
    }

    /// Model names in the order the server lists them.
    pub fn list_models(&self, endpoint_address: &str) -> Result<Vec<String>> {
        if endpoint_address.trim().is_empty() {
            return Err(ForgeError::unreachable("server address is empty"));
        }

        let url = join_url(endpoint_address, TAGS_PATH);
        tracing::debug!(%url, "fetching model list");

        let response = self.transport.get(&url).inspect_err(|e| {
            tracing::warn!(%url, error = %e, "model list request failed");
        })?;

        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "model list returned error status");
            return Err(response.into());
        }

        let tags: OllamaTagsResponse = decode(&response)?;
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        tracing::info!(count = names.len(), "model list received");
        Ok(names)
    }

    /// Wrap `user_query` in the meta-prompt and return the model's answer.
    pub fn generate(&self, endpoint: &ServerEndpoint, user_query: &str) -> Result<String> {
        if user_query.trim().is_empty() {
            return Err(ForgeError::EmptyQuery);
        }
        if endpoint.address.trim().is_empty() {
            return Err(ForgeError::unreachable("server address is empty"));
        }
        if endpoint.selected_model.trim().is_empty() {
            return Err(ForgeError::unreachable("no model selected"));
        }

        let prompt = PromptRequest::new(&self.template, user_query).render();
        let request = OllamaGenerateRequest {
            model: &endpoint.selected_model,
            prompt: &prompt,
            stream: false,
        };
        let body = serde_json::to_value(&request).map_err(|e| ForgeError::bad_response(e.to_string()))?;

        let url = join_url(&endpoint.address, GENERATE_PATH);
        tracing::debug!(
            %url,
            model = %endpoint.selected_model,
            query_len = user_query.len(),
            prompt_len = prompt.len(),
            "sending generate request"
        );

        let response = self.transport.post_json(&url, &body).inspect_err(|e| {
            tracing::warn!(%url, error = %e, "generate request failed");
        })?;

        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "generate returned error status");
            return Err(response.into());
        }

        let generated: OllamaGenerateResponse = decode(&response)?;
        tracing::info!(response_len = generated.response.len(), "generation finished");
        Ok(generated.response)
    }
}

/// One-off model listing with a default transport and no timeout.
pub fn list_models(endpoint_address: &str) -> Result<Vec<String>> {
    OllamaClient::new(None)?.list_models(endpoint_address)
}

/// One-off generation with a default transport, the built-in template and no timeout.
pub fn generate(endpoint_address: &str, model_id: &str, user_query: &str) -> Result<String> {
    let endpoint = ServerEndpoint::new(endpoint_address, model_id);
    OllamaClient::new(None)?.generate(&endpoint, user_query)
}
