//! Turns a free-text question into a structured research prompt by wrapping it
//! in a fixed meta-prompt and asking a local Ollama server to fill it in.
//!
//! The core calls are plain blocking functions; callers with an interactive
//! surface run them on a worker thread.

pub mod config;
pub mod error;
pub mod models;
pub mod ollama;
pub mod prompt;
pub mod transport;

pub use error::{ForgeError, Result};
pub use models::ModelDirectory;
pub use ollama::{generate, list_models, OllamaClient, ServerEndpoint};
pub use prompt::{MetaPrompt, PromptRequest};
pub use transport::{HttpResponse, HttpTransport, Transport};
