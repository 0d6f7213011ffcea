use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ollama::{ServerEndpoint, DEFAULT_HOST, DEFAULT_MODEL};
use crate::prompt::MetaPrompt;

const APP_DIR: &str = "metaprompt-forge";
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct OllamaConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Absent means requests wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        OllamaConfig {
            host: default_host(),
            model: default_model(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1000,
            height: 600,
            min_width: 600,
            min_height: 400,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PromptConfig {
    /// File replacing the built-in meta-prompt. Must contain `{query}` once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<PathBuf>,
}

impl Config {
    /// Read the config file, falling back to defaults, then apply
    /// `OLLAMA_HOST` / `OLLAMA_MODEL` from the environment.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::get_config_path());
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Config::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %config_path.display(), "loaded config");
                    return config;
                }
                Err(e) => tracing::warn!(path = %config_path.display(), "error parsing config: {e}. Using defaults."),
            },
            Err(e) => tracing::warn!(path = %config_path.display(), "error reading config: {e}. Using defaults."),
        }

        Config::default()
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.trim().is_empty()) {
            self.ollama.host = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|v| !v.trim().is_empty()) {
            self.ollama.model = model;
        }
    }

    pub fn endpoint(&self) -> ServerEndpoint {
        ServerEndpoint::new(self.ollama.host.clone(), self.ollama.model.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.ollama.timeout_secs.map(Duration::from_secs)
    }

    /// The configured template, or the built-in one when none is set or the
    /// file is unusable.
    pub fn meta_prompt(&self) -> MetaPrompt {
        let Some(path) = &self.prompt.template_path else {
            return MetaPrompt::default();
        };

        match fs::read_to_string(path) {
            Ok(contents) => match MetaPrompt::parse(&contents) {
                Ok(template) => {
                    tracing::info!(path = %path.display(), "using custom meta-prompt");
                    template
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "invalid template: {e}. Using built-in.");
                    MetaPrompt::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "error reading template: {e}. Using built-in.");
                MetaPrompt::default()
            }
        }
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join(CONFIG_FILE_NAME)
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config").join(APP_DIR)
        } else {
            PathBuf::from(".")
        }
    }
}
