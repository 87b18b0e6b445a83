//! Configuration management for Hekim
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::cli::Cli;
use crate::error::{HekimError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable supplying the Gemini API credential
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Main configuration structure for Hekim
///
/// This structure holds all configuration needed for the assistant,
/// including provider settings, server binding, and chat behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat adapter configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for completions
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the `generateContent` endpoint,
    /// which allows tests to point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Sampling temperature, 0.0-1.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: None,
            temperature: default_temperature(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Chat adapter configuration
///
/// Settings shared by the terminal adapters: the chat endpoint used by the
/// remote client and the request timeout for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Chat endpoint used by the `client` command
    #[serde(default = "default_client_url")]
    pub client_url: String,

    /// Request timeout for the remote client (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_client_url() -> String {
    "http://127.0.0.1:8000/chat".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            client_url: default_client_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file with CLI overrides
    ///
    /// If the file does not exist, defaults are used so that the binary works
    /// out of the box with only the API key in the environment.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path).map_err(HekimError::Io)?;
            serde_yaml::from_str(&contents).map_err(HekimError::Yaml)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Self::default()
        };

        config.apply_cli_overrides(cli);
        Ok(config)
    }

    /// Apply CLI argument overrides to the loaded configuration
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        use crate::cli::Commands;

        match &cli.command {
            Commands::Chat { provider } => {
                if let Some(p) = provider {
                    self.provider.provider_type = p.clone();
                }
            }
            Commands::Serve { host, port } => {
                if let Some(h) = host {
                    self.server.host = h.clone();
                }
                if let Some(p) = port {
                    self.server.port = *p;
                }
            }
            Commands::Client { url } => {
                if let Some(u) = url {
                    self.chat.client_url = u.clone();
                }
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider type is unknown or the temperature
    /// is out of range
    pub fn validate(&self) -> Result<()> {
        match self.provider.provider_type.as_str() {
            "gemini" => {}
            other => {
                return Err(
                    HekimError::Config(format!("Unknown provider type: {}", other)).into(),
                )
            }
        }

        let temperature = self.provider.gemini.temperature;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(HekimError::Config(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                temperature
            ))
            .into());
        }

        if self.chat.request_timeout_seconds == 0 {
            return Err(
                HekimError::Config("Request timeout must be greater than zero".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Read the Gemini API key from the environment
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if the variable is unset or empty
    pub fn gemini_api_key() -> Result<String> {
        match std::env::var(GEMINI_API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(HekimError::MissingCredentials("gemini".to_string()).into()),
        }
    }
}
