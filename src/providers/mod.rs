//! Provider module for Hekim
//!
//! This module contains the completion backend abstraction and the Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{CompletionResponse, Message, Provider, TokenUsage};
pub use gemini::GeminiProvider;

use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("gemini")
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if the provider type is invalid, credentials are missing,
/// or initialization fails
pub fn create_provider(
    provider_type: &str,
    config: &crate::config::ProviderConfig,
) -> Result<Box<dyn Provider>> {
    match provider_type {
        "gemini" => Ok(Box::new(gemini::GeminiProvider::new(
            config.gemini.clone(),
        )?)),
        _ => Err(crate::error::HekimError::Provider(format!(
            "Unknown provider type: {}",
            provider_type
        ))
        .into()),
    }
}
