//! Hekim - Doctor assistant chatbot library
//!
//! This library provides the building blocks for the Hekim doctor assistant:
//! per-user session storage, prompt assembly, the Gemini completion client,
//! and the three presentation adapters (terminal, HTTP API, web UI).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `assistant`: Turn pipeline tying store, prompts, and provider together
//! - `session`: Per-user append-only conversation history
//! - `prompts`: Intro instruction and fixed greeting/farewell lines
//! - `providers`: Completion backend abstraction and Gemini implementation
//! - `server`: axum HTTP adapter and web UI route
//! - `commands`: Terminal adapters (local chat, remote client) and serve
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use hekim::assistant::DoctorAssistant;
//! use hekim::config::Config;
//! use hekim::providers::create_provider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let provider = create_provider("gemini", &config.provider)?;
//!     let assistant = DoctorAssistant::new(provider);
//!
//!     let reply = assistant.send_turn("Ahmet", 25, "Başım ağrıyor").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use assistant::DoctorAssistant;
pub use config::Config;
pub use error::{HekimError, Result};
pub use providers::{Message, Provider};
pub use session::SessionStore;
