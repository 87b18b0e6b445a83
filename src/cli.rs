//! Command-line interface definition for Hekim
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the terminal chat, the HTTP server, and the
//! remote terminal client.

use clap::{Parser, Subcommand};

/// Hekim - Doctor assistant chatbot
///
/// Chat with a doctor assistant persona backed by a hosted language model,
/// either directly in the terminal or through an HTTP server with a web UI.
#[derive(Parser, Debug, Clone)]
#[command(name = "hekim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Hekim
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session in the terminal
    Chat {
        /// Override the provider from config (gemini)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Serve the chat API and web UI over HTTP
    Serve {
        /// Address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat in the terminal against a running Hekim server
    Client {
        /// Chat endpoint URL (overrides config)
        #[arg(short, long)]
        url: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
