/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`   — Interactive terminal session against the provider
- `serve`  — HTTP chat API plus web UI
- `client` — Interactive terminal session against a running server

The terminal adapters share the exit-word check and the transcript
rendering defined here.
*/

use crate::assistant::DoctorAssistant;
use crate::error::Result;
use crate::providers::Message;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Exit tokens accepted by the terminal adapters, across two
/// languages/spellings
pub const EXIT_WORDS: [&str; 5] = ["exit", "quit", "çık", "cik", "kapat"];

/// Check whether an input line is an exit request
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Examples
///
/// ```
/// use hekim::commands::is_exit_word;
///
/// assert!(is_exit_word("QUIT"));
/// assert!(is_exit_word(" çık "));
/// assert!(!is_exit_word("exit now"));
/// ```
pub fn is_exit_word(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    EXIT_WORDS.contains(&normalized.as_str())
}

/// Print the numbered conversation transcript, oldest first
///
/// Mirrors the memory dump the assistant shows after every turn:
/// `01. USER: ...` / `02. ASSISTANT: ...`.
fn print_transcript(messages: &[Message]) {
    println!("\n{}", "Hafıza:".bold());
    for (index, message) in messages.iter().enumerate() {
        let line = format!(
            "{:02}. {}: {}",
            index + 1,
            message.role.to_uppercase(),
            message.content
        );
        println!("{}", line.dimmed());
    }
    println!("{}", "-".repeat(62).dimmed());
}

/// Read the patient's name and age from the terminal
///
/// Re-prompts until the age parses as a number.
fn read_patient_info(rl: &mut DefaultEditor) -> Result<(String, u32)> {
    let name = rl.readline("Adınız: ")?.trim().to_string();

    let age = loop {
        let line = rl.readline("Yaşınız: ")?;
        match line.trim().parse::<u32>() {
            Ok(age) => break age,
            Err(_) => println!("Lütfen geçerli bir yaş giriniz."),
        }
    };

    Ok((name, age))
}

// Terminal chat adapter
pub mod chat {
    //! Interactive terminal session handler.
    //!
    //! Instantiates the provider and the assistant, then runs a
    //! readline-based loop that submits each line as one turn. Exit words
    //! end the session; each reply is followed by the memory transcript.

    use super::*;
    use crate::config::Config;
    use crate::prompts::FAREWELL;
    use crate::providers::create_provider;

    /// Start an interactive terminal session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `provider_name` - Optional override for the configured provider
    pub async fn run_chat(config: Config, provider_name: Option<String>) -> Result<()> {
        let provider_type = provider_name
            .as_deref()
            .unwrap_or(&config.provider.provider_type);

        let provider = create_provider(provider_type, &config.provider)?;
        let assistant = DoctorAssistant::new(provider);

        let mut rl = DefaultEditor::new()?;

        println!(
            "Merhaba, ben bir doktor asistanıyım. Size daha iyi hitap edebilmem \
             için adınızı ve yaşınızı öğrenebilir miyim?"
        );
        let (name, age) = read_patient_info(&mut rl)?;

        let welcome = assistant.start_session(&name, age);
        println!("{}", welcome.green());
        println!("(Sohbet başladı, çıkmak için exit / quit / çık / kapat yazabilirsiniz.)");

        let prompt = format!("{}: ", name);
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if is_exit_word(trimmed) {
                        println!("{}", FAREWELL.green());
                        println!("Çıkılıyor...");
                        break;
                    }

                    match assistant.send_turn(&name, age, trimmed).await {
                        Ok(reply) => {
                            println!("{} {}", "Doktor Asistanı:".cyan().bold(), reply);
                            print_transcript(&assistant.store().history(&name));
                        }
                        Err(e) => {
                            println!("{} {}", "Hata oluştu:".red().bold(), e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("Çıkılıyor...");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

// HTTP server adapter
pub mod serve {
    //! HTTP server handler.
    //!
    //! Builds the provider and the shared assistant, then hands off to the
    //! axum server in `crate::server`.

    use super::*;
    use crate::config::Config;
    use crate::providers::create_provider;
    use crate::server::run_server;
    use std::sync::Arc;

    /// Serve the chat API and web UI
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_serve(config: Config) -> Result<()> {
        let provider = create_provider(&config.provider.provider_type, &config.provider)?;
        let assistant = Arc::new(DoctorAssistant::new(provider));
        run_server(&config, assistant).await
    }
}

// Remote terminal client adapter
pub mod client {
    //! Remote terminal client handler.
    //!
    //! Same readline loop as the local chat, but each turn is POSTed to a
    //! running Hekim server. Non-200 responses print the status and body;
    //! transport errors print a connection-error line.

    use super::*;
    use crate::config::Config;
    use crate::prompts::FAREWELL;
    use crate::server::{ChatRequest, ChatResponse};
    use std::time::Duration;

    /// Start a terminal session against a remote server
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration holding the chat URL and timeout
    pub async fn run_client(config: Config) -> Result<()> {
        let url = config.chat.client_url.clone();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.chat.request_timeout_seconds))
            .build()?;

        let mut rl = DefaultEditor::new()?;

        println!(
            "Merhaba, ben bir doktor asistanıyım. Size daha iyi hitap edebilmem \
             için adınızı ve yaşınızı öğrenebilir miyim?"
        );
        let (name, age) = read_patient_info(&mut rl)?;

        println!("(Sohbet başladı, çıkmak için exit / quit / çık / kapat yazabilirsiniz.)");

        let prompt = format!("{}: ", name);
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if is_exit_word(trimmed) {
                        println!("{}", FAREWELL.green());
                        println!("Çıkılıyor...");
                        break;
                    }

                    let payload = ChatRequest {
                        name: name.clone(),
                        age,
                        message: trimmed.to_string(),
                    };

                    match http.post(&url).json(&payload).send().await {
                        Ok(response) if response.status().is_success() => {
                            match response.json::<ChatResponse>().await {
                                Ok(reply) => println!(
                                    "{} {}",
                                    "Doktor Asistanı:".cyan().bold(),
                                    reply.response
                                ),
                                Err(e) => {
                                    println!("{} {}", "Hata oluştu:".red().bold(), e)
                                }
                            }
                        }
                        Ok(response) => {
                            let status = response.status();
                            let body = response.text().await.unwrap_or_default();
                            println!("{} {} {}", "Sunucu hatası:".red().bold(), status, body);
                        }
                        Err(e) => {
                            println!("{} {}", "Bağlantı hatası:".red().bold(), e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("Çıkılıyor...");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
