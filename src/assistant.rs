//! Turn pipeline for the doctor assistant
//!
//! This module wires the session store, the prompt assembler, and the
//! completion provider into the two operations every presentation adapter
//! calls: start a session and send a turn.

use crate::error::{HekimError, Result};
use crate::prompts;
use crate::providers::{Message, Provider};
use crate::session::SessionStore;

/// Doctor assistant orchestrator
///
/// Owns the session store and a completion provider. Adapters share one
/// instance (behind an `Arc` for the HTTP server) and drive it with
/// [`DoctorAssistant::start_session`] and [`DoctorAssistant::send_turn`].
pub struct DoctorAssistant {
    provider: Box<dyn Provider>,
    store: SessionStore,
}

impl DoctorAssistant {
    /// Create an assistant backed by the given provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            store: SessionStore::new(),
        }
    }

    /// Access the session store (used by adapters to render transcripts)
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Start (or re-join) a session for a patient
    ///
    /// Ensures the session exists and the intro instruction is in place,
    /// then returns the greeting to display. Safe to call on every request;
    /// intro synthesis happens at most once per session.
    pub fn start_session(&self, name: &str, age: u32) -> String {
        self.store.get_or_create(name);
        self.store.ensure_intro(name, &prompts::intro_prompt(name, age));
        prompts::welcome_message(name)
    }

    /// Send one user turn and return the assistant's reply
    ///
    /// The full history plus the new user message is forwarded to the
    /// provider. Only after a successful completion are the user message and
    /// the reply appended, so a failed remote call leaves the history
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if the remote call fails or the input is empty
    pub async fn send_turn(&self, name: &str, age: u32, text: &str) -> Result<String> {
        if text.is_empty() {
            return Err(
                HekimError::Session(format!("Empty message for session {}", name)).into(),
            );
        }

        self.store.get_or_create(name);
        self.store.ensure_intro(name, &prompts::intro_prompt(name, age));

        let user_message = Message::user(text);
        let mut context = self.store.history(name);
        context.push(user_message.clone());

        let completion = self.provider.complete(&context).await?;
        let reply = completion.message.content.clone();

        self.store
            .append_turn(name, user_message, completion.message)?;

        tracing::debug!(
            "Turn complete for {}: history length {}",
            name,
            self.store.len(name)
        );
        Ok(reply)
    }

    /// Discard all session state (web UI reset control)
    pub fn reset(&self) {
        self.store.reset_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CompletionResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider fake that replies with a canned message and counts calls
    #[derive(Debug)]
    struct FakeProvider {
        reply: String,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl FakeProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                calls: Arc::new(AtomicUsize::new(0)),
                fail: true,
            }
        }

        fn call_counter(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        async fn complete(&self, _messages: &[Message]) -> Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HekimError::Provider("remote call failed".to_string()).into());
            }
            Ok(CompletionResponse::new(Message::assistant(
                self.reply.clone(),
            )))
        }
    }

    #[tokio::test]
    async fn test_first_turn_synthesizes_single_intro() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::replying("Geçmiş olsun")));
        assistant.send_turn("Ahmet", 25, "Başım ağrıyor").await.unwrap();

        let history = assistant.store().history("Ahmet");
        assert_eq!(history.len(), 3);
        // Exactly one intro, before the user's message
        assert!(history[0].content.contains("Ahmet, 25 yaşında"));
        assert_eq!(history[1].content, "Başım ağrıyor");
        assert_eq!(history[2].content, "Geçmiş olsun");
    }

    #[tokio::test]
    async fn test_history_grows_by_two_per_turn() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::replying("cevap")));
        assistant.send_turn("Ahmet", 25, "bir").await.unwrap();
        let after_first = assistant.store().len("Ahmet");
        assistant.send_turn("Ahmet", 25, "iki").await.unwrap();
        assert_eq!(assistant.store().len("Ahmet"), after_first + 2);
    }

    #[tokio::test]
    async fn test_failed_call_leaves_history_unchanged() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::failing()));
        let before = assistant.start_session("Ahmet", 25);
        assert!(before.contains("Merhaba Ahmet"));
        let len_before = assistant.store().len("Ahmet");

        let result = assistant.send_turn("Ahmet", 25, "Başım ağrıyor").await;
        assert!(result.is_err());
        assert_eq!(assistant.store().len("Ahmet"), len_before);
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_provider() {
        let provider = FakeProvider::replying("cevap");
        let calls = provider.call_counter();
        let assistant = DoctorAssistant::new(Box::new(provider));
        assistant.start_session("Ahmet", 25);
        let len_before = assistant.store().len("Ahmet");

        let result = assistant.send_turn("Ahmet", 25, "").await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(assistant.store().len("Ahmet"), len_before);
    }

    #[tokio::test]
    async fn test_start_session_is_idempotent() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::replying("cevap")));
        assistant.start_session("Ahmet", 25);
        assistant.start_session("Ahmet", 25);
        assert_eq!(assistant.store().len("Ahmet"), 1);
    }

    #[tokio::test]
    async fn test_reset_retriggers_intro() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::replying("cevap")));
        assistant.send_turn("Ahmet", 25, "soru").await.unwrap();
        assistant.reset();
        assert!(assistant.store().is_empty());

        assistant.send_turn("Ahmet", 26, "tekrar").await.unwrap();
        let history = assistant.store().history("Ahmet");
        assert!(history[0].content.contains("26 yaşında"));
    }

    #[tokio::test]
    async fn test_users_get_separate_sessions() {
        let assistant = DoctorAssistant::new(Box::new(FakeProvider::replying("cevap")));
        assistant.send_turn("Ahmet", 25, "soru").await.unwrap();
        assistant.send_turn("Ayşe", 30, "soru").await.unwrap();

        assert_eq!(assistant.store().len("Ahmet"), 3);
        assert_eq!(assistant.store().len("Ayşe"), 3);
        assert!(assistant.store().history("Ayşe")[0]
            .content
            .contains("Ayşe, 30 yaşında"));
    }
}
